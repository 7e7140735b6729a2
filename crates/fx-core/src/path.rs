use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("rate #{position} is not a finite number: {token:?}")]
    InvalidToken { position: usize, token: String },
    #[error("a rate path needs at least 2 points, found {found}")]
    TooFewPoints { found: usize },
}

/// Simulated exchange rates, one per day including day 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PricePath {
    rates: Vec<f64>,
}

impl PricePath {
    /// `days + 1` rates evenly spaced from `start_rate` to `end_rate`, both inclusive.
    pub fn linear(days: u32, start_rate: f64, end_rate: f64) -> Self {
        let days = days.max(1);
        let step = (end_rate - start_rate) / f64::from(days);

        let mut rates: Vec<f64> = (0..=days)
            .map(|day| start_rate + step * f64::from(day))
            .collect();
        if let Some(last) = rates.last_mut() {
            *last = end_rate;
        }

        Self { rates }
    }

    /// Parses a comma or newline separated list of rates. Blank entries are skipped.
    pub fn from_literal(text: &str) -> Result<Self, PathError> {
        let mut rates = Vec::new();

        for (index, token) in text
            .split([',', '\n'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .enumerate()
        {
            let rate = token
                .parse::<f64>()
                .ok()
                .filter(|rate| rate.is_finite())
                .ok_or_else(|| PathError::InvalidToken {
                    position: index + 1,
                    token: token.to_string(),
                })?;
            rates.push(rate);
        }

        Ok(Self { rates })
    }

    pub fn ensure_tradable(&self) -> Result<(), PathError> {
        if self.rates.len() < 2 {
            return Err(PathError::TooFewPoints {
                found: self.rates.len(),
            });
        }

        Ok(())
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn days(&self) -> usize {
        self.rates.len().saturating_sub(1)
    }

    pub fn start_rate(&self) -> Option<f64> {
        self.rates.first().copied()
    }
}
