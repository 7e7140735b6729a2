use std::{
    env,
    net::{AddrParseError, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use fx_core::{ContractSpec, DEFAULT_MAX_LEVERAGE, FEE_PER_LOT_PER_SIDE};
use thiserror::Error;

const DEFAULT_LISTEN_PORT: u16 = 8501;
const DEFAULT_LOG_FILTER: &str = "info";

const ENV_ADDR: &str = "FX_SIM_ADDR";
const ENV_FEE_PER_LOT: &str = "FX_SIM_FEE_PER_LOT";
const ENV_MAX_LEVERAGE: &str = "FX_SIM_MAX_LEVERAGE";
const ENV_LOG: &str = "FX_SIM_LOG";
const ENV_RUN_LOG: &str = "FX_SIM_RUN_LOG";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub contract: ContractSpec,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// JSON-lines run log appended to when set.
    pub run_log_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FX_SIM_ADDR is not a valid socket address: {0}")]
    InvalidListenAddr(#[source] AddrParseError),
    #[error("FX_SIM_FEE_PER_LOT must be a finite, non-negative amount")]
    InvalidFeePerLot,
    #[error("FX_SIM_MAX_LEVERAGE must be a finite number greater than 0")]
    InvalidMaxLeverage,
    #[error("FX_SIM_LOG must not be empty or whitespace")]
    InvalidLogFilter,
    #[error("FX_SIM_RUN_LOG must not be empty or whitespace")]
    InvalidRunLogPath,
    #[error("{0} contains non-unicode data")]
    NonUnicode(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env(ENV_ADDR)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT)),
        };

        let fee_per_lot_per_side = parse_amount_env(
            ENV_FEE_PER_LOT,
            FEE_PER_LOT_PER_SIDE,
            |fee| fee >= 0.0,
            ConfigError::InvalidFeePerLot,
        )?;

        let max_leverage = parse_amount_env(
            ENV_MAX_LEVERAGE,
            DEFAULT_MAX_LEVERAGE,
            |leverage| leverage > 0.0,
            ConfigError::InvalidMaxLeverage,
        )?;

        let log_filter = match read_env(ENV_LOG)? {
            Some(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidLogFilter);
                }
                value
            }
            None => DEFAULT_LOG_FILTER.to_owned(),
        };

        let run_log_path = match read_env(ENV_RUN_LOG)? {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::InvalidRunLogPath),
            Some(value) => Some(PathBuf::from(value)),
            None => None,
        };

        Ok(Self {
            listen_addr,
            contract: ContractSpec {
                fee_per_lot_per_side,
                max_leverage,
            },
            log_filter,
            run_log_path,
        })
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode(key)),
    }
}

fn parse_amount_env(
    key: &'static str,
    default_value: f64,
    is_valid: impl Fn(f64) -> bool,
    invalid_error: ConfigError,
) -> Result<f64, ConfigError> {
    let Some(value) = read_env(key)? else {
        return Ok(default_value);
    };

    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && is_valid(parsed) => Ok(parsed),
        _ => Err(invalid_error),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, sync::Mutex};

    use super::{
        Config, ConfigError, ENV_ADDR, ENV_FEE_PER_LOT, ENV_LOG, ENV_MAX_LEVERAGE, ENV_RUN_LOG,
    };

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<std::ffi::OsString>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn unset(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }

        #[cfg(unix)]
        fn set_os(key: &'static str, value: std::ffi::OsString) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }

    fn reset_config_env_baseline() -> [EnvVarGuard; 5] {
        [
            EnvVarGuard::unset(ENV_ADDR),
            EnvVarGuard::unset(ENV_FEE_PER_LOT),
            EnvVarGuard::unset(ENV_MAX_LEVERAGE),
            EnvVarGuard::unset(ENV_LOG),
            EnvVarGuard::unset(ENV_RUN_LOG),
        ]
    }

    #[test]
    fn defaults_when_env_is_unset() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8501".parse().unwrap());
        assert_eq!(config.contract.fee_per_lot_per_side, 1_100.0);
        assert_eq!(config.contract.max_leverage, 25.0);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.run_log_path, None);
    }

    #[test]
    fn uses_overrides_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _addr = EnvVarGuard::set(ENV_ADDR, "127.0.0.1:9000");
        let _fee = EnvVarGuard::set(ENV_FEE_PER_LOT, " 0 ");
        let _leverage = EnvVarGuard::set(ENV_MAX_LEVERAGE, "100");
        let _log = EnvVarGuard::set(ENV_LOG, "api=debug");
        let _run_log = EnvVarGuard::set(ENV_RUN_LOG, "/tmp/fx-runs.jsonl");

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.contract.fee_per_lot_per_side, 0.0);
        assert_eq!(config.contract.max_leverage, 100.0);
        assert_eq!(config.log_filter, "api=debug");
        assert_eq!(
            config.run_log_path,
            Some(std::path::PathBuf::from("/tmp/fx-runs.jsonl"))
        );
    }

    #[test]
    fn returns_error_for_invalid_listen_addr() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_ADDR, "localhost");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidListenAddr(_)));
    }

    #[test]
    fn returns_error_for_negative_fee() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_FEE_PER_LOT, "-1");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidFeePerLot));
    }

    #[test]
    fn returns_error_for_non_positive_or_non_finite_max_leverage() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();

        for value in ["0", "inf", "NaN", "abc"] {
            let _guard = EnvVarGuard::set(ENV_MAX_LEVERAGE, value);
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMaxLeverage), "{value}");
        }
    }

    #[test]
    fn returns_error_for_whitespace_log_filter() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_LOG, "   ");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidLogFilter));
    }

    #[test]
    fn returns_error_for_blank_run_log_path() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set(ENV_RUN_LOG, " ");

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::InvalidRunLogPath));
    }

    #[cfg(unix)]
    #[test]
    fn returns_error_for_non_unicode_env_var() {
        use std::os::unix::ffi::OsStringExt;

        let _lock = ENV_LOCK.lock().unwrap();
        let _baseline = reset_config_env_baseline();
        let _guard = EnvVarGuard::set_os(
            ENV_FEE_PER_LOT,
            std::ffi::OsString::from_vec(vec![0x66, 0x6f, 0x80]),
        );

        let err = Config::from_env().unwrap_err();

        assert!(matches!(err, ConfigError::NonUnicode(key) if key == ENV_FEE_PER_LOT));
        assert_eq!(
            err.to_string(),
            "FX_SIM_FEE_PER_LOT contains non-unicode data"
        );
    }
}
