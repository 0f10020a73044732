use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LATENCY_MS: u64 = 300;

/// Runtime settings, normally read from `HRPORTAL_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding one `<kind>.json` file per collection.
    pub data_dir: PathBuf,
    /// Address of a `hrportal-served` daemon. `None` means local only.
    pub service_addr: Option<String>,
    /// Skip the probe and always use the local substitute.
    pub force_local: bool,
    /// Artificial delay applied to every local substitute call.
    pub local_latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            service_addr: None,
            force_local: false,
            local_latency: Duration::from_millis(DEFAULT_LATENCY_MS),
        }
    }
}

impl Config {
    /// Reads `HRPORTAL_DATA_DIR`, `HRPORTAL_SERVICE_ADDR`, `HRPORTAL_FORCE_LOCAL`
    /// and `HRPORTAL_LOCAL_LATENCY_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let local_latency = match lookup("HRPORTAL_LOCAL_LATENCY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    log::warn!("Ignoring invalid HRPORTAL_LOCAL_LATENCY_MS '{}'", raw);
                    defaults.local_latency
                }
            },
            None => defaults.local_latency,
        };

        Self {
            data_dir: lookup("HRPORTAL_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            service_addr: lookup("HRPORTAL_SERVICE_ADDR").filter(|a| !a.trim().is_empty()),
            force_local: lookup("HRPORTAL_FORCE_LOCAL").map(|v| v.eq_ignore_ascii_case("true") || v == "1").unwrap_or(false),
            local_latency,
        }
    }
}
