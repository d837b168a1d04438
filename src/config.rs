use crate::error::{Error, Result};
use crate::validate::{validate_dns_name, validate_port, validate_secret};
use crate::zones::Zone;
use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DurationSeconds};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV: &str = "DYNDNS_CONFIG_FILE";

const CONFIG_FILE_LOCATIONS: [&str; 2] = [".dyndns.yml", "/etc/dyndns.yml"];

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// The shared secret clients authenticate with.
    pub secret: String,
    /// The nameserver receiving the updates.
    pub nameserver: IpAddr,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
    /// The domain the service itself is reachable under. Informational only.
    #[serde(default)]
    pub dyndns_domain: Option<String>,
    pub zones: Vec<ZoneConfig>,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_api_timeout")]
    pub api_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_dns_timeout")]
    pub dns_timeout: Duration,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    pub name: String,
    pub tsig_key: String,
}

fn default_port() -> u16 {
    53
}

fn default_api_bind_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8053)
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_dns_timeout() -> Duration {
    Duration::from_secs(5)
}

fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let port = i64::deserialize(deserializer)?;
    validate_port(port).map_err(serde::de::Error::custom)
}

fn invalid(field: &str, err: &Error) -> Error {
    Error::Configuration(format!(
        "The configuration value \"{field}\" is invalid: {err}"
    ))
}

impl Config {
    /// Load the first configuration file found among the explicit `path`, the file named by
    /// `DYNDNS_CONFIG_FILE`, `./.dyndns.yml` and `/etc/dyndns.yml`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no file exists, or the file found can't be read,
    /// parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = find_config_file(path, std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from))?;
        tracing::debug!("loading configuration from {}", path.display());
        Self::try_from_file(path)
    }

    /// # Errors
    ///
    /// Returns a configuration error if the file can't be read, parsed or validated.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_yaml::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for the first value that doesn't validate.
    pub fn validate(&self) -> Result<()> {
        validate_secret(&self.secret).map_err(|err| invalid("secret", &err))?;
        if let Some(dyndns_domain) = &self.dyndns_domain {
            validate_dns_name(dyndns_domain).map_err(|err| invalid("dyndns_domain", &err))?;
        }
        if self.zones.is_empty() {
            return Err(Error::Configuration(
                "The configuration needs at least one zone.".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for zone_config in &self.zones {
            let zone = Zone::new(&zone_config.name, &zone_config.tsig_key)
                .map_err(|err| invalid("zones", &err))?;
            if !seen.insert(zone.name().to_string()) {
                return Err(Error::Configuration(format!(
                    "The zone \"{}\" is configured more than once.",
                    zone.name()
                )));
            }
        }
        Ok(())
    }
}

fn find_config_file(explicit: Option<&Path>, from_env: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(from_env)
        .chain(CONFIG_FILE_LOCATIONS.iter().map(PathBuf::from))
        .find(|path| path.exists())
        .ok_or_else(|| {
            Error::Configuration("The configuration file could not be found.".to_string())
        })
}
