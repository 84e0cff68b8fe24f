use std::time::Duration;

use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::Error;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Runtime settings handed to a function through its environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// ARN of the Secrets Manager secret holding the database credentials.
    /// Left optional so a missing value only fails the first connection.
    #[serde(default)]
    pub db_secret_arn: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::figment()
            .extract()
            .map_err(|e| Error::Config(Box::new(e)))
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }

    fn figment() -> Figment {
        Figment::new().merge(Env::raw().only(&["DB_SECRET_ARN", "DB_CONNECT_TIMEOUT_SECS"]))
    }
}
