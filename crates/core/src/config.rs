use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Credentials for the remote media host, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl RemoteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(Error::Config(format!(
                "{}: cloud_name, api_key and api_secret must all be set",
                path.display()
            )));
        }
        Ok(config)
    }
}
