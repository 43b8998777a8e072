pub mod add;
pub mod context;
pub mod edit;
pub mod ls;
pub mod resync;
pub mod rm;
pub mod show;

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use cropcatalog_core::error::{Error, Result};
use cropcatalog_core::remote::{AttributeBundle, RemoteAsset, RemoteHost};

/// Stand-in host used when no credentials file exists. Local commands never
/// reach it; remote dispatches fail and are absorbed by the sync engine.
pub struct UnconfiguredHost;

impl RemoteHost for UnconfiguredHost {
    fn upload(&self, _bytes: &[u8], _bundle: &AttributeBundle) -> Result<RemoteAsset> {
        Err(Error::Remote("no remote host configured".to_string()))
    }

    fn update_context(&self, _public_id: &str, _bundle: &AttributeBundle) -> Result<()> {
        Err(Error::Remote("no remote host configured".to_string()))
    }

    fn fetch_context(&self, _public_id: &str) -> Result<BTreeMap<String, String>> {
        Err(Error::Remote("no remote host configured".to_string()))
    }

    fn destroy(&self, _public_id: &str) -> Result<()> {
        Err(Error::Remote("no remote host configured".to_string()))
    }
}

pub(crate) fn format_timestamp(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .earliest()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
