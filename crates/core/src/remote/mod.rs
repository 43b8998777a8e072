pub mod cloudinary;

use std::collections::BTreeMap;

use crate::error::Result;

/// Host-assigned identity of an uploaded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAsset {
    pub public_id: String,
    pub url: String,
}

/// The fixed set of display fields mirrored into the host's metadata slot.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBundle {
    pub alt: String,
    pub farmer_name: String,
    pub plant_name: String,
    pub disease: String,
    pub location: String,
    pub details: String,
    pub timestamp: String,
}

impl AttributeBundle {
    /// Pipe-delimited `key=value` encoding in fixed key order. Embedded `|`
    /// or `=` in values are not escaped; the host stores them verbatim.
    pub fn encode(&self) -> String {
        format!(
            "alt={}|farmer_name={}|plant_name={}|disease={}|location={}|details={}|timestamp={}",
            self.alt,
            self.farmer_name,
            self.plant_name,
            self.disease,
            self.location,
            self.details,
            self.timestamp
        )
    }
}

/// Capability interface over the remote media host's metadata API.
///
/// Every operation fails with [`crate::error::Error::Remote`]; failures are
/// never fatal to local state.
pub trait RemoteHost: Send + Sync {
    /// Upload new image bytes together with their metadata bundle.
    fn upload(&self, bytes: &[u8], bundle: &AttributeBundle) -> Result<RemoteAsset>;

    /// Replace the metadata bundle of an existing asset. An unknown public
    /// id is an error, not silently ignored.
    fn update_context(&self, public_id: &str, bundle: &AttributeBundle) -> Result<()>;

    /// Read back the metadata currently stored for an asset.
    fn fetch_context(&self, public_id: &str) -> Result<BTreeMap<String, String>>;

    /// Delete an asset. Destroying an already-absent public id is success.
    fn destroy(&self, public_id: &str) -> Result<()>;
}
