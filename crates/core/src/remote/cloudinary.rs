//! Cloudinary-backed implementation of [`RemoteHost`] over the signed
//! upload and admin REST APIs.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{AttributeBundle, RemoteAsset, RemoteHost};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};

pub struct CloudinaryHost {
    config: RemoteConfig,
    http: Client,
}

impl CloudinaryHost {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    /// Build the signed form fields for an API call: the caller's parameters
    /// plus `timestamp`, `api_key`, `signature` and the algorithm marker.
    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> multipart::Form {
        params.insert("timestamp", unix_timestamp().to_string());
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form = multipart::Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }
        form.text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().map_err(|e| Error::Remote(e.to_string()))?;
        let status = response.status();
        let body: Value = response.json().map_err(|e| Error::Remote(e.to_string()))?;
        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            return Err(Error::Remote(format!("{status}: {message}")));
        }
        Ok(body)
    }
}

impl RemoteHost for CloudinaryHost {
    fn upload(&self, bytes: &[u8], bundle: &AttributeBundle) -> Result<RemoteAsset> {
        let mut params = BTreeMap::new();
        params.insert("context", bundle.encode());
        let form = self.signed_form(params).part(
            "file",
            multipart::Part::bytes(bytes.to_vec()).file_name("image"),
        );

        let body = self.send(self.http.post(self.endpoint("upload")).multipart(form))?;
        Ok(RemoteAsset {
            public_id: required_str(&body, "public_id")?,
            url: required_str(&body, "secure_url")?,
        })
    }

    fn update_context(&self, public_id: &str, bundle: &AttributeBundle) -> Result<()> {
        let mut params = BTreeMap::new();
        params.insert("context", bundle.encode());
        params.insert("public_id", public_id.to_string());
        params.insert("type", "upload".to_string());
        let form = self.signed_form(params);

        self.send(self.http.post(self.endpoint("explicit")).multipart(form))?;
        Ok(())
    }

    fn fetch_context(&self, public_id: &str) -> Result<BTreeMap<String, String>> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload/{}",
            self.config.cloud_name, public_id
        );
        let body = self.send(
            self.http
                .get(url)
                .query(&[("context", "true")])
                .basic_auth(&self.config.api_key, Some(&self.config.api_secret)),
        )?;
        Ok(parse_context(&body))
    }

    fn destroy(&self, public_id: &str) -> Result<()> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        let form = self.signed_form(params);

        let body = self.send(self.http.post(self.endpoint("destroy")).multipart(form))?;
        destroy_outcome(&body)
    }
}

/// SHA-256 request signature: sorted `key=value` pairs joined with `&`, the
/// API secret appended, hex-encoded digest.
fn sign_params(params: &BTreeMap<&'static str, String>, secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let digest = Sha256::digest(format!("{joined}{secret}").as_bytes());
    format!("{digest:x}")
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn required_str(body: &Value, key: &str) -> Result<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Remote(format!("host response missing `{key}`")))
}

/// The custom context block of a resource response, flattened to key/value.
fn parse_context(body: &Value) -> BTreeMap<String, String> {
    let mut bundle = BTreeMap::new();
    if let Some(custom) = body.pointer("/context/custom").and_then(Value::as_object) {
        for (key, value) in custom {
            if let Some(value) = value.as_str() {
                bundle.insert(key.clone(), value.to_string());
            }
        }
    }
    bundle
}

/// An already-absent asset counts as deleted.
fn destroy_outcome(body: &Value) -> Result<()> {
    match body.get("result").and_then(Value::as_str) {
        Some("ok") | Some("not found") => Ok(()),
        Some(other) => Err(Error::Remote(format!("destroy rejected: {other}"))),
        None => Err(Error::Remote("destroy response missing `result`".to_string())),
    }
}
