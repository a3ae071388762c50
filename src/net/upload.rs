//! Presigned image upload client
//!
//! The two-step exchange of the ads form: ask the backend for a presigned
//! URL, then PUT the raw bytes straight to it. Returns the stored object key.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::constants::net::{PRESIGN_PATH, REQUEST_TIMEOUT_SECS};
use crate::error::{InsightError, Result};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    content_type: &'a str,
}

/// Wire shape of the presign response; both fields must be present and
/// non-empty to be usable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresignReply {
    pub presigned_url: String,
    pub object_key: String,
}

impl PresignReply {
    fn validated(self) -> Result<Self> {
        if self.presigned_url.is_empty() || self.object_key.is_empty() {
            return Err(InsightError::Presign("incomplete presign response".to_string()));
        }
        Ok(self)
    }
}

pub struct UploadClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Upload file bytes and return the stored object key
    pub fn upload(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        let reply = self.presign(content_type)?;
        let response = self
            .client
            .put(&reply.presigned_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::UploadStatus { status: status.as_u16() });
        }
        Ok(reply.object_key)
    }

    fn presign(&self, content_type: &str) -> Result<PresignReply> {
        let url = format!("{}{}", self.base_url, PRESIGN_PATH);
        let response = self
            .client
            .post(&url)
            .json(&PresignRequest { content_type })
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::Presign(format!("status {}", status.as_u16())));
        }
        response.json::<PresignReply>()?.validated()
    }
}
