use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{ImageStore, StorageError};
use crate::config::CloudinaryConfig;

pub struct CloudinaryStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(http: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { http, config }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn signed_params(&self, public_id: &str, timestamp: i64) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("folder", self.config.folder.clone()),
            ("overwrite", "true".to_string()),
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.to_string()),
        ])
    }
}

/// `k=v` pairs sorted by key, joined with `&`.
fn string_to_sign(params: &BTreeMap<&'static str, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn sign(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, name: &str, jpeg: Vec<u8>) -> Result<String, StorageError> {
        let params = self.signed_params(name, chrono::Utc::now().timestamp());
        let signature = sign(&params, &self.config.api_secret);

        let file = Part::bytes(jpeg)
            .file_name(format!("{}.jpg", name))
            .mime_str("image/jpeg")
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Request(format!("unreadable Cloudinary response: {}", e)))?;

        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message: body
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        body.secure_url.ok_or_else(|| StorageError::Rejected {
            status: status.as_u16(),
            message: "response carried no secure_url".to_string(),
        })
    }
}
