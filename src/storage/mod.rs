use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;

mod cloudinary;
mod s3;

pub use cloudinary::CloudinaryStore;
pub use s3::S3Store;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Destination for compressed JPEGs. `name` carries no extension; each
/// backend decides how it maps onto a folder, key or public id. Uploading
/// the same name again replaces the earlier asset.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, name: &str, jpeg: Vec<u8>) -> Result<String, StorageError>;
}

pub fn build_store(config: StorageConfig, http: reqwest::Client) -> Arc<dyn ImageStore> {
    match config {
        StorageConfig::Cloudinary(config) => {
            tracing::info!(cloud = %config.cloud_name, folder = %config.folder, "using Cloudinary storage");
            Arc::new(CloudinaryStore::new(http, config))
        }
        StorageConfig::S3(config) => {
            tracing::info!(bucket = %config.bucket, region = %config.region, "using S3 storage");
            Arc::new(S3Store::new(config))
        }
    }
}
