use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_FOLDER: &str = "article-images";
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} env var missing")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// ── Service settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub max_images_per_article: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let max_images_per_article = match lookup("MAX_IMAGES_PER_ARTICLE") {
            None => 1,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_IMAGES_PER_ARTICLE",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            max_images_per_article,
        })
    }
}

// ── Storage settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Cloudinary(CloudinaryConfig),
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub folder: String,
    /// Custom endpoint (MinIO, localstack). Forces path-style addressing.
    pub endpoint_url: Option<String>,
    /// Replaces `https://{bucket}.s3.{region}.amazonaws.com` in returned URLs.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let backend = optional("STORAGE_BACKEND").unwrap_or_else(|| "s3".to_string());
        match backend.to_lowercase().as_str() {
            "cloudinary" => Ok(StorageConfig::Cloudinary(CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                api_base: optional("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
                folder: optional("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            })),
            "s3" => Ok(StorageConfig::S3(S3Config {
                region: required("AWS_REGION")?,
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                bucket: required("S3_BUCKET_NAME")?,
                folder: optional("S3_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
                endpoint_url: optional("S3_ENDPOINT_URL"),
                public_base_url: optional("S3_PUBLIC_BASE_URL"),
            })),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: backend,
            }),
        }
    }
}
