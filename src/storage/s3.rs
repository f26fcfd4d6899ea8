use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use super::{ImageStore, StorageError};
use crate::config::S3Config;
use crate::extract::HTTP_TIMEOUT;

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    folder: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "hero-image-api",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(HTTP_TIMEOUT)
                    .connect_timeout(Duration::from_secs(5))
                    .build(),
            );
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let public_base_url = config
            .public_base_url
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region));

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket,
            folder: config.folder.trim_matches('/').to_string(),
            public_base_url,
        }
    }

    fn key(&self, name: &str) -> String {
        if self.folder.is_empty() {
            format!("{}.jpg", name)
        } else {
            format!("{}/{}.jpg", self.folder, name)
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl ImageStore for S3Store {
    async fn upload(&self, name: &str, jpeg: Vec<u8>) -> Result<String, StorageError> {
        let key = self.key(name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("image/jpeg")
            .body(ByteStream::from(jpeg))
            .send()
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(self.public_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> S3Config {
        S3Config {
            region: "eu-west-1".to_string(),
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret".to_string(),
            bucket: "hero-bucket".to_string(),
            folder: "article-images".to_string(),
            endpoint_url: None,
            public_base_url: None,
        }
    }

    #[test]
    fn public_url_uses_virtual_host_form() {
        let store = S3Store::new(config());
        let key = store.key("article_3_hero");
        assert_eq!(key, "article-images/article_3_hero.jpg");
        assert_eq!(
            store.public_url(&key),
            "https://hero-bucket.s3.eu-west-1.amazonaws.com/article-images/article_3_hero.jpg"
        );
    }

    #[test]
    fn public_base_override_and_empty_folder() {
        let store = S3Store::new(S3Config {
            folder: "/".to_string(),
            public_base_url: Some("https://img.example.com/".to_string()),
            ..config()
        });
        let key = store.key("abc123");
        assert_eq!(key, "abc123.jpg");
        assert_eq!(store.public_url(&key), "https://img.example.com/abc123.jpg");
    }

    #[tokio::test]
    async fn puts_object_with_jpeg_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/hero-bucket/article-images/article_1_hero.jpg"))
            .and(header("content-type", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = S3Store::new(S3Config {
            endpoint_url: Some(server.uri()),
            ..config()
        });
        let url = store
            .upload("article_1_hero", b"jpeg-bytes".to_vec())
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://hero-bucket.s3.eu-west-1.amazonaws.com/article-images/article_1_hero.jpg"
        );
    }

    #[tokio::test]
    async fn failed_put_is_a_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_raw(
                "<Error><Code>AccessDenied</Code><Message>denied</Message></Error>",
                "application/xml",
            ))
            .mount(&server)
            .await;

        let store = S3Store::new(S3Config {
            endpoint_url: Some(server.uri()),
            ..config()
        });
        let err = store.upload("x", vec![1]).await.unwrap_err();
        assert!(err.to_string().contains("AccessDenied"));
    }
}
