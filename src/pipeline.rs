use image::RgbImage;
use uuid::Uuid;

use crate::compress::compress_jpeg;
use crate::decode::decode_base64_image;
use crate::error::ApiError;
use crate::extract::fetch_image_candidates;
use crate::models::{ArticleImages, Base64Image};
use crate::storage::ImageStore;
use crate::validate::select_images;

/// One request's worth of work: articles are handled strictly one after
/// another, and so are the candidates within an article.
pub struct Pipeline<'a> {
    http: &'a reqwest::Client,
    store: &'a dyn ImageStore,
    max_images_per_article: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(http: &'a reqwest::Client, store: &'a dyn ImageStore, max_images_per_article: usize) -> Self {
        Self {
            http,
            store,
            max_images_per_article,
        }
    }

    pub async fn fetch_article_images(&self, article_urls: &[String]) -> Result<Vec<ArticleImages>, ApiError> {
        let mut articles = Vec::with_capacity(article_urls.len());
        for (index, article_url) in article_urls.iter().enumerate() {
            let article_images = self.process_article(index + 1, article_url).await?;
            articles.push(ArticleImages {
                article_url: article_url.clone(),
                article_images,
            });
        }
        Ok(articles)
    }

    async fn process_article(&self, article_number: usize, article_url: &str) -> Result<Vec<String>, ApiError> {
        let candidates = fetch_image_candidates(self.http, article_url).await?;
        tracing::info!(
            article = article_number,
            url = %article_url,
            candidates = candidates.len(),
            "extracted image candidates"
        );

        let selected = select_images(self.http, &candidates, self.max_images_per_article).await;
        if selected.is_empty() {
            tracing::info!(article = article_number, url = %article_url, "no usable image found");
        }

        let mut uploaded = Vec::with_capacity(selected.len());
        for (nth, validated) in selected.into_iter().enumerate() {
            let name = if nth == 0 {
                format!("article_{}_hero", article_number)
            } else {
                format!("article_{}_img_{}", article_number, validated.candidate_index + 1)
            };
            tracing::debug!(article = article_number, source = %validated.url, %name, "uploading image");
            uploaded.push(self.compress_and_upload(&name, validated.image).await?);
        }
        Ok(uploaded)
    }

    pub async fn upload_base64_images(&self, images: &[Base64Image]) -> Result<Vec<String>, ApiError> {
        let mut uploaded = Vec::with_capacity(images.len());
        for (index, payload) in images.iter().enumerate() {
            let data = payload.base64.clone();
            let image = tokio::task::spawn_blocking(move || decode_base64_image(&data))
                .await?
                .map_err(|source| ApiError::BadImage { index, source })?;

            let name = Uuid::new_v4().simple().to_string();
            uploaded.push(self.compress_and_upload(&name, image).await?);
        }
        Ok(uploaded)
    }

    async fn compress_and_upload(&self, name: &str, image: RgbImage) -> Result<String, ApiError> {
        let (width, height) = image.dimensions();
        let compressed = tokio::task::spawn_blocking(move || compress_jpeg(&image)).await??;
        tracing::debug!(
            %name,
            width,
            height,
            quality = compressed.quality,
            bytes = compressed.bytes.len(),
            "compressed image"
        );

        let url = self.store.upload(name, compressed.bytes).await?;
        tracing::info!(%name, %url, "uploaded image");
        Ok(url)
    }
}
