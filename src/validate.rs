use image::RgbImage;

use crate::decode::decode_rgb;

pub const MIN_WIDTH: u32 = 600;
pub const MIN_HEIGHT: u32 = 300;
pub const MIN_RATIO: f64 = 0.8;
pub const MAX_RATIO: f64 = 2.2;

/// A candidate that passed the geometry checks.
#[derive(Debug)]
pub struct ValidatedImage {
    /// Zero-based position in the article's candidate list.
    pub candidate_index: usize,
    pub url: String,
    pub image: RgbImage,
}

/// Inline data URIs and SVGs are never fetched.
pub fn is_skipped_url(url: &str) -> bool {
    url.starts_with("data:image") || url.to_lowercase().ends_with(".svg")
}

pub fn meets_geometry(width: u32, height: u32) -> bool {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return false;
    }
    let ratio = width as f64 / height as f64;
    (MIN_RATIO..=MAX_RATIO).contains(&ratio)
}

/// Walk the candidates in order, fetching one at a time, and stop as soon
/// as `limit` images have been accepted.
pub async fn select_images(
    client: &reqwest::Client,
    candidates: &[String],
    limit: usize,
) -> Vec<ValidatedImage> {
    let mut accepted = Vec::new();
    for (candidate_index, url) in candidates.iter().enumerate() {
        if accepted.len() >= limit {
            break;
        }
        if let Some(image) = fetch_and_validate(client, url).await {
            accepted.push(ValidatedImage {
                candidate_index,
                url: url.clone(),
                image,
            });
        }
    }
    accepted
}

/// Fetch and decode one candidate. Every failure is a rejection. The HTTP
/// status is not checked; an error body that is not an image fails to decode.
pub async fn fetch_and_validate(client: &reqwest::Client, url: &str) -> Option<RgbImage> {
    if is_skipped_url(url) {
        tracing::debug!(url, "skipping inline or vector image");
        return None;
    }

    let bytes = match fetch_bytes(client, url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(url, error = %e, "image fetch failed");
            return None;
        }
    };

    let image = match tokio::task::spawn_blocking(move || decode_rgb(&bytes)).await {
        Ok(Ok(image)) => image,
        Ok(Err(e)) => {
            tracing::debug!(url, error = %e, "image decode failed");
            return None;
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "image decode task failed");
            return None;
        }
    };

    let (width, height) = image.dimensions();
    if !meets_geometry(width, height) {
        tracing::debug!(url, width, height, "image rejected by size or aspect ratio");
        return None;
    }

    tracing::debug!(url, width, height, "image accepted");
    Some(image)
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        tracing::debug!(url, status = %response.status(), "image host returned non-success status");
    }
    Ok(response.bytes().await?.to_vec())
}
