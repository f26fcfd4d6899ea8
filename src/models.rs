use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub article_urls: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleImages {
    pub article_url: String,
    pub article_images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleImagesResponse {
    pub count: usize,
    pub articles: Vec<ArticleImages>,
}

#[derive(Debug, Deserialize)]
pub struct Base64UploadRequest {
    pub images: Vec<Base64Image>,
}

#[derive(Debug, Deserialize)]
pub struct Base64Image {
    pub base64: String,
}

#[derive(Debug, Serialize)]
pub struct Base64UploadResponse {
    pub count: usize,
    pub images: Vec<String>,
}
