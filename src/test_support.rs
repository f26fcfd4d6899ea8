//! Helpers shared by unit tests: in-memory images and a recording store.

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::storage::{ImageStore, StorageError};

/// Smooth RGB gradient; compresses well.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Pseudo-random pixels; compresses badly, which makes JPEG size depend on quality.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        Rgb([next(), next(), next()])
    })
}

fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

pub fn encode_jpeg(image: &RgbImage) -> Vec<u8> {
    encode(image, ImageFormat::Jpeg)
}

/// Records every upload and answers with a predictable CDN URL.
#[derive(Default)]
pub struct MemoryStore {
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn names(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn upload(&self, name: &str, jpeg: Vec<u8>) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push((name.to_string(), jpeg));
        Ok(format!("https://cdn.test/{}.jpg", name))
    }
}
