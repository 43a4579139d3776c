//! Image ingestion: normalize a source (remote URL, data URI, raw bytes)
//! into a JPEG payload ready for embedding.
//!
//! Ingestion is a pure function; it touches no document state, so a failed
//! fetch or decode leaves nothing partially registered. The document commits
//! the id allocation and registry entry only once ingestion has succeeded.

use std::io;

use async_trait::async_trait;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use log::debug;
use serde::Serialize;

use crate::document::Error;

/// Where an image comes from.
pub enum ImageSource<'a> {
    /// Remote URL, retrieved through the document's [`ImageFetcher`].
    Url(&'a str),
    /// `data:<mime>;base64,<payload>` string.
    DataUri(&'a str),
    /// Raw encoded image bytes (PNG or JPEG).
    Bytes(&'a [u8]),
}

/// Collaborator seam for retrieving remote images. The engine ships no
/// network stack; callers plug in whatever client they already have.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> io::Result<Vec<u8>>;
}

/// A registered image: allocated object id, pixel dimensions and the
/// re-encoded JPEG payload.
pub(crate) struct ImageResource {
    pub(crate) id: usize,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl ImageResource {
    pub(crate) fn meta(&self) -> ImageMeta {
        ImageMeta {
            subtype: XObjectKind::Image,
            width: self.width,
            height: self.height,
            color_space: ColorSpaceKind::DeviceRGB,
            bits_per_component: 8,
            filter: FilterKind::DCTDecode,
            length: self.data.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
#[serde(rename = "XObject")]
pub(crate) struct ImageMeta {
    pub subtype: XObjectKind,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpaceKind,
    pub bits_per_component: u8,
    pub filter: FilterKind,
    pub length: usize,
}

#[derive(Serialize)]
pub(crate) enum XObjectKind {
    Image,
}

#[derive(Serialize)]
pub(crate) enum ColorSpaceKind {
    DeviceRGB,
}

#[derive(Serialize)]
pub(crate) enum FilterKind {
    DCTDecode,
}

/// Result of ingesting one source.
pub(crate) struct EncodedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

const JPEG_QUALITY: u8 = 90;

/// Decodes `bytes`, flattens it onto an opaque white background (JPEG has no
/// alpha channel) and re-encodes it as JPEG.
pub(crate) fn ingest(bytes: &[u8]) -> Result<EncodedImage, Error> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());

    let rgba = decoded.to_rgba8();
    let mut flat = RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = u32::from(px[3]);
        let out = flat.get_pixel_mut(x, y);
        for c in 0..3 {
            out[c] = ((u32::from(px[c]) * a + 255 * (255 - a)) / 255) as u8;
        }
    }

    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode(
        flat.as_raw(),
        width,
        height,
        image::ColorType::Rgb8,
    )?;

    debug!(
        "ingested image: {}x{} px, {} source bytes -> {} jpeg bytes",
        width,
        height,
        bytes.len(),
        data.len()
    );
    Ok(EncodedImage {
        width,
        height,
        data,
    })
}

/// Strips the `data:<mime>;base64,` prefix and decodes the payload.
pub(crate) fn decode_data_uri(uri: &str) -> Result<Vec<u8>, Error> {
    let rest = uri.strip_prefix("data:").ok_or(Error::InvalidDataUri)?;
    let (_mime, payload) = rest.split_once(";base64,").ok_or(Error::InvalidDataUri)?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| Error::InvalidDataUri)
}
