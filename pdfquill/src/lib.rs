//! A small PDF generation library.
//!
//! Documents are assembled by placing text and images at absolute positions
//! on A4 pages, with automatic overflow onto new pages, optional header and
//! footer bands, and image embedding with de-duplication. The result is
//! serialized into PDF 1.7 bytes with [`Document::end`].
//!
//! ```no_run
//! use pdfquill::{Document, TextOptions};
//!
//! let mut doc = Document::builder().footer_page_numbers(true).build();
//! doc.place_text("Hello World", 40.0, 60.0, &TextOptions::default());
//! let bytes = doc.end().unwrap();
//! ```

mod color;
mod document;
mod fonts;
mod idseq;
mod image;
mod page;
mod writer;

pub use crate::color::Color;
pub use crate::document::{
    Align, BandFn, BandPage, BandText, Document, DocumentBuilder, Error, ImageOptions,
    TextOptions, PAGE_HEIGHT, PAGE_WIDTH,
};
pub use crate::fonts::FontStyle;
pub use crate::image::{ImageFetcher, ImageSource};
