//! Document assembly: cursor-free text and image placement onto A4 pages,
//! header/footer bands, and final serialization into PDF 1.7 bytes.

use std::collections::HashMap;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use log::debug;
use pdfquill_obj::{to_writer, ObjectId, PdfStr, Reference};
use serde::Serialize;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::color::Color;
use crate::fonts::{self, FontStyle};
use crate::idseq::IdSeq;
use crate::image::{decode_data_uri, ingest, ImageFetcher, ImageResource, ImageSource};
use crate::page::{Catalog, Page, PageBuilder, Pages, Resources, StreamMeta};
use crate::writer::DocWriter;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

const MAX_BAND_HEIGHT: f64 = 200.0;
const BAND_MARGIN_X: f64 = 40.0;
const BAND_MARGIN_Y: f64 = 30.0;
const OVERFLOW_RESET_OFFSET: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Options for a single text placement.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub size: f64,
    pub family: String,
    pub style: FontStyle,
    /// `#RRGGBB`; malformed values degrade to black.
    pub color: String,
    pub align: Align,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            size: 12.0,
            family: "helvetica".into(),
            style: FontStyle::Normal,
            color: "#000000".into(),
            align: Align::Left,
        }
    }
}

/// Display size of a placed image, in points. Independent of the pixel
/// dimensions of the source.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    pub width: f64,
    pub height: f64,
}

/// Static content for a default header or footer band.
#[derive(Debug, Clone)]
pub struct BandText {
    pub text: String,
    pub align: Align,
    pub color: String,
}

impl Default for BandText {
    fn default() -> Self {
        BandText {
            text: String::new(),
            align: Align::Left,
            color: "#000000".into(),
        }
    }
}

/// A custom header/footer callback. Receives the page handle and the 1-based
/// page number, once per page, right before serialization.
pub type BandFn = Box<dyn Fn(&mut BandPage<'_>, usize)>;

/// Whether a placement belongs to the page body (subject to overflow
/// pagination) or to a header/footer band (never paginates).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Placement {
    Body,
    Band,
}

/// Handle passed to header/footer callbacks. Text placed through it lands on
/// the page the callback was invoked for, regardless of which page the
/// document's body placements last touched, and never triggers pagination.
pub struct BandPage<'a> {
    doc: &'a mut Document,
    page: usize,
}

impl BandPage<'_> {
    pub fn place_text(&mut self, text: &str, x: f64, y: f64, options: &TextOptions) -> f64 {
        self.doc.text_at(self.page, Placement::Band, text, x, y, options)
    }

    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        fonts::approx_width(text, size)
    }
}

pub struct Document {
    id_seq: IdSeq,
    pages: Vec<PageBuilder>,
    current: usize,
    images: Vec<ImageResource>,
    image_keys: HashMap<[u8; 16], usize>,
    header_height: f64,
    footer_height: f64,
    on_header: Option<BandFn>,
    on_footer: Option<BandFn>,
    default_header: Option<BandText>,
    default_footer: Option<BandText>,
    show_page_numbers: bool,
    fetcher: Option<Box<dyn ImageFetcher>>,
    id: String,
    creation_date: DateTime<Utc>,
    producer: String,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    /// Creates a document with default configuration and one empty page.
    pub fn new() -> Self {
        Document::builder().build()
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// Appends a fresh page and makes it the placement target.
    pub fn start_page(&mut self) {
        self.pages.push(PageBuilder::new(&mut self.id_seq));
        self.current = self.pages.len() - 1;
        debug!("started page {}", self.pages.len());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Places `text` with its baseline at `(x, y)`, `y` measured downwards
    /// from the top edge. Returns the y the text was actually placed at,
    /// which differs from the requested one when the placement overflowed
    /// onto a new page.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64, options: &TextOptions) -> f64 {
        self.text_at(self.current, Placement::Body, text, x, y, options)
    }

    /// Places an image scaled to `options` with its top-left corner at
    /// `(x, y)`. Identical source bytes share a single embedded object.
    pub async fn place_image(
        &mut self,
        source: ImageSource<'_>,
        x: f64,
        y: f64,
        options: &ImageOptions,
    ) -> Result<f64, Error> {
        let bytes = match source {
            ImageSource::Url(url) => {
                let fetcher = self.fetcher.as_ref().ok_or(Error::NoFetcher)?;
                fetcher.fetch(url).await.map_err(|source| Error::Fetch {
                    url: url.to_string(),
                    source,
                })?
            }
            ImageSource::DataUri(uri) => decode_data_uri(uri)?,
            ImageSource::Bytes(bytes) => bytes.to_vec(),
        };

        let key = md5::compute(&bytes).0;
        let index = match self.image_keys.get(&key) {
            Some(&index) => index,
            None => {
                let encoded = ingest(&bytes)?;
                let index = self.images.len();
                self.images.push(ImageResource {
                    id: self.id_seq.next(),
                    width: encoded.width,
                    height: encoded.height,
                    data: encoded.data,
                });
                self.image_keys.insert(key, index);
                index
            }
        };

        let (page_ix, y) = self.paginate(self.current, Placement::Body, y, options.height);
        let page = &mut self.pages[page_ix];
        page.images.insert(index);
        page.fragments.push(format!(
            "q {} 0 0 {} {} {} cm /Im{} Do Q",
            num(options.width),
            num(options.height),
            num(x),
            num(PAGE_HEIGHT - y - options.height),
            index
        ));
        Ok(y)
    }

    /// Approximate rendered width of `text` at `size`, for caller-side
    /// layout.
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        fonts::approx_width(text, size)
    }

    fn text_at(
        &mut self,
        page_ix: usize,
        placement: Placement,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> f64 {
        let (page_ix, y) = self.paginate(page_ix, placement, y, options.size);
        let font = fonts::resolve(&options.family, options.style);
        let page = &mut self.pages[page_ix];
        let name = page.use_font(font);
        let color = Color::from_hex(&options.color);
        let x = match options.align {
            Align::Left => x,
            Align::Center => x - fonts::approx_width(text, options.size) / 2.0,
            Align::Right => x - fonts::approx_width(text, options.size),
        };
        page.fragments.push(format!(
            "BT /{} {} Tf {} {} {} rg {} {} Td ({}) Tj ET",
            name,
            num(options.size),
            num(color.r),
            num(color.g),
            num(color.b),
            num(x),
            num(PAGE_HEIGHT - y),
            escape_text(text)
        ));
        y
    }

    /// Overflow check for body placements. A placement whose extent would
    /// cross into the reserved footer area starts a new page and lands just
    /// below the reserved header area. Band placements are exempt.
    fn paginate(&mut self, page_ix: usize, placement: Placement, y: f64, extent: f64) -> (usize, f64) {
        if placement == Placement::Band {
            return (page_ix, y);
        }
        if y + extent > PAGE_HEIGHT - self.footer_height {
            self.start_page();
            (self.current, self.header_height + OVERFLOW_RESET_OFFSET)
        } else {
            (page_ix, y)
        }
    }

    /// Runs the header and footer pass: visits every page once, in order,
    /// invoking the configured callbacks or rendering the default bands.
    fn inject_bands(&mut self) {
        let on_header = self.on_header.take();
        let on_footer = self.on_footer.take();

        for i in 0..self.pages.len() {
            let number = i + 1;

            if let Some(header) = &on_header {
                header(&mut BandPage { doc: self, page: i }, number);
            } else if let Some(band) = self.default_header.clone() {
                if !band.text.is_empty() {
                    self.band_text(i, &band.text, &band, BAND_MARGIN_Y);
                }
            }

            if let Some(footer) = &on_footer {
                footer(&mut BandPage { doc: self, page: i }, number);
            } else {
                let band = self
                    .default_footer
                    .clone()
                    .or_else(|| self.show_page_numbers.then(BandText::default));
                if let Some(band) = band {
                    let text = footer_text(&band.text, self.show_page_numbers, number);
                    if !text.is_empty() {
                        self.band_text(i, &text, &band, PAGE_HEIGHT - BAND_MARGIN_Y);
                    }
                }
            }
        }

        self.on_header = on_header;
        self.on_footer = on_footer;
    }

    fn band_text(&mut self, page: usize, text: &str, band: &BandText, y: f64) {
        let x = match band.align {
            Align::Left => BAND_MARGIN_X,
            Align::Center => PAGE_WIDTH / 2.0,
            Align::Right => PAGE_WIDTH - BAND_MARGIN_X,
        };
        let options = TextOptions {
            color: band.color.clone(),
            align: band.align,
            ..TextOptions::default()
        };
        self.text_at(page, Placement::Band, text, x, y, &options);
    }

    /// Renders header/footer bands and serializes the document. Consuming
    /// `self` guarantees the band pass cannot run twice for one document.
    pub fn end(mut self) -> Result<Vec<u8>, Error> {
        self.inject_bands();

        let mut doc = DocWriter::new(Vec::new());
        write!(doc, "%PDF-1.7\n%")?;
        doc.write_all(&[0xe2, 0xe3, 0xcf, 0xd3, b'\n'])?;

        let pages_id = self.id_seq.next();
        let catalog_id = self.id_seq.next();
        let pages_ref: Reference<Pages> = Reference::new(ObjectId::new(pages_id, 0));

        let catalog_ref = doc.serialize_object(catalog_id, Catalog { pages: pages_ref })?;
        doc.serialize_object(
            pages_id,
            Pages {
                media_box: (0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT),
                kids: self
                    .pages
                    .iter()
                    .map(|p| Reference::new(ObjectId::new(p.id, 0)))
                    .collect(),
                count: self.pages.len(),
            },
        )?;

        for page in &self.pages {
            let resources = Resources {
                font: page
                    .fonts
                    .iter()
                    .map(|(name, font)| (name.clone(), font.object()))
                    .collect(),
                x_object: page
                    .images
                    .iter()
                    .map(|&ix| {
                        (
                            format!("Im{}", ix),
                            Reference::new(ObjectId::new(self.images[ix].id, 0)),
                        )
                    })
                    .collect(),
            };
            doc.serialize_object(
                page.id,
                Page {
                    parent: pages_ref,
                    resources,
                    contents: Reference::new(ObjectId::new(page.contents_id, 0)),
                },
            )?;

            let content = page.content();
            doc.write_stream(
                page.contents_id,
                &StreamMeta {
                    length: content.len(),
                },
                &content,
            )?;
        }

        for image in &self.images {
            doc.write_stream(image.id, &image.meta(), &image.data)?;
        }

        let startxref = doc.len();
        let count = self.id_seq.count();
        doc.write_xref(count)?;

        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        #[serde(rename = "")]
        struct Info<'a> {
            producer: PdfStr<'a>,
            #[serde(with = "pdfquill_obj::datetime")]
            creation_date: &'a DateTime<Utc>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        #[serde(rename = "")]
        struct Trailer<'a> {
            size: usize,
            root: Reference<Catalog>,
            #[serde(rename = "ID")]
            id: (PdfStr<'a>, PdfStr<'a>),
            info: Info<'a>,
        }

        writeln!(doc, "trailer")?;
        to_writer(
            &mut doc,
            &Trailer {
                size: count + 1,
                root: catalog_ref,
                id: (PdfStr::Hex(&self.id), PdfStr::Hex(&self.id)),
                info: Info {
                    producer: PdfStr::Literal(&self.producer),
                    creation_date: &self.creation_date,
                },
            },
        )?;
        write!(doc, "\nstartxref\n{}\n%%EOF", startxref)?;

        debug!(
            "serialized {} pages, {} images, {} objects",
            self.pages.len(),
            self.images.len(),
            count
        );

        Ok(doc.into_inner())
    }
}

/// Configuration for a [`Document`]. All knobs are optional.
pub struct DocumentBuilder {
    header_height: f64,
    footer_height: f64,
    on_header: Option<BandFn>,
    on_footer: Option<BandFn>,
    default_header: Option<BandText>,
    default_footer: Option<BandText>,
    show_page_numbers: bool,
    fetcher: Option<Box<dyn ImageFetcher>>,
    id: Option<String>,
    creation_date: Option<DateTime<Utc>>,
    producer: Option<String>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        DocumentBuilder {
            header_height: 0.0,
            footer_height: 0.0,
            on_header: None,
            on_footer: None,
            default_header: None,
            default_footer: None,
            show_page_numbers: false,
            fetcher: None,
            id: None,
            creation_date: None,
            producer: None,
        }
    }
}

impl DocumentBuilder {
    /// Vertical space reserved for the header band, capped at 200pt.
    pub fn header_height(mut self, height: f64) -> Self {
        self.header_height = height.clamp(0.0, MAX_BAND_HEIGHT);
        self
    }

    /// Vertical space reserved for the footer band, capped at 200pt.
    pub fn footer_height(mut self, height: f64) -> Self {
        self.footer_height = height.clamp(0.0, MAX_BAND_HEIGHT);
        self
    }

    /// Custom header callback, overriding any default header text.
    pub fn on_header<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut BandPage<'_>, usize) + 'static,
    {
        self.on_header = Some(Box::new(f));
        self
    }

    /// Custom footer callback, overriding default footer text and page
    /// numbers.
    pub fn on_footer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut BandPage<'_>, usize) + 'static,
    {
        self.on_footer = Some(Box::new(f));
        self
    }

    pub fn default_header(mut self, band: BandText) -> Self {
        self.default_header = Some(band);
        self
    }

    pub fn default_footer(mut self, band: BandText) -> Self {
        self.default_footer = Some(band);
        self
    }

    /// Appends the 1-based page number to the default footer. With no
    /// default footer text, the footer reads `Page N`.
    pub fn footer_page_numbers(mut self, show: bool) -> Self {
        self.show_page_numbers = show;
        self
    }

    /// Fetcher used to resolve [`ImageSource::Url`] sources.
    pub fn fetcher(mut self, fetcher: Box<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Overrides the randomly generated document id (trailer `/ID`).
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Overrides the creation date (trailer `/Info /CreationDate`).
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Overrides the producer string (trailer `/Info /Producer`).
    pub fn with_producer<S: Into<String>>(mut self, producer: S) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn build(self) -> Document {
        let mut id_seq = IdSeq::new();
        let first = PageBuilder::new(&mut id_seq);
        Document {
            id_seq,
            pages: vec![first],
            current: 0,
            images: Vec::new(),
            image_keys: HashMap::new(),
            header_height: self.header_height,
            footer_height: self.footer_height,
            on_header: self.on_header,
            on_footer: self.on_footer,
            default_header: self.default_header,
            default_footer: self.default_footer,
            show_page_numbers: self.show_page_numbers,
            fetcher: self.fetcher,
            id: self
                .id
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            creation_date: self.creation_date.unwrap_or_else(Utc::now),
            producer: self
                .producer
                .unwrap_or_else(|| concat!("pdfquill v", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

fn footer_text(text: &str, show_page_numbers: bool, number: usize) -> String {
    if !show_page_numbers {
        text.to_string()
    } else if text.is_empty() {
        format!("Page {}", number)
    } else {
        format!("{} {}", text, number)
    }
}

/// Formats a coordinate with at most three decimal places and no trailing
/// zeros.
fn num(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Escapes text for a PDF literal string. Characters above U+00FF are not
/// representable in the standard encodings and degrade to `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            ch if (ch as u32) <= 0xff => out.push_str(&format!("\\{:03o}", ch as u32)),
            _ => out.push('?'),
        }
    }
    out
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("error serializing PDF object: {0}")]
    Pdf(#[from] pdfquill_obj::Error),
    #[error("failed fetching image from {url}")]
    Fetch {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("failed decoding image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("malformed data URI")]
    InvalidDataUri,
    #[error("no image fetcher configured for URL image sources")]
    NoFetcher,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(595.28), "595.28");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(811.89), "811.89");
        assert_eq!(num(1.0 / 3.0), "0.333");
    }

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn escapes_non_ascii() {
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("日本"), "??");
    }

    #[test]
    fn footer_text_variants() {
        assert_eq!(footer_text("", true, 3), "Page 3");
        assert_eq!(footer_text("Report", true, 3), "Report 3");
        assert_eq!(footer_text("Report", false, 3), "Report");
        assert_eq!(footer_text("", false, 3), "");
    }

    #[test]
    fn body_overflow_starts_new_page() {
        let mut doc = Document::new();
        let y = doc.place_text("bottom", 40.0, 835.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(y, OVERFLOW_RESET_OFFSET);
    }

    #[test]
    fn reserved_footer_shrinks_usable_area() {
        let mut doc = Document::builder().footer_height(60.0).build();
        doc.place_text("fits", 40.0, 700.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 1);
        doc.place_text("overflows", 40.0, 775.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn overflow_lands_below_reserved_header() {
        let mut doc = Document::builder().header_height(80.0).build();
        let y = doc.place_text("pushed", 40.0, 900.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn band_heights_are_capped() {
        let mut doc = Document::builder()
            .header_height(500.0)
            .footer_height(-10.0)
            .build();
        // With the header capped at 200 the usable area still ends at the
        // page bottom.
        doc.place_text("x", 40.0, 800.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 1);
        let y = doc.place_text("y", 40.0, 850.0, &TextOptions::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(y, MAX_BAND_HEIGHT + OVERFLOW_RESET_OFFSET);
    }

    #[test]
    fn alignment_shifts_x() {
        let mut doc = Document::new();
        let options = TextOptions {
            align: Align::Center,
            ..TextOptions::default()
        };
        // "wide" at size 12 approximates 24pt, so centering at 300 puts the
        // pen at 288.
        doc.place_text("wide", 300.0, 100.0, &options);
        assert!(doc.pages[0].fragments[0].contains(" 288 "));

        let options = TextOptions {
            align: Align::Right,
            ..TextOptions::default()
        };
        doc.place_text("wide", 300.0, 120.0, &options);
        assert!(doc.pages[0].fragments[1].contains(" 276 "));
    }

    #[test]
    fn band_placement_never_paginates() {
        let mut doc = Document::new();
        doc.text_at(
            0,
            Placement::Band,
            "footer",
            40.0,
            PAGE_HEIGHT - 10.0,
            &TextOptions::default(),
        );
        assert_eq!(doc.page_count(), 1);
    }
}
