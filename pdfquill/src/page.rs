use std::collections::{BTreeMap, BTreeSet};

use pdfquill_obj::Reference;
use serde::Serialize;

use crate::fonts::{FontObject, StandardFont};
use crate::idseq::IdSeq;
use crate::image::ImageMeta;

/// Mutable state of one page while the document is being built.
///
/// A page owns its structural object id, a distinct content-stream object id,
/// the ordered list of content-stream fragments, and its resource usage: the
/// `resource name -> font` mapping (recorded the moment a font is first used
/// on the page) plus the set of registry indices of the images it draws.
pub(crate) struct PageBuilder {
    pub(crate) id: usize,
    pub(crate) contents_id: usize,
    pub(crate) fragments: Vec<String>,
    pub(crate) fonts: BTreeMap<String, StandardFont>,
    pub(crate) images: BTreeSet<usize>,
}

impl PageBuilder {
    pub(crate) fn new(id_seq: &mut IdSeq) -> Self {
        PageBuilder {
            id: id_seq.next(),
            contents_id: id_seq.next(),
            fragments: Vec::new(),
            fonts: BTreeMap::new(),
            images: BTreeSet::new(),
        }
    }

    /// Registers `font` on this page and returns its resource name.
    pub(crate) fn use_font(&mut self, font: StandardFont) -> String {
        let name = font.resource_name();
        self.fonts.entry(name.clone()).or_insert(font);
        name
    }

    /// The page's content stream: fragments joined by newlines.
    pub(crate) fn content(&self) -> Vec<u8> {
        self.fragments.join("\n").into_bytes()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Catalog {
    pub pages: Reference<Pages>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Pages {
    pub media_box: (f64, f64, f64, f64),
    pub kids: Vec<Reference<Page>>,
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Page {
    pub parent: Reference<Pages>,
    pub resources: Resources,
    pub contents: Reference<StreamMeta>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
#[serde(rename = "")]
pub(crate) struct Resources {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub font: BTreeMap<String, FontObject>,
    #[serde(rename = "XObject", skip_serializing_if = "BTreeMap::is_empty")]
    pub x_object: BTreeMap<String, Reference<ImageMeta>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
#[serde(rename = "")]
pub(crate) struct StreamMeta {
    pub length: usize,
}

#[cfg(test)]
mod test {
    use super::*;
    use pdfquill_obj::{to_string, ObjectId};

    #[test]
    fn page_and_stream_ids_are_distinct() {
        let mut seq = IdSeq::new();
        let a = PageBuilder::new(&mut seq);
        let b = PageBuilder::new(&mut seq);
        assert_ne!(a.id, a.contents_id);
        assert_ne!(b.id, b.contents_id);
        assert!(b.id > a.contents_id);
    }

    #[test]
    fn font_registered_once() {
        let mut seq = IdSeq::new();
        let mut page = PageBuilder::new(&mut seq);
        let font = crate::fonts::resolve("helvetica", Default::default());
        assert_eq!(page.use_font(font), "F4");
        assert_eq!(page.use_font(font), "F4");
        assert_eq!(page.fonts.len(), 1);
    }

    #[test]
    fn content_joins_fragments() {
        let mut seq = IdSeq::new();
        let mut page = PageBuilder::new(&mut seq);
        page.fragments.push("BT ET".into());
        page.fragments.push("q Q".into());
        assert_eq!(page.content(), b"BT ET\nq Q");
    }

    #[test]
    fn catalog_dict() {
        let catalog = Catalog {
            pages: Reference::new(ObjectId::new(3, 0)),
        };
        assert_eq!(
            to_string(&catalog).unwrap(),
            "<< /Type /Catalog /Pages 3 0 R >>"
        );
    }

    #[test]
    fn pages_dict() {
        let pages = Pages {
            media_box: (0.0, 0.0, 595.28, 841.89),
            kids: vec![Reference::new(ObjectId::new(1, 0))],
            count: 1,
        };
        assert_eq!(
            to_string(&pages).unwrap(),
            "<< /Type /Pages /MediaBox [0 0 595.28 841.89] /Kids [1 0 R] /Count 1 >>"
        );
    }

    #[test]
    fn empty_resources_serialize_empty() {
        let resources = Resources {
            font: BTreeMap::new(),
            x_object: BTreeMap::new(),
        };
        assert_eq!(to_string(&resources).unwrap(), "<< >>");
    }
}
