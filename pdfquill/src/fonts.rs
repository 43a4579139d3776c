//! The 14 standard Type 1 fonts. They require no embedded font program, so a
//! font here is nothing but a position in a fixed table plus its base name;
//! width information is a documented character-count heuristic, not glyph
//! metrics.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    fn suffix(self) -> &'static str {
        match self {
            FontStyle::Normal => "",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bolditalic",
        }
    }
}

/// One of the 14 standard fonts. `index` is the position in the fixed table
/// and determines the page resource name `F<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardFont {
    index: usize,
    base_name: &'static str,
}

// Keyed by normalized `family` or `family-style`.
const STANDARD_FONTS: [(&str, &str); 14] = [
    ("courier", "Courier"),
    ("courier-bold", "Courier-Bold"),
    ("courier-italic", "Courier-Oblique"),
    ("courier-bolditalic", "Courier-BoldOblique"),
    ("helvetica", "Helvetica"),
    ("helvetica-bold", "Helvetica-Bold"),
    ("helvetica-italic", "Helvetica-Oblique"),
    ("helvetica-bolditalic", "Helvetica-BoldOblique"),
    ("times", "Times-Roman"),
    ("times-bold", "Times-Bold"),
    ("times-italic", "Times-Italic"),
    ("times-bolditalic", "Times-BoldItalic"),
    ("symbol", "Symbol"),
    ("zapfdingbats", "ZapfDingbats"),
];

static BY_KEY: Lazy<HashMap<&'static str, StandardFont>> = Lazy::new(|| {
    STANDARD_FONTS
        .iter()
        .enumerate()
        .map(|(index, &(key, base_name))| (key, StandardFont { index, base_name }))
        .collect()
});

/// Resolves a font family and style against the fixed table. Unmapped input
/// silently degrades to Helvetica.
pub(crate) fn resolve(family: &str, style: FontStyle) -> StandardFont {
    let family = family.trim().to_ascii_lowercase();
    let key = match style.suffix() {
        "" => family,
        suffix => format!("{}-{}", family, suffix),
    };
    BY_KEY
        .get(key.as_str())
        .copied()
        .unwrap_or_else(|| BY_KEY["helvetica"])
}

impl StandardFont {
    pub fn base_name(&self) -> &'static str {
        self.base_name
    }

    pub(crate) fn resource_name(&self) -> String {
        format!("F{}", self.index)
    }

    pub(crate) fn object(&self) -> FontObject {
        FontObject {
            subtype: FontType::Type1,
            base_font: self.base_name,
            encoding: FontEncoding::WinAnsiEncoding,
        }
    }
}

#[derive(Serialize)]
pub(crate) enum FontType {
    Type1,
}

#[derive(Serialize)]
pub(crate) enum FontEncoding {
    WinAnsiEncoding,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
#[serde(rename = "Font")]
pub(crate) struct FontObject {
    pub subtype: FontType,
    pub base_font: &'static str,
    pub encoding: FontEncoding,
}

// Coarse width approximation: half the font size per character. Good enough
// for the alignment correction; callers needing exact alignment measure with
// their own metrics and place left-aligned.
const AVG_CHAR_WIDTH: f64 = 0.5;

pub(crate) fn approx_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * AVG_CHAR_WIDTH
}

#[cfg(test)]
mod test {
    use super::*;
    use pdfquill_obj::to_string;

    #[test]
    fn resolves_family_and_style() {
        assert_eq!(resolve("helvetica", FontStyle::Normal).base_name(), "Helvetica");
        assert_eq!(resolve("Helvetica", FontStyle::Bold).base_name(), "Helvetica-Bold");
        assert_eq!(resolve("times", FontStyle::Italic).base_name(), "Times-Italic");
        assert_eq!(
            resolve("courier", FontStyle::BoldItalic).base_name(),
            "Courier-BoldOblique"
        );
        assert_eq!(resolve("symbol", FontStyle::Normal).base_name(), "Symbol");
    }

    #[test]
    fn unmapped_degrades_to_helvetica() {
        assert_eq!(resolve("comic sans", FontStyle::Normal).base_name(), "Helvetica");
        assert_eq!(resolve("symbol", FontStyle::Bold).base_name(), "Helvetica");
        assert_eq!(resolve("", FontStyle::Normal).base_name(), "Helvetica");
    }

    #[test]
    fn resource_names_are_positional() {
        assert_eq!(resolve("courier", FontStyle::Normal).resource_name(), "F0");
        assert_eq!(resolve("helvetica", FontStyle::Normal).resource_name(), "F4");
        assert_eq!(resolve("zapfdingbats", FontStyle::Normal).resource_name(), "F13");
    }

    #[test]
    fn font_dict() {
        let font = resolve("helvetica", FontStyle::Normal);
        assert_eq!(
            to_string(&font.object()).unwrap(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
        );
    }

    #[test]
    fn width_heuristic() {
        assert_eq!(approx_width("Hello", 12.0), 30.0);
        assert_eq!(approx_width("", 12.0), 0.0);
    }
}
