use serde::{Serialize, Serializer};

use crate::ser::NAME_RAW;

/// An owned PDF string in literal (`(…)`) or hex (`<…>`) form.
pub enum PdfString {
    Hex(String),
    Literal(String),
}

/// Borrowed counterpart of [`PdfString`].
pub enum PdfStr<'a> {
    Hex(&'a str),
    Literal(&'a str),
}

impl Serialize for PdfString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            PdfString::Hex(s) => to_hex(s),
            PdfString::Literal(s) => to_literal(s),
        };
        serializer.serialize_newtype_struct(NAME_RAW, &s)
    }
}

impl Serialize for PdfStr<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            PdfStr::Hex(s) => to_hex(s),
            PdfStr::Literal(s) => to_literal(s),
        };
        serializer.serialize_newtype_struct(NAME_RAW, &s)
    }
}

fn to_hex(s: &str) -> String {
    let mut buf = String::with_capacity(s.len() * 2 + 2);
    buf.push('<');
    for b in s.bytes() {
        buf.push_str(&format!("{:02X}", b));
    }
    buf.push('>');
    buf
}

/// Escapes a literal string: backslash and parentheses get a backslash
/// escape, other non-printable or non-ASCII Latin-1 code points become octal
/// escapes, anything beyond U+00FF is replaced (the 14 standard fonts cannot
/// show it anyway).
fn to_literal(s: &str) -> String {
    let mut buf = String::with_capacity(s.len() + 2);
    buf.push('(');
    for ch in s.chars() {
        match ch {
            '\\' => buf.push_str(r"\\"),
            '(' => buf.push_str(r"\("),
            ')' => buf.push_str(r"\)"),
            ' '..='~' => buf.push(ch),
            _ => match u32::from(ch) {
                cp @ 0x01..=0xff => buf.push_str(&format!("\\{:03o}", cp)),
                _ => buf.push('?'),
            },
        }
    }
    buf.push(')');
    buf
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ser::to_string;

    #[test]
    fn hex_string() {
        assert_eq!(
            to_string(&PdfString::Hex(String::from("foobar"))).unwrap(),
            "<666F6F626172>"
        );
        assert_eq!(to_string(&PdfStr::Hex("foobar")).unwrap(), "<666F6F626172>");
    }

    #[test]
    fn literal_escapes() {
        assert_eq!(
            to_string(&PdfStr::Literal(r"a(b)c\d")).unwrap(),
            r"(a\(b\)c\\d)"
        );
        assert_eq!(to_string(&PdfStr::Literal("hello")).unwrap(), "(hello)");
    }

    #[test]
    fn literal_non_ascii() {
        // U+00E9 fits Latin-1 and becomes an octal escape; U+20AC does not.
        assert_eq!(to_string(&PdfStr::Literal("café")).unwrap(), "(caf\\351)");
        assert_eq!(to_string(&PdfStr::Literal("1€")).unwrap(), "(1?)");
    }

    #[test]
    fn literal_newline() {
        assert_eq!(to_string(&PdfStr::Literal("a\nb")).unwrap(), "(a\\012b)");
    }
}
