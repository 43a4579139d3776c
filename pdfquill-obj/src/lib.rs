//! Serialization of PDF object syntax through serde.
//!
//! PDF dictionaries are modeled as plain Rust structs deriving
//! [`serde::Serialize`]; a custom [`Serializer`] turns them into PDF syntax
//! (`/Names`, `<< … >>` dictionaries, `[ … ]` arrays). Indirect objects and
//! references are expressed with [`Object`] and [`Reference`], literal and
//! hex strings with [`PdfStr`]/[`PdfString`].
//!
//! This crate only writes PDF syntax; it has no notion of byte offsets,
//! cross-reference tables or streams. Those live in the document layer.

mod error;
mod object;
mod ser;
mod string;

pub use crate::error::{Error, Result};
pub use crate::object::{Object, ObjectId, Reference};
pub use crate::ser::{datetime, to_string, to_writer, Serializer};
pub use crate::string::{PdfStr, PdfString};
