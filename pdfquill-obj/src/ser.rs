use std::io;

use serde::ser::{self, Impossible, Serialize};

pub mod datetime;
mod raw;

use crate::error::{Error, Result};
use raw::RawEmitter;

// Marker names used by `Object`, `Reference` and `PdfStr` to request special
// treatment from the serializer.
pub(crate) const NAME_OBJECT: &str = "$pdf_object";
pub(crate) const NAME_REFERENCE: &str = "$pdf_reference";
pub(crate) const NAME_RAW: &str = "$pdf_raw";

/// A serializer emitting PDF object syntax into the wrapped writer.
///
/// Strings serialize as PDF names (`/Name`); literal strings are produced via
/// [`PdfStr`](crate::PdfStr). Structs become dictionaries whose `/Type` entry
/// is derived from the struct name (suppress it with `#[serde(rename = "")]`).
pub struct Serializer<W: io::Write> {
    out: W,
}

pub fn to_writer<W, T>(out: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut ser = Serializer { out };
    value.serialize(&mut ser)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    let mut ser = Serializer { out: Vec::new() };
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&ser.out).into_owned())
}

impl<W: io::Write> Serializer<W> {
    /// Writes `name` as a PDF name, `#xx`-escaping everything outside the
    /// printable ASCII range as well as delimiter characters.
    fn write_name(&mut self, name: &str) -> Result<()> {
        write!(self.out, "/")?;
        for &b in name.as_bytes() {
            match b {
                0x00 => return Err(Error::InvalidName),
                b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#' => {
                    write!(self.out, "#{:02x}", b)?
                }
                0x21..=0x7e => self.out.write_all(&[b])?,
                _ => write!(self.out, "#{:02x}", b)?,
            }
        }
        Ok(())
    }
}

/// In-progress array, dictionary or variant wrapper; the per-trait `end`
/// impls decide which closing delimiters to emit.
pub struct Compound<'a, W: io::Write> {
    ser: &'a mut Serializer<W>,
    first: bool,
}

/// Tuple structs are either ordinary arrays or one of the marker types.
pub enum Special<'a, W: io::Write> {
    Seq(Compound<'a, W>),
    Object { ser: &'a mut Serializer<W>, field: usize },
    Reference { ser: &'a mut Serializer<W>, field: usize },
}

impl<'a, W: io::Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Special<'a, W>;
    type SerializeTupleVariant = Compound<'a, W>;
    type SerializeMap = Compound<'a, W>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Compound<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        write!(self.out, "{}", if v { "true" } else { "false" })?;
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        write!(self.out, "{}", v)?;
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        write!(self.out, "{}", v)?;
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        write!(self.out, "{}", v)?;
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        write!(self.out, "({})", v)?;
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_name(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        write!(self.out, "stream\n")?;
        self.out.write_all(v)?;
        write!(self.out, "\nendstream")?;
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        write!(self.out, "null")?;
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.write_name(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match name {
            NAME_RAW => value.serialize(RawEmitter(self)),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        write!(self.out, "<< ")?;
        self.write_name(variant)?;
        write!(self.out, " ")?;
        value.serialize(&mut *self)?;
        write!(self.out, " >>")?;
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        write!(self.out, "[")?;
        Ok(Compound {
            ser: self,
            first: true,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        match name {
            NAME_OBJECT => Ok(Special::Object {
                ser: self,
                field: 0,
            }),
            NAME_REFERENCE => Ok(Special::Reference {
                ser: self,
                field: 0,
            }),
            _ => Ok(Special::Seq(self.serialize_seq(Some(len))?)),
        }
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        write!(self.out, "<< ")?;
        self.write_name(variant)?;
        write!(self.out, " [")?;
        Ok(Compound {
            ser: self,
            first: true,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        write!(self.out, "<<")?;
        Ok(Compound {
            ser: self,
            first: true,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        write!(self.out, "<<")?;
        if !name.is_empty() {
            write!(self.out, " ")?;
            self.write_name("Type")?;
            write!(self.out, " ")?;
            self.write_name(name)?;
        }
        Ok(Compound {
            ser: self,
            first: true,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        write!(self.out, "<< ")?;
        self.write_name(variant)?;
        write!(self.out, " <<")?;
        Ok(Compound {
            ser: self,
            first: true,
        })
    }
}

impl<W: io::Write> Compound<'_, W> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.first {
            self.first = false;
        } else {
            write!(self.ser.out, " ")?;
        }
        value.serialize(&mut *self.ser)
    }

    fn entry<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        write!(self.ser.out, " ")?;
        self.ser.write_name(key)?;
        write!(self.ser.out, " ")?;
        value.serialize(&mut *self.ser)
    }
}

impl<W: io::Write> ser::SerializeSeq for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, "]")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeTuple for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, "]")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeTupleVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, "] >>")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeMap for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        write!(self.ser.out, " ")?;
        key.serialize(MapKeySerializer { ser: self.ser })
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        write!(self.ser.out, " ")?;
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, " >>")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeStruct for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key, value)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, " >>")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeStructVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key, value)
    }

    fn end(self) -> Result<()> {
        write!(self.ser.out, " >> >>")?;
        Ok(())
    }
}

impl<W: io::Write> ser::SerializeTupleStruct for Special<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        use serde::ser::SerializeSeq;

        match self {
            Special::Seq(seq) => seq.serialize_element(value),
            Special::Object { ser, field } => {
                match *field {
                    1 => write!(ser.out, " ")?,
                    2 => write!(ser.out, " obj\n")?,
                    _ => {}
                }
                *field += 1;
                value.serialize(&mut **ser)
            }
            Special::Reference { ser, field } => {
                if *field > 0 {
                    write!(ser.out, " ")?;
                }
                *field += 1;
                value.serialize(&mut **ser)
            }
        }
    }

    fn end(self) -> Result<()> {
        use serde::ser::SerializeSeq;

        match self {
            Special::Seq(seq) => seq.end(),
            Special::Object { ser, .. } => {
                write!(ser.out, "\nendobj\n\n")?;
                Ok(())
            }
            Special::Reference { ser, .. } => {
                write!(ser.out, " R")?;
                Ok(())
            }
        }
    }
}

/// Dictionary keys are always PDF names.
struct MapKeySerializer<'a, W: io::Write> {
    ser: &'a mut Serializer<W>,
}

macro_rules! key_from_display {
    ($($method:ident: $ty:ty,)*) => {
        $(fn $method(self, v: $ty) -> Result<()> {
            self.ser.write_name(&v.to_string())
        })*
    };
}

macro_rules! key_unsupported {
    ($($method:ident,)*) => {
        $(fn $method(self) -> Result<()> {
            Err(Error::KeyMustBeName)
        })*
    };
}

impl<W: io::Write> ser::Serializer for MapKeySerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_str(self, v: &str) -> Result<()> {
        self.ser.write_name(v)
    }

    key_from_display! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_char: char,
    }

    key_unsupported! {
        serialize_unit,
        serialize_none,
    }

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.ser.write_name(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::KeyMustBeName)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::KeyMustBeName)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::KeyMustBeName)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::to_string;
    use serde::Serialize;

    #[test]
    fn scalars() {
        assert_eq!(to_string(&true).unwrap(), "true");
        assert_eq!(to_string(&false).unwrap(), "false");
        assert_eq!(to_string(&42u16).unwrap(), "42");
        assert_eq!(to_string(&-7i32).unwrap(), "-7");
        assert_eq!(to_string(&12.5f64).unwrap(), "12.5");
        assert_eq!(to_string(&'a').unwrap(), "(a)");
    }

    #[test]
    fn null_and_option() {
        let none: Option<()> = None;
        assert_eq!(to_string(&none).unwrap(), "null");
        assert_eq!(to_string(&Some(42)).unwrap(), "42");
    }

    #[test]
    fn strings_are_names() {
        assert_eq!(to_string(&"Name1").unwrap(), "/Name1");
        assert_eq!(to_string(&"Adobe Green").unwrap(), "/Adobe#20Green");
        assert_eq!(to_string(&"paired()parens").unwrap(), "/paired#28#29parens");
        assert_eq!(to_string(&"F#2").unwrap(), "/F#232");
    }

    #[test]
    fn seq_and_tuple() {
        assert_eq!(to_string(&vec![1, 2, 3]).unwrap(), "[1 2 3]");
        assert_eq!(to_string(&vec!["a", "b"]).unwrap(), "[/a /b]");
        assert_eq!(to_string(&(0.0, 0.0, 595.28, 841.89)).unwrap(), "[0 0 595.28 841.89]");
    }

    #[test]
    fn struct_becomes_dict_with_type() {
        #[derive(Serialize)]
        struct Test {
            int: u32,
            seq: Vec<&'static str>,
        }

        let test = Test {
            int: 1,
            seq: vec!["a", "b"],
        };
        assert_eq!(
            to_string(&test).unwrap(),
            "<< /Type /Test /int 1 /seq [/a /b] >>"
        );
    }

    #[test]
    fn renamed_empty_suppresses_type() {
        #[derive(Serialize)]
        #[serde(rename = "")]
        struct Meta {
            length: usize,
        }

        assert_eq!(to_string(&Meta { length: 12 }).unwrap(), "<< /length 12 >>");
    }

    #[test]
    fn nested_struct() {
        #[derive(Serialize)]
        struct Inner {
            int: u32,
        }

        #[derive(Serialize)]
        struct Outer {
            inner: Inner,
        }

        assert_eq!(
            to_string(&Outer {
                inner: Inner { int: 2 }
            })
            .unwrap(),
            "<< /Type /Outer /inner << /Type /Inner /int 2 >> >>"
        );
    }

    #[test]
    fn map_becomes_dict() {
        let mut map = BTreeMap::new();
        map.insert("foo", "bar");
        assert_eq!(to_string(&map).unwrap(), "<< /foo /bar >>");
    }

    #[test]
    fn enum_forms() {
        #[derive(Serialize)]
        enum E {
            Unit,
            Newtype(u32),
            Tuple(u32, u32),
            Struct { a: u32 },
        }

        assert_eq!(to_string(&E::Unit).unwrap(), "/Unit");
        assert_eq!(to_string(&E::Newtype(1)).unwrap(), "<< /Newtype 1 >>");
        assert_eq!(to_string(&E::Tuple(1, 2)).unwrap(), "<< /Tuple [1 2] >>");
        assert_eq!(
            to_string(&E::Struct { a: 1 }).unwrap(),
            "<< /Struct << /a 1 >> >>"
        );
    }
}
