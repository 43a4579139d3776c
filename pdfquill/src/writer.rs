use std::collections::HashMap;
use std::io::{self, Write};

use log::trace;
use pdfquill_obj::{to_writer, Object, Reference};
use serde::Serialize;

use crate::document::Error;

/// A writer that keeps track of a PDF XREF table while forwarding writes to
/// its wrapped writer.
///
/// It records how many bytes have already been written, so every emitted
/// object's offset equals the literal byte position of its `<id> 0 obj`
/// header in the output.
pub(crate) struct DocWriter<W: io::Write> {
    w: W,
    len: usize,
    xref: HashMap<usize, usize>,
}

impl<W: io::Write> DocWriter<W> {
    pub(crate) fn new(w: W) -> Self {
        DocWriter {
            w,
            len: 0,
            xref: HashMap::new(),
        }
    }

    pub(crate) fn into_inner(self) -> W {
        self.w
    }

    /// The length in bytes of the already written PDF output.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Records the current position as the XREF offset for `id`.
    pub(crate) fn add_xref(&mut self, id: usize) {
        trace!("object {} at offset {}", id, self.len);
        self.xref.insert(id, self.len);
    }

    /// Emits `content` as indirect object `id`, recording its offset, and
    /// returns a reference to it.
    pub(crate) fn serialize_object<D: Serialize>(
        &mut self,
        id: usize,
        content: D,
    ) -> Result<Reference<D>, Error> {
        self.add_xref(id);
        let obj = Object::new(id, 0, content);
        let reference = obj.to_reference();
        to_writer(&mut *self, &obj)?;
        Ok(reference)
    }

    /// Emits a stream object: `meta` must carry a `/Length` equal to
    /// `data.len()`.
    pub(crate) fn write_stream<D: Serialize>(
        &mut self,
        id: usize,
        meta: &D,
        data: &[u8],
    ) -> Result<(), Error> {
        self.add_xref(id);
        write!(self, "{} 0 obj\n", id)?;
        to_writer(&mut *self, meta)?;
        write!(self, "\nstream\n")?;
        self.write_all(data)?;
        write!(self, "\nendstream\nendobj\n\n")?;
        Ok(())
    }

    /// Writes the XREF section: one 20-byte line per object id in id order,
    /// starting with the free-list head for id 0. `count` is the number of
    /// ids handed out; the table is gap-free because ids are allocated
    /// contiguously.
    pub(crate) fn write_xref(&mut self, count: usize) -> io::Result<()> {
        writeln!(self, "xref")?;
        writeln!(self, "0 {}", count + 1)?;
        write!(self, "0000000000 65535 f \n")?;
        for id in 1..=count {
            let offset = self.xref.get(&id).copied().unwrap_or(0);
            write!(self, "{:010} 00000 n \n", offset)?;
        }
        Ok(())
    }
}

impl<W: io::Write> io::Write for DocWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        let len = self.w.write(buf)?;
        self.len += len;
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.w.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pdfquill_obj::PdfStr;

    #[test]
    fn len_tracks_written_bytes() {
        let mut out = Vec::new();
        let mut w = DocWriter::new(&mut out);
        write!(w, "%PDF-1.7\n").unwrap();
        assert_eq!(w.len(), 9);
    }

    #[test]
    fn object_offset_matches_header_position() {
        let mut out = Vec::new();
        let mut w = DocWriter::new(&mut out);
        write!(w, "%PDF-1.7\n").unwrap();
        w.serialize_object(1, PdfStr::Literal("hi")).unwrap();
        w.serialize_object(2, PdfStr::Literal("there")).unwrap();
        let offsets = w.xref.clone();
        drop(w);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text[offsets[&1]..].find("1 0 obj"), Some(0));
        assert_eq!(text[offsets[&2]..].find("2 0 obj"), Some(0));
    }

    #[test]
    fn stream_length_is_exact() {
        let mut out = Vec::new();
        let mut w = DocWriter::new(&mut out);

        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        #[serde(rename = "")]
        struct Meta {
            length: usize,
        }

        let data = b"BT /F4 12 Tf ET";
        w.write_stream(3, &Meta { length: data.len() }, data).unwrap();
        drop(w);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3 0 obj\n<< /Length 15 >>\nstream\n"));
        let start = text.find("stream\n").unwrap() + "stream\n".len();
        let end = text.find("\nendstream").unwrap();
        assert_eq!(&text[start..end], "BT /F4 12 Tf ET");
    }

    #[test]
    fn xref_entries_are_20_bytes() {
        let mut out = Vec::new();
        let mut w = DocWriter::new(&mut out);
        w.add_xref(1);
        write!(w, "x").unwrap();
        w.add_xref(2);
        w.write_xref(2).unwrap();
        drop(w);

        let text = String::from_utf8(out).unwrap();
        let body = text.strip_prefix("x").unwrap();
        assert_eq!(body, "xref\n0 3\n0000000000 65535 f \n0000000000 00000 n \n0000000001 00000 n \n");
        for line in body.lines().skip(2) {
            assert_eq!(line.len() + 1, 20);
        }
    }
}
