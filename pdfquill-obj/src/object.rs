use std::marker::PhantomData;

use serde::{ser::SerializeTupleStruct, Serialize, Serializer};

use crate::ser::{NAME_OBJECT, NAME_REFERENCE};

/// Identifier of an indirect object: object number plus generation.
///
/// Ids are write-once values handed out by the document's allocator, so this
/// is a plain `Copy` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    id: usize,
    rev: usize,
}

impl ObjectId {
    pub fn new(id: usize, rev: usize) -> Self {
        ObjectId { id, rev }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn rev(&self) -> usize {
        self.rev
    }
}

/// An indirect object: serializes as `<id> <rev> obj\n<content>\nendobj`.
pub struct Object<D: Serialize> {
    id: ObjectId,
    content: D,
}

impl<D: Serialize> Object<D> {
    pub fn new(id: usize, rev: usize, content: D) -> Self {
        Object {
            id: ObjectId::new(id, rev),
            content,
        }
    }

    pub fn id(&self) -> usize {
        self.id.id()
    }

    pub fn rev(&self) -> usize {
        self.id.rev()
    }

    pub fn to_reference(&self) -> Reference<D> {
        Reference::new(self.id)
    }
}

impl<D: Serialize> Serialize for Object<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_tuple_struct(NAME_OBJECT, 3)?;
        s.serialize_field(&self.id.id())?;
        s.serialize_field(&self.id.rev())?;
        s.serialize_field(&self.content)?;
        s.end()
    }
}

/// A typed reference to an indirect object: serializes as `<id> <rev> R`.
pub struct Reference<D>(ObjectId, PhantomData<D>);

impl<D> Reference<D> {
    pub fn new(id: ObjectId) -> Self {
        Reference(id, PhantomData)
    }

    pub fn id(&self) -> usize {
        self.0.id()
    }
}

impl<D> Clone for Reference<D> {
    fn clone(&self) -> Self {
        Reference(self.0, PhantomData)
    }
}

impl<D> Copy for Reference<D> {}

impl<D> Serialize for Reference<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_tuple_struct(NAME_REFERENCE, 2)?;
        s.serialize_field(&self.0.id())?;
        s.serialize_field(&self.0.rev())?;
        s.end()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ser::to_string;

    #[test]
    fn serialize_object() {
        let obj = Object::new(3, 1, ());
        assert_eq!(to_string(&obj).unwrap(), "3 1 obj\nnull\nendobj\n\n");
    }

    #[test]
    fn serialize_object_with_dict() {
        use serde::Serialize;

        #[derive(Serialize)]
        #[serde(rename = "")]
        struct Meta {
            length: usize,
        }

        let obj = Object::new(7, 0, Meta { length: 42 });
        assert_eq!(
            to_string(&obj).unwrap(),
            "7 0 obj\n<< /length 42 >>\nendobj\n\n"
        );
    }

    #[test]
    fn serialize_reference() {
        let obj = Object::new(3, 1, ());
        assert_eq!(to_string(&obj.to_reference()).unwrap(), "3 1 R");
    }
}
