/// Hands out object ids for every structural entity in a document.
///
/// Ids start at 1, strictly increase and are never reused, no matter whether
/// they go to a page, a content stream, an image, or to the catalog and page
/// tree allocated during serialization.
pub(crate) struct IdSeq {
    next_id: usize,
}

impl IdSeq {
    pub(crate) fn new() -> Self {
        IdSeq { next_id: 1 }
    }

    /// Retrieves the next id.
    pub(crate) fn next(&mut self) -> usize {
        let next = self.next_id;
        self.next_id += 1;
        next
    }

    /// The amount of ids handed out so far.
    pub(crate) fn count(&self) -> usize {
        self.next_id - 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strictly_increasing_from_one() {
        let mut seq = IdSeq::new();
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.next(), 3);
        assert_eq!(seq.count(), 3);
    }

    #[test]
    fn count_starts_at_zero() {
        let seq = IdSeq::new();
        assert_eq!(seq.count(), 0);
    }
}
