/// A run of linked pieces, `start` to `end` inclusive.
///
/// An empty span has no pieces. Pieces of a span keep their `prev`/`next`
/// links while unlinked from the document, which is what lets a change be
/// swapped back in unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub ends: Option<(crate::piece_table::piece::PieceId, crate::piece_table::piece::PieceId)>,
    /// Sum of the lengths of the pieces in the span.
    pub len: usize,
}

impl Span {
    #[inline]
    pub fn new(
        start: crate::piece_table::piece::PieceId,
        end: crate::piece_table::piece::PieceId,
        len: usize,
    ) -> Self {
        Self {
            ends: Some((start, end)),
            len,
        }
    }

    #[inline]
    pub fn single(id: crate::piece_table::piece::PieceId, len: usize) -> Self {
        Self::new(id, id, len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ends.is_none()
    }
}
