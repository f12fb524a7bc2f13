/// Stable handle of a piece inside the table's arena.
///
/// Pieces are never freed while the table lives, so a handle stays valid even
/// after its piece has been unlinked from the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(pub(crate) usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub buf_kind: crate::enums::BufferKind,
    pub range: std::ops::Range<usize>,
    pub prev: Option<PieceId>,
    pub next: Option<PieceId>,
    /// Whether the piece is currently linked into the document chain.
    pub(crate) live: bool,
}

impl Piece {
    #[inline]
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.start == self.range.end
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether `pos` in buffer `buf_kind` lies inside this piece.
    #[inline]
    pub fn covers(&self, buf_kind: crate::enums::BufferKind, pos: usize) -> bool {
        self.buf_kind == buf_kind && self.range.contains(&pos)
    }
}
