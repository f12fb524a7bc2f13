use crate::enums::BufferKind;
use crate::piece_table::table::PieceTable;

/// A position that follows the text around it.
///
/// Internally a mark remembers the backing byte it was set on rather than a
/// logical offset. Backing bytes never move, so the mark shifts with any edit
/// before it and survives piece splits. Finding it again is a walk over the
/// chain, O(number of pieces).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Returned for out of range offsets. Never resolves.
    Invalid,
    /// The end of the document, wherever it currently is.
    End,
    Byte { buf_kind: BufferKind, pos: usize },
}

impl Mark {
    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Mark::Invalid)
    }
}

impl PieceTable {
    pub fn mark_set(&self, offset: usize) -> Mark {
        if offset > self.size() {
            return Mark::Invalid;
        }

        match self.locate_byte(offset) {
            Some((id, piece_offset)) => {
                let piece = self.piece(id);

                Mark::Byte {
                    buf_kind: piece.buf_kind,
                    pos: piece.range.start + piece_offset,
                }
            }
            None => Mark::End,
        }
    }

    /// Logical offset of `mark`, or `None` if the byte it was set on is not
    /// part of the document right now.
    pub fn mark_get(&self, mark: Mark) -> Option<usize> {
        let (buf_kind, pos) = match mark {
            Mark::Invalid => return None,
            Mark::End => return Some(self.size()),
            Mark::Byte { buf_kind, pos } => (buf_kind, pos),
        };
        let mut cur = 0;

        for (_, piece) in self.pieces() {
            if piece.covers(buf_kind, pos) {
                return Some(cur + pos - piece.range.start);
            }

            cur += piece.len();
        }

        None
    }
}
