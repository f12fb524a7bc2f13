use crate::piece_table::piece::PieceId;
use crate::piece_table::table::PieceTable;

/// Byte returned at the end-of-document boundary. It is not part of the
/// content and not counted by `size()`.
pub const SENTINEL_BYTE: u8 = b'\0';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Valid,
    BeforeStart,
    AfterEnd,
}

/// Bidirectional byte cursor over a document.
///
/// Valid positions are `0..=size()`. Position `size()` sits on the tail
/// sentinel piece and reads as [`SENTINEL_BYTE`]. Stepping off either end
/// makes the iterator invalid; stepping back restores it at the boundary it
/// left.
#[derive(Clone, Debug)]
pub struct TextIterator<'a> {
    table: &'a PieceTable,
    piece: PieceId,
    /// Offset into `piece`; always 0 on a sentinel.
    offset: usize,
    pos: usize,
    state: State,
}

impl<'a> TextIterator<'a> {
    pub(crate) fn new(table: &'a PieceTable, pos: usize) -> Self {
        match table.locate_byte(pos) {
            Some((piece, offset)) => Self {
                table,
                piece,
                offset,
                pos,
                state: State::Valid,
            },
            None => Self {
                table,
                piece: table.tail(),
                offset: 0,
                pos: table.size(),
                state: if pos > table.size() {
                    State::AfterEnd
                } else {
                    State::Valid
                },
            },
        }
    }

    /// Logical offset. Stays at the boundary while invalid.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state == State::Valid
    }

    pub fn get(&self) -> Option<u8> {
        if self.state != State::Valid {
            return None;
        }

        if self.piece == self.table.tail() {
            return Some(SENTINEL_BYTE);
        }

        self.table
            .slice_of(self.table.piece(self.piece))
            .get(self.offset)
            .copied()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<u8> {
        match self.state {
            State::AfterEnd => return None,
            State::BeforeStart => {
                self.seek_start();
                return self.get();
            }
            State::Valid => {}
        }

        if self.piece == self.table.tail() {
            self.state = State::AfterEnd;

            return None;
        }

        self.offset += 1;
        self.pos += 1;

        if self.offset == self.table.piece(self.piece).len() {
            self.piece = self.table.next_content(self.piece);
            self.offset = 0;
        }

        self.get()
    }

    pub fn prev(&mut self) -> Option<u8> {
        match self.state {
            State::BeforeStart => return None,
            State::AfterEnd => {
                self.seek_end();
                return self.get();
            }
            State::Valid => {}
        }

        if self.offset > 0 {
            self.offset -= 1;
            self.pos -= 1;

            return self.get();
        }

        let prev = self.table.prev_content(self.piece);

        if prev == self.table.head() {
            self.state = State::BeforeStart;

            return None;
        }

        self.piece = prev;
        self.offset = self.table.piece(prev).len() - 1;
        self.pos -= 1;

        self.get()
    }

    /// Moves to the first occurrence of `byte` at or after the current
    /// position and returns its offset. Without a match the iterator rests
    /// on the end boundary.
    pub fn find_next(&mut self, byte: u8) -> Option<usize> {
        if self.state != State::Valid {
            return None;
        }

        while self.piece != self.table.tail() {
            let slice = &self.table.slice_of(self.table.piece(self.piece))[self.offset..];

            if let Some(found) = memchr::memchr(byte, slice) {
                self.offset += found;
                self.pos += found;

                return Some(self.pos);
            }

            self.pos += slice.len();
            self.piece = self.table.next_content(self.piece);
            self.offset = 0;
        }

        None
    }

    /// Moves to the last occurrence of `byte` strictly before the current
    /// position and returns its offset. Without a match the iterator rests
    /// on offset 0.
    pub fn find_prev(&mut self, byte: u8) -> Option<usize> {
        if self.state != State::Valid {
            return None;
        }

        let mut piece = self.piece;
        let mut end = self.offset;
        let mut piece_start = self.pos - self.offset;

        loop {
            let slice = &self.table.slice_of(self.table.piece(piece))[..end];

            if let Some(found) = memchr::memrchr(byte, slice) {
                self.piece = piece;
                self.offset = found;
                self.pos = piece_start + found;

                return Some(self.pos);
            }

            piece = self.table.prev_content(piece);

            if piece == self.table.head() {
                break;
            }

            end = self.table.piece(piece).len();
            piece_start -= end;
        }

        self.seek_start();

        None
    }

    fn seek_start(&mut self) {
        self.piece = self.table.next_content(self.table.head());
        self.offset = 0;
        self.pos = 0;
        self.state = State::Valid;
    }

    fn seek_end(&mut self) {
        self.piece = self.table.tail();
        self.offset = 0;
        self.pos = self.table.size();
        self.state = State::Valid;
    }
}
