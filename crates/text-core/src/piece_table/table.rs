use std::ops::{AddAssign, SubAssign};

use crate::enums::BufferKind;
use crate::errors::{TextError, TextResult};
use crate::history::Change;
use crate::piece_table::piece::{Piece, PieceId};
use crate::piece_table::span::Span;

#[derive(Debug)]
pub struct PieceTable {
    /// Original unchanged content (shared, zero-copy). `None` for a
    /// document that was not loaded from a file.
    original: Option<io::mmap::MmapFile>,
    /// Append-only buffer storing inserted bytes.
    buf: Vec<u8>,
    /// Arena holding every piece ever created, linked or not.
    pieces: Vec<Piece>,
    head: PieceId,
    tail: PieceId,
    /// Sum of the lengths of all linked pieces.
    size: usize,
}

/// Walks the linked content pieces, sentinels excluded.
pub struct Pieces<'a> {
    table: &'a PieceTable,
    next: Option<PieceId>,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = (PieceId, &'a Piece);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.filter(|id| *id != self.table.tail)?;
        let piece = self.table.piece(id);

        self.next = piece.next;

        Some((id, piece))
    }
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PieceTable {
    pub fn new(original: Option<io::mmap::MmapFile>, add_capacity: usize) -> Self {
        let sentinel = |prev, next| Piece {
            buf_kind: BufferKind::Add,
            range: 0..0,
            prev,
            next,
            live: true,
        };
        let head = PieceId(0);
        let tail = PieceId(1);
        let mut table = Self {
            original: None,
            buf: Vec::with_capacity(add_capacity),
            pieces: vec![sentinel(None, Some(tail)), sentinel(Some(head), None)],
            head,
            tail,
            size: 0,
        };

        if let Some(len) = original.as_ref().map(io::mmap::MmapFile::len)
            && len > 0
        {
            let id = table.alloc(Piece {
                buf_kind: BufferKind::Original,
                range: 0..len,
                prev: Some(head),
                next: Some(tail),
                live: false,
            });

            table.swap(&Span::default(), &Span::single(id, len));
        }

        table.original = original;
        table
    }

    #[inline]
    fn alloc(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.pieces.len());

        self.pieces.push(piece);
        id
    }

    /// Handle the next `alloc` will return.
    #[inline]
    fn next_id(&self, skip: usize) -> PieceId {
        PieceId(self.pieces.len() + skip)
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Total document length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    #[inline]
    fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0]
    }

    #[inline]
    pub fn head(&self) -> PieceId {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> PieceId {
        self.tail
    }

    #[inline]
    pub fn original(&self) -> Option<&io::mmap::MmapFile> {
        self.original.as_ref()
    }

    #[inline]
    pub fn slice_of(&self, piece: &Piece) -> &[u8] {
        match piece.buf_kind {
            BufferKind::Original => self
                .original
                .as_ref()
                .map_or(&[][..], io::mmap::MmapFile::as_slice)
                .get(piece.range.clone())
                .unwrap_or_default(),
            BufferKind::Add => &self.buf[piece.range.clone()],
        }
    }

    #[inline]
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces {
            table: self,
            next: self.piece(self.head).next,
        }
    }

    /// Linked pieces as zero-copy byte slices, in document order.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.pieces().map(move |(_, piece)| self.slice_of(piece))
    }

    /// Next linked piece holding bytes, or the tail sentinel.
    pub fn next_content(&self, id: PieceId) -> PieceId {
        let mut next = self.piece(id).next;

        while let Some(candidate) = next {
            if candidate == self.tail || !self.piece(candidate).is_empty() {
                return candidate;
            }

            next = self.piece(candidate).next;
        }

        self.tail
    }

    /// Previous linked piece holding bytes, or the head sentinel.
    pub fn prev_content(&self, id: PieceId) -> PieceId {
        let mut prev = self.piece(id).prev;

        while let Some(candidate) = prev {
            if candidate == self.head || !self.piece(candidate).is_empty() {
                return candidate;
            }

            prev = self.piece(candidate).prev;
        }

        self.head
    }

    /// Finds the piece an insertion at `pos` lands in: the first piece,
    /// head sentinel included, whose end is at or past `pos`.
    pub fn locate_insert(&self, pos: usize) -> Option<(PieceId, usize)> {
        let mut cur = 0;
        let mut next = Some(self.head);

        while let Some(id) = next {
            let piece = self.piece(id);
            let piece_len = piece.len();

            if pos <= cur + piece_len {
                return Some((id, pos - cur));
            }

            cur.add_assign(piece_len);
            next = piece.next;
        }

        None
    }

    /// Finds the piece holding the byte at `pos`.
    pub fn locate_byte(&self, pos: usize) -> Option<(PieceId, usize)> {
        let mut cur = 0;

        for (id, piece) in self.pieces() {
            let piece_len = piece.len();

            if pos < cur + piece_len {
                return Some((id, pos - cur));
            }

            cur.add_assign(piece_len);
        }

        None
    }
}

/*

=====================================
========= INSERT / DELETE  ==========
=====================================

*/

impl PieceTable {
    fn append(&mut self, bytes: &[u8]) -> std::ops::Range<usize> {
        let start = self.buf.len();

        self.buf.extend_from_slice(bytes);

        start..self.buf.len()
    }

    /// Links `new` in place of `old`. Both spans must describe the same
    /// neighbourhood: `new`'s outer links point at `old`'s neighbours.
    pub(crate) fn swap(&mut self, old: &Span, new: &Span) {
        let (prev, next, first, last) = match (old.ends, new.ends) {
            (None, None) => return,
            (None, Some((start, end))) => (
                self.piece(start).prev,
                self.piece(end).next,
                Some(start),
                Some(end),
            ),
            (Some((start, end)), None) => {
                let prev = self.piece(start).prev;
                let next = self.piece(end).next;

                (prev, next, next, prev)
            }
            (Some((old_start, old_end)), Some((new_start, new_end))) => (
                self.piece(old_start).prev,
                self.piece(old_end).next,
                Some(new_start),
                Some(new_end),
            ),
        };

        if let Some(prev) = prev {
            self.piece_mut(prev).next = first;
        }

        if let Some(next) = next {
            self.piece_mut(next).prev = last;
        }

        self.set_live(old, false);
        self.set_live(new, true);
        self.size.sub_assign(old.len);
        self.size.add_assign(new.len);
    }

    fn set_live(&mut self, span: &Span, live: bool) {
        let Some((start, end)) = span.ends else {
            return;
        };
        let mut id = start;

        loop {
            let piece = self.piece_mut(id);

            piece.live = live;

            match piece.next {
                Some(next) if id != end => id = next,
                _ => break,
            }
        }
    }

    /// Appends `bytes` to the edit buffer and splices a piece referencing
    /// them in at `pos`. Returns the change together with the new piece.
    pub(crate) fn insert(&mut self, pos: usize, bytes: &[u8]) -> TextResult<(Change, PieceId)> {
        let (id, offset) = self.locate_insert(pos).ok_or(TextError::OutOfBounds {
            offset: pos,
            size: self.size,
        })?;
        let range = self.append(bytes);
        let len = range.len();
        let piece = self.piece(id).clone();

        let (change, inserted) = if offset == piece.len() {
            // Boundary: link the new piece between `id` and its successor.
            let inserted = self.alloc(Piece {
                buf_kind: BufferKind::Add,
                range,
                prev: Some(id),
                next: piece.next,
                live: false,
            });

            (
                Change {
                    pos,
                    old: Span::default(),
                    new: Span::single(inserted, len),
                },
                inserted,
            )
        } else {
            let before = self.next_id(0);
            let inserted = self.next_id(1);
            let after = self.next_id(2);
            let split = piece.range.start + offset;

            self.alloc(Piece {
                buf_kind: piece.buf_kind,
                range: piece.range.start..split,
                prev: piece.prev,
                next: Some(inserted),
                live: false,
            });
            self.alloc(Piece {
                buf_kind: BufferKind::Add,
                range,
                prev: Some(before),
                next: Some(after),
                live: false,
            });
            self.alloc(Piece {
                buf_kind: piece.buf_kind,
                range: split..piece.range.end,
                prev: Some(inserted),
                next: piece.next,
                live: false,
            });

            (
                Change {
                    pos,
                    old: Span::single(id, piece.len()),
                    new: Span::new(before, after, piece.len() + len),
                },
                inserted,
            )
        };

        self.swap(&change.old, &change.new);

        Ok((change, inserted))
    }

    /// Unlinks the pieces covering `pos..pos + len`, splitting the outer
    /// ones so only the covered bytes leave the chain.
    pub(crate) fn delete(&mut self, pos: usize, len: usize) -> TextResult<Change> {
        let out_of_bounds = TextError::RangeOutOfBounds {
            offset: pos,
            len,
            size: self.size,
        };
        let Some((start_id, start_offset)) = self.locate_byte(pos) else {
            return Err(out_of_bounds);
        };
        // Bytes to drop counted from the start of `start_id`.
        let mut remaining = start_offset + len;
        let mut old_len = 0;
        let mut id = start_id;

        let end_offset = loop {
            let piece = self.piece(id);
            let piece_len = piece.len();

            old_len.add_assign(piece_len);

            if remaining <= piece_len {
                break remaining;
            }

            remaining.sub_assign(piece_len);

            match piece.next {
                Some(next) if next != self.tail => id = next,
                _ => return Err(out_of_bounds),
            }
        };
        let end_id = id;
        let start = self.piece(start_id).clone();
        let end = self.piece(end_id).clone();

        let before = (start_offset > 0).then(|| {
            self.alloc(Piece {
                buf_kind: start.buf_kind,
                range: start.range.start..start.range.start + start_offset,
                prev: start.prev,
                next: end.next,
                live: false,
            })
        });
        let after = (end_offset < end.len()).then(|| {
            self.alloc(Piece {
                buf_kind: end.buf_kind,
                range: end.range.start + end_offset..end.range.end,
                prev: before.or(start.prev),
                next: end.next,
                live: false,
            })
        });
        let new_len = start_offset + (end.len() - end_offset);

        let new = match (before, after) {
            (Some(before), Some(after)) => {
                self.piece_mut(before).next = Some(after);

                Span::new(before, after, new_len)
            }
            (Some(only), None) | (None, Some(only)) => Span::single(only, new_len),
            (None, None) => Span::default(),
        };
        let change = Change {
            pos,
            old: Span::new(start_id, end_id, old_len),
            new,
        };

        self.swap(&change.old, &change.new);

        Ok(change)
    }

    /// Grows piece `id` by `bytes` if an insertion at `pos` lands right at
    /// its end and the piece ends at the tail of the edit buffer.
    pub(crate) fn try_extend(&mut self, id: PieceId, pos: usize, bytes: &[u8]) -> bool {
        let piece = self.piece(id);

        if !piece.live
            || piece.buf_kind != BufferKind::Add
            || piece.range.end != self.buf.len()
            || self.locate_insert(pos) != Some((id, piece.len()))
        {
            return false;
        }

        let range = self.append(bytes);

        self.piece_mut(id).range.end = range.end;
        self.size.add_assign(range.len());

        true
    }

    /// Shrinks piece `id` by `len` bytes if `pos..pos + len` is a strict
    /// prefix or suffix of it. The dropped bytes stay in the edit buffer.
    pub(crate) fn try_shrink(&mut self, id: PieceId, pos: usize, len: usize) -> bool {
        let piece = self.piece(id);
        let piece_len = piece.len();

        if !piece.live || len >= piece_len {
            return false;
        }

        let Some((found, offset)) = self.locate_byte(pos) else {
            return false;
        };

        if found != id || offset + len > piece_len {
            return false;
        }

        let piece = self.piece_mut(id);

        if offset == 0 {
            piece.range.start.add_assign(len);
        } else if offset + len == piece_len {
            piece.range.end.sub_assign(len);
        } else {
            return false;
        }

        self.size.sub_assign(len);

        true
    }
}

/*

====================================
========== MISCELLANEOUS ===========
====================================

*/

impl PieceTable {
    /// Copies up to `out.len()` bytes starting at `pos`. Returns the number
    /// of bytes copied, zero if `pos` is at or past the end.
    pub fn bytes_into(&self, pos: usize, out: &mut [u8]) -> usize {
        let mut copied = 0;
        let mut cur = 0;

        for (_, piece) in self.pieces() {
            if copied == out.len() {
                break;
            }

            let piece_end = cur + piece.len();

            if pos < piece_end {
                let slice = &self.slice_of(piece)[pos.saturating_sub(cur)..];
                let take = slice.len().min(out.len() - copied);

                out[copied..copied + take].copy_from_slice(&slice[..take]);
                copied.add_assign(take);
            }

            cur = piece_end;
        }

        copied
    }
}

#[cfg(test)]
mod piece_table_tests {
    use std::io::Write;

    use crate::enums::BufferKind;
    use crate::piece_table::table::PieceTable;

    fn pt_from_str(s: &str) -> (PieceTable, tempfile::NamedTempFile) {
        let mut temp_file = tempfile::NamedTempFile::new().expect("could not create temp file");

        write!(temp_file, "{s}").expect("could not write");
        temp_file.as_file().sync_all().unwrap();

        let mmap = io::mmap::MmapFile::open(temp_file.path()).unwrap();

        (PieceTable::new(Some(mmap), 16), temp_file)
    }

    fn content(pt: &PieceTable) -> Vec<u8> {
        pt.chunks().flatten().copied().collect()
    }

    #[test]
    fn new_len_matches_original() {
        let (pt, _file) = pt_from_str("hello");

        assert_eq!(pt.size(), 5);
        assert_eq!(pt.pieces().count(), 1);
        assert_eq!(content(&pt), b"hello");
    }

    #[test]
    fn empty_table_has_only_sentinels() {
        let pt = PieceTable::new(None, 0);

        assert!(pt.is_empty());
        assert_eq!(pt.pieces().count(), 0);
        assert_eq!(pt.piece(pt.head()).next, Some(pt.tail()));
        assert_eq!(pt.locate_insert(0), Some((pt.head(), 0)));
        assert_eq!(pt.locate_byte(0), None);
    }

    #[test]
    fn insert_middle_splits_piece() {
        let (mut pt, _file) = pt_from_str("helo");
        let original = pt.locate_byte(0).unwrap().0;

        let (change, inserted) = pt.insert(3, b"l").unwrap();

        assert_eq!(content(&pt), b"hello");
        assert_eq!(pt.pieces().count(), 3);
        assert_eq!(change.old.ends, Some((original, original)));
        assert_eq!(change.new.len, 5);
        assert!(!pt.piece(original).is_live());
        assert!(pt.piece(inserted).is_live());
        assert_eq!(pt.piece(inserted).buf_kind, BufferKind::Add);
    }

    #[test]
    fn insert_at_boundaries_does_not_split() {
        let (mut pt, _file) = pt_from_str("world");

        let (start, _) = pt.insert(0, b"hello ").unwrap();
        let (end, _) = pt.insert(pt.size(), b"!").unwrap();

        assert!(start.old.is_empty());
        assert!(end.old.is_empty());
        assert_eq!(content(&pt), b"hello world!");
        assert_eq!(pt.pieces().count(), 3);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let (mut pt, _file) = pt_from_str("abc");

        assert!(pt.insert(4, b"x").is_err());
        assert_eq!(content(&pt), b"abc");
    }

    #[test]
    fn delete_middle_of_single_piece() {
        let (mut pt, _file) = pt_from_str("hello cruel world");

        let change = pt.delete(5, 6).unwrap();

        assert_eq!(content(&pt), b"hello world");
        assert_eq!(change.old.len, 17);
        assert_eq!(change.new.len, 11);
        assert_eq!(pt.size(), 11);
    }

    #[test]
    fn delete_across_pieces() {
        let (mut pt, _file) = pt_from_str("ad");

        pt.insert(1, b"bc").unwrap();
        pt.insert(4, b"ef").unwrap();
        assert_eq!(content(&pt), b"abcdef");

        let change = pt.delete(1, 4).unwrap();

        assert_eq!(content(&pt), b"af");
        assert_eq!(change.old.len, 5);
        assert_eq!(change.new.len, 1);
    }

    #[test]
    fn delete_whole_pieces_leaves_empty_new_span() {
        let mut pt = PieceTable::new(None, 0);

        pt.insert(0, b"abc").unwrap();

        let change = pt.delete(0, 3).unwrap();

        assert!(change.new.is_empty());
        assert!(pt.is_empty());
        assert_eq!(pt.piece(pt.head()).next, Some(pt.tail()));
    }

    #[test]
    fn swap_back_restores_chain() {
        let (mut pt, _file) = pt_from_str("abcdef");

        let change = pt.delete(2, 2).unwrap();
        assert_eq!(content(&pt), b"abef");

        pt.swap(&change.new, &change.old);
        assert_eq!(content(&pt), b"abcdef");
        assert_eq!(pt.size(), 6);

        pt.swap(&change.old, &change.new);
        assert_eq!(content(&pt), b"abef");
    }

    #[test]
    fn extend_only_at_piece_end() {
        let mut pt = PieceTable::new(None, 0);
        let (_, inserted) = pt.insert(0, b"ab").unwrap();

        assert!(!pt.try_extend(inserted, 1, b"x"));
        assert!(pt.try_extend(inserted, 2, b"cd"));
        assert_eq!(content(&pt), b"abcd");
        assert_eq!(pt.pieces().count(), 1);
    }

    #[test]
    fn extend_requires_buffer_tail() {
        let mut pt = PieceTable::new(None, 0);
        let (_, first) = pt.insert(0, b"ab").unwrap();

        pt.insert(0, b"zz").unwrap();

        assert!(!pt.try_extend(first, 4, b"c"));
    }

    #[test]
    fn shrink_prefix_and_suffix_only() {
        let mut pt = PieceTable::new(None, 0);
        let (_, inserted) = pt.insert(0, b"abcdef").unwrap();

        assert!(!pt.try_shrink(inserted, 2, 2));
        assert!(pt.try_shrink(inserted, 0, 1));
        assert_eq!(content(&pt), b"bcdef");
        assert!(pt.try_shrink(inserted, 3, 2));
        assert_eq!(content(&pt), b"bcd");
        assert!(!pt.try_shrink(inserted, 0, 3));
        assert_eq!(pt.size(), 3);
    }

    #[test]
    fn bytes_into_across_pieces() {
        let (mut pt, _file) = pt_from_str("Hello world");

        pt.insert(6, b"beautiful ").unwrap();

        let mut out = [0u8; 8];
        let copied = pt.bytes_into(4, &mut out);

        assert_eq!(copied, 8);
        assert_eq!(&out, b"o beauti");

        let mut rest = [0u8; 64];
        let copied = pt.bytes_into(16, &mut rest);

        assert_eq!(&rest[..copied], b"world");
        assert_eq!(pt.bytes_into(pt.size(), &mut rest), 0);
        assert_eq!(pt.bytes_into(pt.size() + 10, &mut rest), 0);
    }

    #[test]
    fn chunks_of_empty_document() {
        let (pt, _file) = pt_from_str("");

        assert!(content(&pt).is_empty());
        assert!(pt.original().is_some());
    }
}
