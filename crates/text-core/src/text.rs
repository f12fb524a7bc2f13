/// A document: piece chain plus edit history.
///
/// - Offsets are logical byte offsets into the current content.
/// - Edits between two [`Text::snapshot`] calls form one revision and are
///   undone together.
/// - Reads take `&self`; an iterator borrows the document so it cannot be
///   edited while one is alive.
#[derive(Debug)]
pub struct Text {
    piece_table: crate::piece_table::table::PieceTable,
    history: crate::history::History,
    options: crate::config::TextOptions,
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

/*

==========================
===== CREATION, LOAD =====
==========================

*/

impl Text {
    /// Creates a new, empty document.
    pub fn new() -> Self {
        Self::with_options(None, crate::config::TextOptions::default())
    }

    fn with_options(
        original: Option<io::mmap::MmapFile>,
        options: crate::config::TextOptions,
    ) -> Self {
        Self {
            piece_table: crate::piece_table::table::PieceTable::new(
                original,
                options.add_capacity,
            ),
            history: crate::history::History::default(),
            options,
        }
    }

    /// Opens `path` (or nothing, for an empty document) with default options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::TextError::Io`] carrying the OS error if the
    /// file does not exist, lacks read permissions, is a directory or cannot
    /// be mapped.
    pub fn load<P: AsRef<std::path::Path>>(path: Option<P>) -> crate::errors::TextResult<Self> {
        Self::load_with(path, crate::config::TextOptions::default())
    }

    /// Like [`Text::load`] with explicit options.
    ///
    /// # Errors
    ///
    /// See [`Text::load`].
    pub fn load_with<P: AsRef<std::path::Path>>(
        path: Option<P>,
        options: crate::config::TextOptions,
    ) -> crate::errors::TextResult<Self> {
        let Some(path) = path else {
            return Ok(Self::with_options(None, options));
        };
        let path = path.as_ref();
        let mmap_file = io::mmap::MmapFile::open(path).inspect_err(|err| {
            log::debug!("loading {} failed: {err}", path.display());
        })?;

        log::debug!("loaded {} ({} bytes)", path.display(), mmap_file.len());

        Ok(Self::with_options(Some(mmap_file), options))
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl Text {
    /// Returns the total byte size of the document.
    #[inline]
    pub fn size(&self) -> usize {
        self.piece_table.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.piece_table.is_empty()
    }

    /// Whether the current revision differs from the last saved one.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.history.is_modified()
    }

    /// The file this document was loaded from, if any.
    #[inline]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.piece_table.original().map(io::mmap::MmapFile::path)
    }

    #[inline]
    pub fn options(&self) -> &crate::config::TextOptions {
        &self.options
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl Text {
    /// Copies up to `out.len()` bytes starting at `offset` and returns the
    /// count. Reading at or past the end yields zero bytes.
    pub fn bytes_into(&self, offset: usize, out: &mut [u8]) -> usize {
        self.piece_table.bytes_into(offset, out)
    }

    /// Up to `max_len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, max_len: usize) -> Vec<u8> {
        let len = max_len.min(self.size().saturating_sub(offset));
        let mut res = vec![0; len];
        let copied = self.bytes_into(offset, &mut res);

        res.truncate(copied);
        res
    }

    /// The whole document.
    pub fn content(&self) -> Vec<u8> {
        self.bytes(0, self.size())
    }

    /// Returns an iterator that yields sequential zero-copy byte slices
    /// representing the document.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.piece_table.chunks()
    }

    /// Streams the document into `writer`, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> std::io::Result<usize> {
        let mut written = 0;

        for chunk in self.chunks() {
            writer.write_all(chunk)?;
            written += chunk.len();
        }

        writer.flush()?;

        Ok(written)
    }

    pub fn iterator_at(&self, offset: usize) -> crate::iterator::TextIterator<'_> {
        crate::iterator::TextIterator::new(&self.piece_table, offset)
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl Text {
    /// Inserts `data` at `offset`.
    ///
    /// Inserting nothing always succeeds, whatever `offset` is.
    ///
    /// # Errors
    ///
    /// [`crate::errors::TextError::OutOfBounds`] if `offset > size()`. The
    /// document and its history are left untouched.
    pub fn insert(&mut self, offset: usize, data: &[u8]) -> crate::errors::TextResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let size = self.size();

        if offset > size {
            return Err(crate::errors::TextError::OutOfBounds { offset, size });
        }

        if self.options.coalesce
            && let Some(cached) = self.history.cached_piece()
            && self.piece_table.try_extend(cached, offset, data)
        {
            self.history.grow_last(data.len());
            log::trace!("insert {} bytes at {offset} (cached)", data.len());

            return Ok(());
        }

        let (change, inserted) = self.piece_table.insert(offset, data)?;

        self.history.record(change, Some(inserted));
        log::trace!("insert {} bytes at {offset}", data.len());

        Ok(())
    }

    /// Deletes `len` bytes starting at `offset`.
    ///
    /// Deleting nothing always succeeds.
    ///
    /// # Errors
    ///
    /// [`crate::errors::TextError::RangeOutOfBounds`] if `offset + len`
    /// runs past `size()`. The document and its history are left untouched.
    pub fn delete(&mut self, offset: usize, len: usize) -> crate::errors::TextResult<()> {
        if len == 0 {
            return Ok(());
        }

        let size = self.size();

        if offset.checked_add(len).is_none_or(|end| end > size) {
            return Err(crate::errors::TextError::RangeOutOfBounds { offset, len, size });
        }

        if self.options.coalesce
            && let Some(cached) = self.history.cached_piece()
            && self.piece_table.try_shrink(cached, offset, len)
        {
            self.history.shrink_last(len);
            log::trace!("delete {len} bytes at {offset} (cached)");

            return Ok(());
        }

        let change = self.piece_table.delete(offset, len)?;

        self.history.record(change, None);
        log::trace!("delete {len} bytes at {offset}");

        Ok(())
    }
}

/*

====================================
=========== UNDO / REDO ============
====================================

*/

impl Text {
    /// Closes the pending revision so the next edit starts a new one.
    pub fn snapshot(&mut self) {
        self.history.snapshot();
    }

    /// Reverts the most recent revision. Returns the offset it started at,
    /// or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<usize> {
        let pos = self.history.undo(&mut self.piece_table);

        log::debug!("undo -> {pos:?}");

        pos
    }

    /// Reapplies the next revision. Returns the offset of its last change,
    /// or `None` if there is nothing to redo.
    pub fn redo(&mut self) -> Option<usize> {
        let pos = self.history.redo(&mut self.piece_table);

        log::debug!("redo -> {pos:?}");

        pos
    }

    /// Records the current state as the one persisted by the caller.
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }
}

/*

=================
===== MARKS =====
=================

*/

impl Text {
    /// Anchors a mark at `offset`. Returns [`crate::mark::Mark::Invalid`] if
    /// `offset > size()`.
    pub fn mark_set(&self, offset: usize) -> crate::mark::Mark {
        self.piece_table.mark_set(offset)
    }

    /// Current offset of `mark`, `None` while its byte is deleted.
    pub fn mark_get(&self, mark: crate::mark::Mark) -> Option<usize> {
        self.piece_table.mark_get(mark)
    }
}
