use crate::piece_table::piece::PieceId;
use crate::piece_table::span::Span;
use crate::piece_table::table::PieceTable;

/// A reversible edit: the pieces `old` were replaced by the pieces `new`
/// at logical offset `pos`.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub pos: usize,
    pub old: Span,
    pub new: Span,
}

impl Change {
    fn apply(&self, table: &mut PieceTable) {
        table.swap(&self.old, &self.new);
    }

    fn revert(&self, table: &mut PieceTable) {
        table.swap(&self.new, &self.old);
    }
}

/// Changes undone and redone as a single step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Revision {
    id: u64,
    changes: Vec<Change>,
}

impl Revision {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
}

/// Linear revision list with a cursor.
///
/// `revisions[0]` is the empty root revision describing the loaded state.
/// `revisions[current]` is the state the document is in; everything after it
/// can be redone until the next edit cuts it off.
#[derive(Debug)]
pub struct History {
    revisions: Vec<Revision>,
    current: usize,
    /// The current revision still accepts changes.
    pending: bool,
    /// Piece the next edit may grow or shrink in place. Only meaningful while
    /// `pending`; always a piece of the last change's `new` span.
    cache: Option<PieceId>,
    next_id: u64,
    saved: u64,
}

impl Default for History {
    fn default() -> Self {
        Self {
            revisions: vec![Revision::default()],
            current: 0,
            pending: false,
            cache: None,
            next_id: 1,
            saved: 0,
        }
    }
}

impl History {
    /// Adds `change` to the pending revision, opening a new one (and cutting
    /// off any redo branch) if nothing is pending.
    pub fn record(&mut self, change: Change, cache: Option<PieceId>) {
        if !self.pending {
            self.revisions.truncate(self.current + 1);
            self.revisions.push(Revision {
                id: self.next_id,
                changes: Vec::new(),
            });
            self.next_id += 1;
            self.current = self.revisions.len() - 1;
            self.pending = true;
        }

        self.revisions[self.current].changes.push(change);
        self.cache = cache;
    }

    /// Closes the pending revision. A no-op if nothing is pending.
    pub fn snapshot(&mut self) {
        self.pending = false;
        self.cache = None;
    }

    #[inline]
    pub fn cached_piece(&self) -> Option<PieceId> {
        self.cache.filter(|_| self.pending)
    }

    /// Accounts for `len` bytes appended in place to the cached piece.
    pub fn grow_last(&mut self, len: usize) {
        if let Some(change) = self.last_change_mut() {
            change.new.len += len;
        }
    }

    /// Accounts for `len` bytes trimmed in place from the cached piece.
    pub fn shrink_last(&mut self, len: usize) {
        if let Some(change) = self.last_change_mut() {
            change.new.len -= len;
        }
    }

    fn last_change_mut(&mut self) -> Option<&mut Change> {
        if !self.pending {
            return None;
        }

        self.revisions[self.current].changes.last_mut()
    }

    /// Reverts the current revision. Returns the offset the reverted
    /// revision started at, `None` if there is nothing to undo.
    pub fn undo(&mut self, table: &mut PieceTable) -> Option<usize> {
        self.snapshot();

        if self.current == 0 {
            return None;
        }

        let mut pos = None;

        for change in self.revisions[self.current].changes.iter().rev() {
            change.revert(table);
            pos = Some(change.pos);
        }

        self.current -= 1;

        pos
    }

    /// Reapplies the revision after the current one. Returns the offset of
    /// its last change, `None` if there is nothing to redo.
    pub fn redo(&mut self, table: &mut PieceTable) -> Option<usize> {
        self.snapshot();

        let revision = self.revisions.get(self.current + 1)?;
        let mut pos = None;

        for change in &revision.changes {
            change.apply(table);
            pos = Some(change.pos);
        }

        self.current += 1;

        pos
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.revisions.len()
    }

    #[inline]
    pub fn current(&self) -> &Revision {
        &self.revisions[self.current]
    }

    /// Remembers the current revision as the one matching the file on disk.
    pub fn mark_saved(&mut self) {
        self.snapshot();
        self.saved = self.current().id;
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.current().id != self.saved
    }
}
