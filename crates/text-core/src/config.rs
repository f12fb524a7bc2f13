/// Tunables for a [`crate::text::Text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextOptions {
    /// Bytes reserved up front for the append-only edit buffer.
    pub add_capacity: usize,
    /// Fold consecutive edits of the most recently inserted piece into a
    /// single change. Turning this off only makes history finer grained.
    pub coalesce: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            add_capacity: crate::piece_table::BASELINE_CAPACITY,
            coalesce: true,
        }
    }
}
