/// Backing storage a piece points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// The immutable content the document was loaded from.
    Original,
    /// The append-only edit buffer.
    Add,
}
