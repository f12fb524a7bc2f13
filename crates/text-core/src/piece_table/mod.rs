/// # Piece Table Module.
///
/// The document is a doubly linked chain of pieces living in an arena.
/// Each piece references a slice of either the original file or the
/// append-only edit buffer; walking the chain from the head sentinel to the
/// tail sentinel yields the document.
pub mod piece;
pub mod span;
pub mod table;

/// Initial reservation of the edit buffer.
pub const BASELINE_CAPACITY: usize = 4096;
