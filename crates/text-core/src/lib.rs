//! Piece-chain text storage with revision based undo/redo, marks and a
//! bidirectional byte iterator.
pub mod config;
pub mod enums;
pub mod errors;
pub mod history;
pub mod iterator;
pub mod mark;
pub mod piece_table;
pub mod text;

pub use config::TextOptions;
pub use errors::{TextError, TextResult};
pub use iterator::{SENTINEL_BYTE, TextIterator};
pub use mark::Mark;
pub use text::Text;
