pub type TextResult<T> = Result<T, TextError>;

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// Loading the backing file failed. The OS error is kept as is.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("offset {offset} out of bounds (size={size})")]
    OutOfBounds { offset: usize, size: usize },

    #[error("range {offset}+{len} out of bounds (size={size})")]
    RangeOutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
}

impl TextError {
    /// The underlying I/O error, if this error came from loading a file.
    #[must_use]
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            TextError::Io(err) => Some(err),
            _ => None,
        }
    }
}
