pub type BotResult<T> = Result<T, BotError>;

#[derive(Debug, PartialEq)]
pub enum BotError {
    /// `lnum` (or a byte offset, for the scanner) fell outside the range a
    /// given operation permits.
    IndexOutOfBound(usize),
    /// The scanner was handed bytes that are not valid UTF-8.
    InvalidUtf8,
    /// A checked arithmetic operation overflowed, or a width conversion
    /// between `u64`/`i64`/`i128`/`usize` failed.
    Overflow,
    /// Tree construction was handed zero lines; a BOT always has a root.
    EmptyInput,
}

impl From<std::num::TryFromIntError> for BotError {
    fn from(_: std::num::TryFromIntError) -> Self {
        BotError::Overflow
    }
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::IndexOutOfBound(idx) => write!(f, "line index {idx} is out of bounds"),
            BotError::InvalidUtf8 => write!(f, "buffer is not valid UTF-8"),
            BotError::Overflow => write!(f, "arithmetic overflow in line index"),
            BotError::EmptyInput => write!(f, "cannot build a line index over zero lines"),
        }
    }
}

impl std::error::Error for BotError {}
