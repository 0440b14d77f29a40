use thiserror::Error;

/// Failure building or compiling a [`crate::Pattern`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PatternError {
    #[error("times({n}) requires n >= 1")]
    InvalidRepeatCount { n: u32 },

    #[error("between({min}, {max}) requires min <= max and max >= 1")]
    InvalidRepeatRange { min: u32, max: u32 },

    #[error("one_of requires at least two alternatives")]
    TooFewAlternatives,

    #[error("anchor is not at the outermost start/end of the pattern")]
    MisplacedAnchor,
}

/// Misuse of a [`crate::Scanner`] after its stream has ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ScannerError {
    #[error("scanner already ended; push or end called after end()")]
    AlreadyEnded,
}
