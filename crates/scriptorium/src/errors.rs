//! # Error Types

/// Errors from scriptorium operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptoriumError {
    /// A symbol was looked up in a frozen indexer that has never seen it.
    #[error("unknown symbol {symbol} in frozen indexer")]
    UnknownSymbol {
        /// Debug rendering of the missing symbol.
        symbol: String,
    },

    /// An id lookup outside the assigned id range.
    #[error("id {id} out of range (len {len})")]
    OutOfRange {
        /// The requested id.
        id: usize,

        /// The number of assigned ids.
        len: usize,
    },

    /// The line lattice has no path with non-zero probability.
    ///
    /// This is a per-line failure; the trainer skips the line.
    #[error("no viable path: {reason}")]
    NoViablePath {
        /// Why the line could not be decoded.
        reason: String,
    },

    /// A persisted model blob has an unrecognized magic or schema version.
    #[error("incompatible model version: found {found:?}, expected {expected}")]
    IncompatibleModelVersion {
        /// The version found in the blob; `None` when the magic did not match.
        found: Option<u32>,

        /// The version this build reads and writes.
        expected: u32,
    },

    /// A normalized context distribution does not sum to one.
    #[error("invalid distribution for {context}: sums to {sum}")]
    InvalidDistribution {
        /// Debug rendering of the offending context.
        context: String,

        /// The observed sum.
        sum: f64,
    },

    /// A configuration value is invalid.
    #[error("invalid argument {arg}: {msg}")]
    InvalidArgument {
        /// The argument name.
        arg: &'static str,

        /// What is wrong with it.
        msg: String,
    },

    /// Too many lines of one EM iteration failed to decode.
    #[error("iteration {iteration}: {failed} of {total} lines failed to decode")]
    TooManyLineFailures {
        /// The EM iteration.
        iteration: usize,

        /// The number of failed lines.
        failed: usize,

        /// The number of lines attempted.
        total: usize,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Model blob encoding error.
    #[error(transparent)]
    Codec(#[from] bincode::Error),
}

impl ScriptoriumError {
    /// Build an [`ScriptoriumError::InvalidArgument`].
    pub(crate) fn invalid_argument<S>(
        arg: &'static str,
        msg: S,
    ) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }

    /// Build a [`ScriptoriumError::NoViablePath`].
    pub(crate) fn no_viable_path<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::NoViablePath {
            reason: reason.into(),
        }
    }

    /// Is this a per-line failure that the trainer may skip?
    pub fn is_line_local(&self) -> bool {
        matches!(self, Self::NoViablePath { .. })
    }
}

/// Result type for scriptorium operations.
pub type SCResult<T> = core::result::Result<T, ScriptoriumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_local_errors() {
        assert!(ScriptoriumError::no_viable_path("empty lattice").is_line_local());
        assert!(
            !ScriptoriumError::OutOfRange { id: 3, len: 2 }.is_line_local()
        );
        assert!(
            !ScriptoriumError::IncompatibleModelVersion {
                found: Some(7),
                expected: 1
            }
            .is_line_local()
        );
    }

    #[test]
    fn test_display() {
        let err = ScriptoriumError::UnknownSymbol {
            symbol: "\"q\"".to_string(),
        };
        assert_eq!(err.to_string(), "unknown symbol \"q\" in frozen indexer");

        let err = ScriptoriumError::invalid_argument("smoothing_count", "must be >= 0");
        assert_eq!(
            err.to_string(),
            "invalid argument smoothing_count: must be >= 0"
        );
    }
}
