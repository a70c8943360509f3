//! Error types for the canonical motion front-end.
//!
//! All error types use `thiserror` for ergonomic error handling, matching
//! the rest of the GCodeKit5 workspace. Most of spec's error taxonomy
//! (configuration-fatal, bounds-rejection, the zero-motion guard) is
//! handled by logging and silent sentinels rather than `Result::Err` — see
//! `SPEC_FULL.md` §7 for the mapping. `CanonError` covers the remaining
//! cases: malformed caller input and probe-log I/O failure.

use thiserror::Error;

/// Errors a dispatch call can return to its caller.
#[derive(Error, Debug)]
pub enum CanonError {
    /// The requested arc has a zero or negative radius.
    #[error("degenerate arc: radius {radius} at line {line}")]
    DegenerateArc { radius: f64, line: u32 },

    /// A spline or NURBS curve was given fewer control points than its order requires.
    #[error("spline needs at least {needed} control points, got {got}")]
    InsufficientControlPoints { needed: usize, got: usize },

    /// Biarc fitting could not find a valid split point after exhausting retries.
    #[error("biarc fit failed to converge after {attempts} attempts")]
    BiarcDidNotConverge { attempts: u32 },

    /// The probe log file could not be opened or written.
    #[error("probe log I/O error: {0}")]
    ProbeLog(#[from] std::io::Error),

    /// A pocket/tool-table index was out of the configured range.
    #[error("tool table pocket {pocket} out of range (0..{max})")]
    PocketOutOfRange { pocket: u32, max: u32 },
}

/// Result type alias for canon dispatch operations.
pub type CanonResult<T> = Result<T, CanonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        let err = CanonError::DegenerateArc { radius: 0.0, line: 42 };
        assert_eq!(err.to_string(), "degenerate arc: radius 0 at line 42");

        let err = CanonError::PocketOutOfRange { pocket: 99, max: 16 };
        assert_eq!(err.to_string(), "tool table pocket 99 out of range (0..16)");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CanonError = io_err.into();
        assert!(matches!(err, CanonError::ProbeLog(_)));
    }
}
