//! Utility macros and functions for the HTTP crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the framing engine.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Example
///
/// ```ignore
/// ensure!(headers.len() <= max_num, ParseError::too_many_headers(max_num));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Position of the first CRLF in `bytes`, if any.
#[inline]
pub(crate) fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|window| window == b"\r\n")
}
