//! Error types for jumpdiff.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! side is a single `thiserror`-derived enum. Preconditions are checked with
//! the [`ensure!`](crate::ensure) macro and hard failures raised with
//! [`fail!`](crate::fail).
//!
//! Candidate parameter vectors that leave the model's domain are *not*
//! errors: the calibration objective scores them with a penalty value so the
//! optimizer can keep searching.

use thiserror::Error;

/// The top-level error type used throughout jumpdiff.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Input data that cannot be calibrated against (too short, non-positive
    /// or non-finite prices, inverted bounds).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A required parameter has no bound configured.
    #[error("no bound configured for parameter `{0}`")]
    MissingBound(String),

    /// A bound was configured for a parameter the model does not have.
    #[error("unknown model parameter `{0}`")]
    UnknownParameter(String),
}

/// Shorthand `Result` type used throughout jumpdiff.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use jd_core::{ensure, errors::Error};
/// fn positive(x: f64) -> jd_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::MalformedInput(...))` if `$cond` is false.
///
/// Used for checks on caller-supplied data, as opposed to API misuse.
///
/// # Example
/// ```
/// use jd_core::{ensure_input, errors::Error};
/// fn long_enough(prices: &[f64]) -> jd_core::errors::Result<()> {
///     ensure_input!(prices.len() >= 2, "need two prices, got {}", prices.len());
///     Ok(())
/// }
/// assert!(long_enough(&[1.0, 2.0]).is_ok());
/// assert!(matches!(long_enough(&[1.0]), Err(Error::MalformedInput(_))));
/// ```
#[macro_export]
macro_rules! ensure_input {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::MalformedInput(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use jd_core::{fail, errors::Error};
/// fn always_err() -> jd_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::MissingBound("lam".into()).to_string(),
            "no bound configured for parameter `lam`"
        );
        assert_eq!(
            Error::MalformedInput("too short".into()).to_string(),
            "malformed input: too short"
        );
    }

    #[test]
    fn fail_macro_returns_runtime() {
        fn f() -> Result<()> {
            fail!("boom {}", 1);
        }
        assert_eq!(f(), Err(Error::Runtime("boom 1".into())));
    }
}
