//! Errors returned by the checked `try_*` accessors.

use crate::TypeIdentity;

/// The reason a checked access to an [`AnyUnique`](crate::AnyUnique) failed.
///
/// Returned by [`AnyUnique::try_get`](crate::AnyUnique::try_get),
/// [`AnyUnique::try_get_mut`](crate::AnyUnique::try_get_mut) and
/// [`AnyUnique::try_take`](crate::AnyUnique::try_take). The `Option`-returning
/// accessors report the same conditions as `None`.
///
/// # Examples
///
/// ```
/// use unique_any::{AccessError, AnyUnique, TypeIdentity};
///
/// let handle: AnyUnique = AnyUnique::new(1_i64);
/// let error = handle.try_get::<i32>().unwrap_err();
/// assert_eq!(
///     error,
///     AccessError::TypeMismatch {
///         expected: TypeIdentity::of::<i32>(),
///         found: TypeIdentity::of::<i64>(),
///     }
/// );
/// assert_eq!(error.to_string(), "type mismatch: expected `i32`, found `i64`");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AccessError {
    /// The handle does not own a value.
    #[display("the handle is empty")]
    Empty,
    /// The handle owns a value of a different type than the one requested.
    #[display("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// The identity of the type the caller asked for.
        expected: TypeIdentity,
        /// The identity of the type actually stored.
        found: TypeIdentity,
    },
}

impl AccessError {
    /// Compares the requested type against the stored identity.
    pub(crate) fn check<T: 'static>(found: TypeIdentity) -> Result<(), Self> {
        if found.is::<T>() {
            Ok(())
        } else {
            Err(Self::rejecting::<T>(found))
        }
    }

    /// The error for a request for `T` that did not match `found`.
    pub(crate) fn rejecting<T: 'static>(found: TypeIdentity) -> Self {
        if found.is_none() {
            return AccessError::Empty;
        }
        trace_event!(
            expected = core::any::type_name::<T>(),
            found = found.type_name(),
            "type mismatch on checked access"
        );
        AccessError::TypeMismatch {
            expected: TypeIdentity::of::<T>(),
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;

    #[test]
    fn test_check() {
        assert_eq!(
            AccessError::check::<u8>(TypeIdentity::none()),
            Err(AccessError::Empty)
        );
        assert_eq!(AccessError::check::<u8>(TypeIdentity::of::<u8>()), Ok(()));
        assert_eq!(
            AccessError::check::<u8>(TypeIdentity::of::<String>()),
            Err(AccessError::TypeMismatch {
                expected: TypeIdentity::of::<u8>(),
                found: TypeIdentity::of::<String>(),
            })
        );
    }

    #[test]
    fn test_rejecting() {
        assert_eq!(AccessError::rejecting::<u8>(TypeIdentity::none()), AccessError::Empty);
        assert_eq!(
            AccessError::rejecting::<u8>(TypeIdentity::of::<i8>()),
            AccessError::TypeMismatch {
                expected: TypeIdentity::of::<u8>(),
                found: TypeIdentity::of::<i8>(),
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AccessError::Empty.to_string(), "the handle is empty");
    }

    #[test]
    fn test_is_error() {
        static_assertions::assert_impl_all!(AccessError: core::error::Error, Send, Sync);
    }
}
