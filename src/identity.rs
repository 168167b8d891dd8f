//! Runtime identity tokens for stored types.

use core::{any::TypeId, fmt, hash};

/// Uninhabited type backing [`TypeIdentity::none`].
///
/// No value of this type can exist, so no handle can ever store one and the
/// sentinel identity can never match a stored payload.
enum NoType {}

/// An opaque, comparable token identifying a concrete type at runtime.
///
/// Two identities compare equal if and only if they denote the same concrete
/// type. Comparison and hashing only look at the [`TypeId`]; the type name is
/// carried along for diagnostics.
///
/// Empty handles report [`TypeIdentity::none`].
///
/// # Examples
///
/// ```
/// use unique_any::{AnyUnique, TypeIdentity};
///
/// let handle: AnyUnique = AnyUnique::new(5_u32);
/// assert_eq!(handle.identity(), TypeIdentity::of::<u32>());
/// assert_ne!(handle.identity(), TypeIdentity::of::<i32>());
///
/// let empty: AnyUnique = AnyUnique::empty();
/// assert!(empty.identity().is_none());
/// ```
#[derive(Clone, Copy)]
pub struct TypeIdentity {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeIdentity {
    /// Returns the identity of the type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the sentinel "no type" identity reported by empty handles.
    ///
    /// It never compares equal to the identity of a type a value can be
    /// stored as.
    #[must_use]
    pub fn none() -> Self {
        Self {
            type_id: TypeId::of::<NoType>(),
            type_name: "<none>",
        }
    }

    /// Returns `true` if this is the [`TypeIdentity::none`] sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.type_id == TypeId::of::<NoType>()
    }

    /// Returns `true` if this identity denotes the type `T`.
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the underlying [`TypeId`].
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the [`core::any::type_name`] of the type, or `"<none>"` for
    /// the sentinel.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Builds an identity from the parts reported by a type-erased storage.
    pub(crate) fn from_parts(type_id: TypeId, type_name: &'static str) -> Self {
        Self { type_id, type_name }
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeIdentity {}

impl PartialEq<TypeId> for TypeIdentity {
    fn eq(&self, other: &TypeId) -> bool {
        self.type_id == *other
    }
}

impl hash::Hash for TypeIdentity {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeIdentity").field(&self.type_name).finish()
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl From<TypeIdentity> for TypeId {
    fn from(identity: TypeIdentity) -> Self {
        identity.type_id
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};

    use super::*;

    #[test]
    fn test_identity_equality() {
        assert_eq!(TypeIdentity::of::<u32>(), TypeIdentity::of::<u32>());
        assert_ne!(TypeIdentity::of::<u32>(), TypeIdentity::of::<i32>());
        assert_ne!(TypeIdentity::of::<u32>(), TypeIdentity::of::<f32>());
        assert_ne!(TypeIdentity::of::<&'static str>(), TypeIdentity::of::<String>());
        assert_eq!(TypeIdentity::of::<String>(), TypeId::of::<String>());
    }

    #[test]
    fn test_identity_none() {
        let none = TypeIdentity::none();
        assert!(none.is_none());
        assert!(!TypeIdentity::of::<()>().is_none());
        assert_ne!(none, TypeIdentity::of::<()>());
        assert_eq!(none, TypeIdentity::none());
        assert_eq!(none.type_name(), "<none>");
    }

    #[test]
    fn test_identity_formatting() {
        let identity = TypeIdentity::of::<u8>();
        assert_eq!(format!("{identity}"), "u8");
        assert_eq!(format!("{identity:?}"), "TypeIdentity(\"u8\")");
        assert!(identity.is::<u8>());
        assert!(!identity.is::<i8>());
    }
}
