//! Marker types and traits for defining cloneability semantics.
//!
//! This module provides type-level markers that control whether an
//! [`AnyUnique`] handle and an [`ErasedValue`] can be cloned. The marker is the
//! generic parameter `C` in [`AnyUnique<C>`](crate::AnyUnique) and
//! [`ErasedValue<C>`](crate::ErasedValue).
//!
//! # Design Philosophy
//!
//! The constraints encoded by these markers are enforced at construction time.
//! It is impossible to construct an `AnyUnique<Cloneable>` around a value that
//! cannot be cloned. This means you can trust that calling
//! [`Clone::clone`] on an `AnyUnique<Cloneable>` always produces an independent
//! copy of the payload, without any runtime check that could fail.
//!
//! - [`Uncloneable`] (the default): any `'static` type can be stored. The
//!   handle does not implement [`Clone`].
//! - [`Cloneable`]: only types implementing [`Clone`] can be stored. The handle
//!   implements [`Clone`] by duplicating the payload.
//!
//! # Examples
//!
//! ```
//! use unique_any::{AnyUnique, markers};
//!
//! let handle: AnyUnique<markers::Cloneable> = AnyUnique::new(String::from("hello"));
//! let copy = handle.clone();
//! assert_eq!(copy.get::<String>().map(String::as_str), Some("hello"));
//!
//! // Forgetting the capability is always possible
//! let plain: AnyUnique<markers::Uncloneable> = handle.into_uncloneable();
//! assert!(plain.is::<String>());
//! ```
//!
//! Storing a non-cloneable type in a cloneable handle does not compile:
//!
//! ```compile_fail
//! use unique_any::{AnyUnique, markers};
//!
//! struct NotClone;
//! let handle: AnyUnique<markers::Cloneable> = AnyUnique::new(NotClone);
//! ```
//!
//! [`AnyUnique`]: crate::AnyUnique
//! [`ErasedValue`]: crate::ErasedValue

use unique_any_internals::RawStorage;

/// Marker type for handles and values whose payload can be cloned.
///
/// Values can only be stored under this marker when they implement
/// [`Clone`]. In exchange, [`AnyUnique<Cloneable>`](crate::AnyUnique) and
/// [`ErasedValue<Cloneable>`](crate::ErasedValue) implement [`Clone`].
///
/// # Examples
///
/// ```
/// use unique_any::{AnyUnique, markers::Cloneable};
///
/// let original: AnyUnique<Cloneable> = AnyUnique::new(vec![1, 2, 3]);
/// let copy = original.clone();
///
/// let a = original.get::<Vec<i32>>().unwrap();
/// let b = copy.get::<Vec<i32>>().unwrap();
/// assert_eq!(a, b);
/// assert!(!core::ptr::eq(a, b));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Cloneable;

/// Marker type for handles and values with no clone capability.
///
/// This is the default marker. Any `'static` type can be stored, and the
/// handle cannot be cloned:
///
/// ```compile_fail
/// use unique_any::AnyUnique;
///
/// let handle: AnyUnique = AnyUnique::new(5_u8);
/// let copy = handle.clone();
/// ```
///
/// [`AnyUnique::try_clone`](crate::AnyUnique::try_clone) still works when the
/// stored value happened to be created with a clone capability, for example
/// after [`into_uncloneable`](crate::AnyUnique::into_uncloneable).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Uncloneable;

mod sealed_clone_marker {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for Cloneable {}
    impl Sealed for Uncloneable {}

    /// Ties a payload type to the markers it may be stored under. Only this
    /// crate can name this trait, so downstream crates cannot add
    /// `ObjectMarkerFor` impls of their own.
    pub trait SealedFor<C> {}

    impl<O: Sized + 'static> SealedFor<Uncloneable> for O {}
    impl<O: Clone + 'static> SealedFor<Cloneable> for O {}
}

/// Marker trait for the cloneability semantics of handles and values.
///
/// This trait is implemented for [`Cloneable`] and [`Uncloneable`], and is
/// the bound on the `Cloneability` parameter of
/// [`AnyUnique`](crate::AnyUnique) and [`ErasedValue`](crate::ErasedValue).
/// It is sealed and cannot be implemented outside of this crate.
pub trait CloneMarker: sealed_clone_marker::Sealed {}

impl CloneMarker for Cloneable {}
impl CloneMarker for Uncloneable {}

/// Marker trait tying a payload type to the cloneability marker it is stored
/// under.
///
/// - For `C = Uncloneable`: implemented for all `Sized + 'static` types.
/// - For `C = Cloneable`: implemented only for `Sized + 'static` types that
///   are also [`Clone`].
///
/// This trait is used as a bound on every constructor, which is what makes it
/// impossible to build an `AnyUnique<Cloneable>` around a non-cloneable value.
/// It is sealed, so a non-cloneable type cannot opt into `Cloneable` by
/// implementing it by hand:
///
/// ```compile_fail
/// use unique_any::{AnyUnique, markers::{Cloneable, ObjectMarkerFor}};
/// use unique_any_internals::RawStorage;
///
/// struct NotClone(u32);
///
/// impl ObjectMarkerFor<Cloneable> for NotClone {
///     fn into_raw_storage(self) -> RawStorage {
///         RawStorage::new(self)
///     }
/// }
///
/// let handle: AnyUnique<Cloneable> = AnyUnique::new(NotClone(1));
/// let _copy = handle.clone();
/// ```
pub trait ObjectMarkerFor<C: CloneMarker>:
    sealed_clone_marker::SealedFor<C> + Sized + 'static
{
    /// Moves the value into a freshly allocated type-erased storage with the
    /// capabilities required by the marker `C`.
    #[doc(hidden)]
    fn into_raw_storage(self) -> RawStorage;
}

impl<O: Sized + 'static> ObjectMarkerFor<Uncloneable> for O {
    #[inline(always)]
    fn into_raw_storage(self) -> RawStorage {
        RawStorage::new(self)
    }
}

impl<O: Sized + 'static> ObjectMarkerFor<Cloneable> for O
where
    O: Clone,
{
    #[inline(always)]
    fn into_raw_storage(self) -> RawStorage {
        RawStorage::new_cloneable(self)
    }
}
