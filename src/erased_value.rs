//! Owned, type-erased values.
//!
//! An [`ErasedValue`] is one heap allocation holding exactly one payload of
//! some `'static` type, together with the runtime information needed to
//! identify, access, clone and drop it. It is what an
//! [`AnyUnique`](crate::AnyUnique) handle owns, and what
//! [`AnyUnique::release`](crate::AnyUnique::release) hands back.
//!
//! # Creating Values
//!
//! ```
//! use unique_any::{ErasedValue, TypeIdentity, markers::Cloneable};
//!
//! let value: ErasedValue = ErasedValue::new(42_u16);
//! assert_eq!(value.identity(), TypeIdentity::of::<u16>());
//! assert_eq!(value.downcast_ref::<u16>(), Some(&42));
//!
//! // Cloneable values implement `Clone`
//! let value: ErasedValue<Cloneable> = ErasedValue::new(String::from("payload"));
//! let copy = value.clone();
//! assert_eq!(copy.downcast_ref::<String>(), value.downcast_ref::<String>());
//! ```

use core::any::TypeId;

use crate::{
    TypeIdentity,
    markers::{CloneMarker, Cloneable, ObjectMarkerFor, Uncloneable},
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use unique_any_internals::{RawStorage, RawStorageMut, RawStorageRef};

    use crate::markers::{CloneMarker, Uncloneable};

    /// An owned value whose concrete type has been erased.
    ///
    /// # Type Parameters
    /// - `Cloneability`: Either [`Uncloneable`] (the default) or
    ///   [`Cloneable`](crate::markers::Cloneable). With `Cloneable`, the value
    ///   implements [`Clone`].
    #[repr(transparent)]
    pub struct ErasedValue<Cloneability: CloneMarker = Uncloneable> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. `C` must either be `Cloneable` or `Uncloneable`.
        /// 2. If `C = Cloneable`: The [`RawStorage`] must have been created
        ///    with a clone capability.
        raw: RawStorage,
        _cloneability: PhantomData<Cloneability>,
    }

    impl<C: CloneMarker> ErasedValue<C> {
        /// Creates a new value from a raw storage
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `C` must either be `Cloneable` or `Uncloneable`.
        /// 2. If `C = Cloneable`: The [`RawStorage`] must have been created
        ///    with a clone capability.
        #[must_use]
        pub(crate) unsafe fn from_raw(raw: RawStorage) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by caller
            // 2. Guaranteed by caller
            ErasedValue {
                raw,
                _cloneability: PhantomData,
            }
        }

        /// Consumes the [`ErasedValue`] and returns the inner [`RawStorage`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawStorage {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            self.raw
        }

        /// Creates a lifetime-bound [`RawStorageRef`] from the inner
        /// [`RawStorage`].
        #[must_use]
        pub(crate) fn as_raw_ref(&self) -> RawStorageRef<'_> {
            self.raw.as_ref()
        }

        /// Creates a lifetime-bound [`RawStorageMut`] from the inner
        /// [`RawStorage`].
        #[must_use]
        pub(crate) fn as_raw_mut(&mut self) -> RawStorageMut<'_> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. The type parameters do not change.
            // 2. The vtable cannot be changed through a `RawStorageMut`.
            self.raw.as_mut()
        }
    }
}
pub use limit_field_access::ErasedValue;

impl<C: CloneMarker> ErasedValue<C> {
    /// Allocates a new [`ErasedValue`] holding `value`.
    ///
    /// With `C = Cloneable` this requires `T: Clone`.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: ObjectMarkerFor<C>,
    {
        let raw = value.into_raw_storage();
        trace_event!(type_name = raw.as_ref().type_name(), "erased value created");

        // SAFETY:
        // 1. `C: CloneMarker`, which is sealed and only implemented for
        //    `Uncloneable` and `Cloneable`.
        // 2. `ObjectMarkerFor` is sealed, and its only `Cloneable` impl creates
        //    the storage with `RawStorage::new_cloneable`.
        unsafe { ErasedValue::from_raw(raw) }
    }

    /// Returns the identity of the stored type.
    #[must_use]
    pub fn identity(&self) -> TypeIdentity {
        let raw = self.as_raw_ref();
        TypeIdentity::from_parts(raw.type_id(), raw.type_name())
    }

    /// Returns the [`TypeId`] of the stored type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.as_raw_ref().type_id()
    }

    /// Returns the [`core::any::type_name`] of the stored type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.as_raw_ref().type_name()
    }

    /// Returns `true` if the stored value is of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// Returns `true` if the stored value was created with a clone capability.
    ///
    /// This is always `true` for `ErasedValue<Cloneable>`.
    #[must_use]
    pub fn is_cloneable(&self) -> bool {
        self.as_raw_ref().is_cloneable()
    }

    /// Returns an untyped pointer to the payload.
    ///
    /// The pointer is never null and stays valid for reads until the value is
    /// dropped, moved out of, or mutably borrowed. Moving the `ErasedValue`
    /// itself does not move the payload.
    #[must_use]
    pub fn as_ptr(&self) -> *const () {
        self.as_raw_ref().data_ptr().as_ptr().cast_const()
    }

    /// Returns an untyped mutable pointer to the payload.
    ///
    /// The pointer is never null and stays valid for reads and writes until
    /// the value is dropped, moved out of, or borrowed again.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut () {
        self.as_raw_mut().into_data_ptr().as_ptr()
    }

    /// Returns a reference to the payload if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            // SAFETY:
            // 1. We just checked that the type IDs match
            Some(unsafe { self.downcast_ref_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the payload if it is of type `T`.
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            // SAFETY:
            // 1. We just checked that the type IDs match
            Some(unsafe { self.downcast_mut_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a reference to the payload without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is actually of type `T` (can be verified by calling
    ///    [`is()`] first)
    ///
    /// [`is()`]: ErasedValue::is
    #[must_use]
    pub unsafe fn downcast_ref_unchecked<T: 'static>(&self) -> &T {
        debug_assert!(self.is::<T>(), "downcast to the wrong type");
        let raw = self.as_raw_ref();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { raw.downcast_unchecked::<T>() }
    }

    /// Returns a mutable reference to the payload without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is actually of type `T` (can be verified by calling
    ///    [`is()`] first)
    ///
    /// [`is()`]: ErasedValue::is
    #[must_use]
    pub unsafe fn downcast_mut_unchecked<T: 'static>(&mut self) -> &mut T {
        debug_assert!(self.is::<T>(), "downcast to the wrong type");
        let raw = self.as_raw_mut();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { raw.downcast_unchecked::<T>() }
    }

    /// Moves the payload out if it is of type `T`, freeing the allocation.
    ///
    /// Returns `Err(self)` with the original value otherwise, so ownership is
    /// never lost.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        if self.is::<T>() {
            // SAFETY:
            // 1. We just checked that the type IDs match
            Ok(unsafe { self.downcast_unchecked::<T>() })
        } else {
            Err(self)
        }
    }

    /// Moves the payload out without checking its type, freeing the
    /// allocation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is actually of type `T` (can be verified by calling
    ///    [`is()`] first)
    ///
    /// [`is()`]: ErasedValue::is
    #[must_use]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> T {
        debug_assert!(self.is::<T>(), "downcast to the wrong type");
        let raw = self.into_raw();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { raw.into_inner_unchecked::<T>() }
    }

    /// Clones the payload into a new, independent [`ErasedValue`] if the value
    /// was created with a clone capability.
    ///
    /// Returns `None` otherwise. For `ErasedValue<Cloneable>` this always
    /// succeeds; prefer [`Clone::clone`] there.
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        let raw = self.as_raw_ref().clone_storage()?;
        trace_event!(type_name = raw.as_ref().type_name(), "erased value cloned");

        // SAFETY:
        // 1. Guaranteed by the invariants of this type.
        // 2. Clones are always created with a clone capability.
        Some(unsafe { ErasedValue::from_raw(raw) })
    }

    /// Forgets the clone capability of the value.
    ///
    /// This does not modify the value in any way; it only changes the
    /// marker, so the result no longer implements [`Clone`].
    #[must_use]
    pub fn into_uncloneable(self) -> ErasedValue<Uncloneable> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `C=Uncloneable`, so this is trivially true.
        // 2. `C=Uncloneable`, so this is trivially true.
        unsafe { ErasedValue::<Uncloneable>::from_raw(raw) }
    }
}

impl Clone for ErasedValue<Cloneable> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Some(value) => value,
            None => {
                if cfg!(debug_assertions) {
                    unreachable!("ErasedValue<Cloneable> was created without a clone capability")
                } else {
                    // SAFETY: The invariants of `ErasedValue<Cloneable>` guarantee that the
                    // storage was created with a clone capability, so `try_clone` cannot
                    // return `None`. This branch is only reachable if that invariant was
                    // broken, in which case causing Undefined Behavior is valid.
                    unsafe { core::hint::unreachable_unchecked() }
                }
            }
        }
    }
}

impl From<ErasedValue<Cloneable>> for ErasedValue<Uncloneable> {
    fn from(value: ErasedValue<Cloneable>) -> Self {
        value.into_uncloneable()
    }
}

impl<C: CloneMarker> core::fmt::Debug for ErasedValue<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type_name", &self.type_name())
            .finish_non_exhaustive()
    }
}

impl<C: CloneMarker> Unpin for ErasedValue<C> {}
