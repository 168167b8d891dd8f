//! This module encapsulates the fields of the [`StorageData`]. Since this is
//! the only place they are visible, this means that the type of the
//! [`StorageVtable`] is guaranteed to always be in sync with the type of the
//! actual value. This follows from the fact that they are in sync when
//! created and that the API offers no way to change the [`StorageVtable`] or
//! the value type after creation.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{
    storage::{
        raw::{RawStorage, RawStorageMut, RawStorageRef},
        vtable::StorageVtable,
    },
    util::Erased,
};

/// Type-erased storage with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable field even when the concrete
/// value type `T` is unknown.
#[repr(C)]
pub(super) struct StorageData<T: 'static> {
    /// The vtable of this storage
    vtable: &'static StorageVtable,
    /// The stored value
    value: T,
}

impl<T: 'static> StorageData<T> {
    /// Creates a new [`StorageData`] without a clone capability.
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Self {
            vtable: StorageVtable::new::<T>(),
            value,
        }
    }

    /// Creates a new [`StorageData`] whose vtable is able to clone the value.
    #[inline]
    pub(super) fn new_cloneable(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            vtable: StorageVtable::new_cloneable::<T>(),
            value,
        }
    }

    /// Returns a pointer to the `value` field of the [`StorageData`] behind
    /// `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized `StorageData<T>` for exactly this `T`.
    #[inline]
    pub(super) unsafe fn value_ptr(ptr: NonNull<StorageData<Erased>>) -> NonNull<()> {
        let ptr: *mut StorageData<T> = ptr.cast::<StorageData<T>>().as_ptr();

        // SAFETY: The pointer is valid for a `StorageData<T>` as guaranteed by the
        // caller. We only project to the field and never create a reference to
        // the whole struct.
        let value_ptr: *mut T = unsafe { &raw mut (*ptr).value };

        // SAFETY: A field projection of a non-null pointer is itself non-null.
        unsafe { NonNull::new_unchecked(value_ptr.cast::<()>()) }
    }
}

impl RawStorage {
    /// Moves the stored value out of the storage and frees the allocation.
    ///
    /// The value itself is not dropped; ownership of it is handed to the
    /// caller.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`StorageData`].
    #[inline]
    pub unsafe fn into_inner_unchecked<T: 'static>(self) -> T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.as_ref().type_id(), TypeId::of::<T>());

        let ptr: NonNull<StorageData<Erased>> = self.into_non_null();
        let ptr: *mut StorageData<T> = ptr.cast::<StorageData<T>>().as_ptr();

        // SAFETY:
        // - The pointer came from `Box::into_raw` (guaranteed by the invariants of
        //   `RawStorage`) and ownership was released by `into_non_null`.
        // - The type `T` matches the stored value (guaranteed by the caller).
        let boxed: Box<StorageData<T>> = unsafe { Box::from_raw(ptr) };
        let data: StorageData<T> = *boxed;
        data.value
    }
}

impl<'a> RawStorageRef<'a> {
    /// Returns a reference to the [`StorageVtable`] of the [`StorageData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static StorageVtable {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual inner value type, but we do know
        // that it points to an instance of `StorageData<T>` for some specific `T`.
        // Since `StorageData<T>` is `#[repr(C)]`, that means that it's
        // safe to create pointers to the fields before the actual value.
        //
        // We need to take care to avoid creating an actual reference to
        // the `StorageData` itself though, as that would still be undefined
        // behavior since we don't have the right type.
        let vtable_ptr: *const &'static StorageVtable = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Dereferencing the pointer and getting out the `&'static
        // StorageVtable` is valid for the same reasons
        unsafe { *vtable_ptr }
    }

    /// Accesses the stored value as a reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual value type
    /// stored in the [`StorageData`].
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a T {
        // SAFETY: The inner function requires that `T` matches the type stored, but
        // that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<T>() };
        &this.value
    }
}

impl<'a> RawStorageMut<'a> {
    /// Accesses the stored value as a mutable reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual value type
    /// stored in the [`StorageData`].
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a mut T {
        // SAFETY: The inner function requires that `T` matches the type stored, but
        // that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<T>() };
        &mut this.value
    }
}
