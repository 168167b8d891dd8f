//! Vtable for type-erased storage operations.
//!
//! This module contains the [`StorageVtable`] which enables operating on a
//! stored value when its concrete type `T` has been erased. The vtable stores
//! function pointers that dispatch to the correct typed implementations.
//!
//! This module encapsulates the fields of [`StorageVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual value type
//! stored in the [`StorageData`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`StorageVtable::new`] or [`StorageVtable::new_cloneable`],
//! which pair the function pointers with a specific type `T` at compile time.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{
    storage::{
        data::StorageData,
        raw::{RawStorage, RawStorageRef},
    },
    util::Erased,
};

/// Vtable for type-erased storage operations.
///
/// Contains function pointers for performing operations on a stored value
/// without knowing its concrete type at compile time.
///
/// # Safety Invariant
///
/// The fields `drop`, `data_ptr` and `clone` are guaranteed to point to the
/// functions defined below instantiated with the value type `T` that was used
/// to create this [`StorageVtable`].
pub(crate) struct StorageVtable {
    /// Gets the [`TypeId`] of the value type that was used to create this
    /// [`StorageVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the value type that was used to
    /// create this [`StorageVtable`].
    type_name: fn() -> &'static str,
    /// Drops the [`Box<StorageData<T>>`] instance pointed to by this pointer.
    drop: unsafe fn(NonNull<StorageData<Erased>>),
    /// Gets a pointer to the value inside the [`StorageData<T>`].
    data_ptr: unsafe fn(NonNull<StorageData<Erased>>) -> NonNull<()>,
    /// Clones the value into a fresh allocation. `None` when the storage was
    /// created without a clone capability.
    clone: Option<unsafe fn(RawStorageRef<'_>) -> RawStorage>,
}

impl StorageVtable {
    /// Creates a new [`StorageVtable`] for the value type `T` without a clone
    /// capability.
    pub(super) const fn new<T: 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                drop: drop::<T>,
                data_ptr: data_ptr::<T>,
                clone: None,
            }
        }
    }

    /// Creates a new [`StorageVtable`] for the value type `T` that is able to
    /// clone the stored value.
    pub(super) const fn new_cloneable<T: Clone + 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                drop: drop::<T>,
                data_ptr: data_ptr::<T>,
                clone: Some(clone::<T>),
            }
        }
    }

    /// Gets the [`TypeId`] of the value type that was used to create this
    /// [`StorageVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the value type that was used to
    /// create this [`StorageVtable`].
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Whether this vtable carries a clone function.
    #[inline]
    pub(super) fn is_cloneable(&self) -> bool {
        self.clone.is_some()
    }

    /// Drops the `Box<StorageData<T>>` instance pointed to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`Box<StorageData<T>>`] via [`Box::into_raw`]
    /// 2. This [`StorageVtable`] must be a vtable for the value type stored in
    ///    the [`StorageData`].
    /// 3. This method drops the [`Box<StorageData<T>>`], so the caller must
    ///    ensure that the pointer has not previously been dropped, that it is
    ///    able to transfer ownership of the pointer, and that it will not use
    ///    the pointer after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<StorageData<Erased>>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<T>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Gets a pointer to the stored value.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer points to an initialized [`StorageData`].
    /// 2. This [`StorageVtable`] must be a vtable for the value type stored in
    ///    the [`StorageData`].
    #[inline]
    pub(super) unsafe fn data_ptr(&self, ptr: NonNull<StorageData<Erased>>) -> NonNull<()> {
        // SAFETY: We know that `self.data_ptr` points to the function
        // `data_ptr::<T>` below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.data_ptr)(ptr) }
    }

    /// Clones the stored value into a new [`RawStorage`], if this vtable was
    /// created with [`StorageVtable::new_cloneable`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`StorageVtable`] must be a vtable for the value type stored in
    ///    the [`RawStorageRef`].
    #[inline]
    pub(super) unsafe fn clone(&self, ptr: RawStorageRef<'_>) -> Option<RawStorage> {
        let clone = self.clone?;
        // SAFETY: We know that `clone` points to the function `clone::<T>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        Some(unsafe { clone(ptr) })
    }
}

/// Drops the [`Box<StorageData<T>>`] instance pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`Box<StorageData<T>>`] via [`Box::into_raw`]
/// 2. The value type `T` matches the actual value type stored in the
///    [`StorageData`]
/// 3. This method drops the [`Box<StorageData<T>>`], so the caller must ensure
///    that the pointer has not previously been dropped, that it is able to
///    transfer ownership of the pointer, and that it will not use the pointer
///    after calling this method.
unsafe fn drop<T: 'static>(ptr: NonNull<StorageData<Erased>>) {
    let ptr: NonNull<StorageData<T>> = ptr.cast();
    let ptr = ptr.as_ptr();
    // SAFETY: Our pointer has the correct type as guaranteed by the caller, and it
    // came from a call to `Box::into_raw` as also guaranteed by our caller.
    let boxed = unsafe { Box::from_raw(ptr) };
    core::mem::drop(boxed);
}

/// Gets a pointer to the value stored in a [`StorageData<T>`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer points to an initialized [`StorageData`]
/// 2. The type `T` matches the actual value type stored in the
///    [`StorageData`]
unsafe fn data_ptr<T: 'static>(ptr: NonNull<StorageData<Erased>>) -> NonNull<()> {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe { StorageData::<T>::value_ptr(ptr) }
}

/// Clones the value of a [`StorageData<T>`] into a new, independent
/// [`RawStorage`] that is itself cloneable.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `T` matches the actual value type stored in the
///    [`StorageData`]
unsafe fn clone<T: Clone + 'static>(ptr: RawStorageRef<'_>) -> RawStorage {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &T = unsafe { ptr.downcast_unchecked::<T>() };
    RawStorage::new_cloneable::<T>(value.clone())
}
