//! Type-erased storage pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawStorage`],
//! [`RawStorageRef`] and [`RawStorageMut`], ensuring it is only visible within
//! this module. This visibility restriction guarantees the safety invariant:
//! **the pointer always comes from `Box<StorageData<T>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawStorage::new`] or
//! [`RawStorage::new_cloneable`] (which create it from `Box::into_raw`), and
//! cannot be modified afterward (no `pub` or `pub(crate)` fields), the pointer
//! provenance remains valid throughout the value's lifetime.
//!
//! The [`RawStorage::drop`] implementation relies on this invariant to
//! safely reconstruct the `Box` and deallocate the memory.
//!
//! # Type Erasure
//!
//! The concrete type parameter `T` is erased by casting to
//! `StorageData<Erased>`. The vtable stored within the `StorageData` provides
//! the runtime type information needed to safely downcast, clone and drop the
//! value.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{storage::data::StorageData, util::Erased};

/// A pointer to a [`StorageData`] that is guaranteed to point to an
/// initialized instance of a [`StorageData<T>`] for some specific `T`, though
/// we do not know which actual `T` it is.
///
/// However, the pointer is allowed to transition into a non-initialized state
/// inside the [`RawStorage::drop`] method.
///
/// The pointer is guaranteed to have been created using [`Box::into_raw`].
///
/// We cannot use a [`Box<StorageData<T>>`] directly, because that does not
/// allow us to type-erase the `T`.
#[repr(transparent)]
pub struct RawStorage {
    /// Pointer to the inner storage data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<StorageData<T>>` for
    ///    some `T` using `Box::into_raw`.
    /// 2. The pointer will point to the same `StorageData<T>` for the entire
    ///    lifetime of this object.
    /// 3. The pointee is properly initialized for the entire lifetime of this
    ///    object, except during the execution of the `Drop` implementation.
    ptr: NonNull<StorageData<Erased>>,
}

impl RawStorage {
    /// Creates a new [`RawStorage`] from a [`Box<StorageData<T>>`].
    #[inline]
    fn from_box<T: 'static>(data: Box<StorageData<T>>) -> Self {
        let ptr: *mut StorageData<T> = Box::into_raw(data);
        let ptr: *mut StorageData<Erased> = ptr.cast::<StorageData<Erased>>();

        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<StorageData<Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Creates a new [`RawStorage`] holding `value`.
    ///
    /// The storage has no clone capability: [`RawStorageRef::clone_storage`]
    /// returns `None` for it.
    #[inline]
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_box(Box::new(StorageData::new(value)))
    }

    /// Creates a new [`RawStorage`] holding `value` whose vtable is able to
    /// clone it.
    #[inline]
    pub fn new_cloneable<T: Clone + 'static>(value: T) -> Self {
        Self::from_box(Box::new(StorageData::new_cloneable(value)))
    }

    /// Consumes the [`RawStorage`] without dropping the storage and returns
    /// the inner pointer.
    #[inline]
    pub(super) fn into_non_null(self) -> NonNull<StorageData<Erased>> {
        let ptr = self.ptr;
        core::mem::forget(self);
        ptr
    }

    /// Returns a reference to the [`StorageData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawStorageRef<'_> {
        RawStorageRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns a mutable reference to the [`StorageData`] instance.
    #[inline]
    pub fn as_mut(&mut self) -> RawStorageMut<'_> {
        RawStorageMut {
            // The `&mut self` borrow guarantees exclusive access for the lifetime
            // of the returned reference.
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl core::ops::Drop for RawStorage {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Box::into_raw` (guaranteed by `RawStorage::new`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match the
        //    data in the `StorageData`.
        // 3. The pointer is initialized and has not been previously freed as
        //    guaranteed by the invariants on this type. We are correctly transferring
        //    ownership here and the pointer is not used afterwards, as we are in the
        //    drop function.
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`StorageData`] that is guaranteed to point
/// to an initialized instance of a [`StorageData<T>`] for some specific `T`,
/// though we do not know which actual `T` it is.
///
/// We cannot use a [`&'a StorageData<T>`] directly, because that would
/// require us to know the actual type of the value, which we do not.
///
/// [`&'a StorageData<T>`]: StorageData
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawStorageRef<'a> {
    /// Pointer to the inner storage data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<StorageData<T>>` for
    ///    some `T` using `Box::into_raw`.
    /// 2. The pointer will point to the same `StorageData<T>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<StorageData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a StorageData<Erased>`
    _marker: core::marker::PhantomData<&'a StorageData<Erased>>,
}

impl<'a> RawStorageRef<'a> {
    /// Casts the [`RawStorageRef`] to a [`StorageData<T>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`StorageData`].
    #[inline]
    pub(super) unsafe fn cast_inner<T: 'static>(self) -> &'a StorageData<T> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<T>());

        let this = self.ptr.cast::<StorageData<T>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawStorageRef's type invariants)
        // - The pointee is properly initialized (RawStorageRef's doc comment
        //   guarantees it points to an initialized StorageData<T> for some T)
        // - The type `T` matches the actual value type (guaranteed by caller)
        // - Shared access is allowed
        // - The reference lifetime 'a is valid (tied to RawStorageRef<'a>'s lifetime)
        unsafe { this.as_ref() }
    }

    /// Returns a raw pointer to the [`StorageData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const StorageData<Erased> {
        self.ptr.as_ptr()
    }

    /// Returns the [`TypeId`] of the stored value.
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the stored value.
    #[inline]
    pub fn type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Returns whether the storage was created with a clone capability.
    #[inline]
    pub fn is_cloneable(self) -> bool {
        self.vtable().is_cloneable()
    }

    /// Returns an untyped pointer to the stored value.
    ///
    /// The pointer is valid for reads for as long as the storage is alive and
    /// not mutably borrowed.
    #[inline]
    pub fn data_ptr(self) -> NonNull<()> {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointee is initialized (guaranteed by the invariants of this type)
        // 2. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `StorageData`.
        unsafe { vtable.data_ptr(self.ptr) }
    }

    /// Clones the stored value into a new, independent [`RawStorage`].
    ///
    /// Returns `None` if the storage was created without a clone capability.
    #[inline]
    pub fn clone_storage(self) -> Option<RawStorage> {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `StorageData`.
        unsafe { vtable.clone(self) }
    }
}

/// A mutable lifetime-bound pointer to a [`StorageData`] that is guaranteed
/// to point to an initialized instance of a [`StorageData<T>`] for some
/// specific `T`, though we do not know which actual `T` it is.
///
/// We cannot use a [`&'a mut StorageData<T>`] directly, because that would
/// require us to know the actual type of the value, which we do not.
///
/// [`&'a mut StorageData<T>`]: StorageData
///
/// # Safety invariants
///
/// This reference behaves like a `&'a mut StorageData<T>` for some unknown
/// `T` and upholds the usual safety invariants of mutable references:
///
/// 1. The pointee is properly initialized for the entire lifetime `'a`.
/// 2. The pointee is not aliased for the entire lifetime `'a`.
/// 3. Like a `&'a mut T`, it is possible to reborrow this reference to a
///    shorter lifetime. The borrow checker will ensure that original longer
///    lifetime is not used while the shorter lifetime exists.
#[repr(transparent)]
pub struct RawStorageMut<'a> {
    /// Pointer to the inner storage data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<StorageData<T>>` for
    ///    some `T` using `Box::into_raw`.
    /// 2. The pointer will point to the same `StorageData<T>` for the entire
    ///    lifetime of this object.
    /// 3. This pointer is valid for exclusive mutable access to the
    ///    `StorageData` with the same semantics as a `&'a mut StorageData<T>`.
    ptr: NonNull<StorageData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut StorageData<Erased>`
    _marker: core::marker::PhantomData<&'a mut StorageData<Erased>>,
}

impl<'a> RawStorageMut<'a> {
    /// Casts the [`RawStorageMut`] to a mutable [`StorageData<T>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`StorageData`].
    #[inline]
    pub(super) unsafe fn cast_inner<T: 'static>(self) -> &'a mut StorageData<T> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.as_ref().vtable().type_id(), TypeId::of::<T>());

        let mut this = self.ptr.cast::<StorageData<T>>();

        // SAFETY: Converting the NonNull pointer to a mutable reference is sound
        // because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawStorageMut's type invariants)
        // - The pointee is properly initialized (RawStorageMut's doc comment
        //   guarantees it points to an initialized StorageData<T> for some T)
        // - The type `T` matches the actual value type (guaranteed by caller)
        // - Exclusive access is guaranteed
        // - The reference lifetime 'a is valid (tied to RawStorageMut<'a>'s lifetime)
        unsafe { this.as_mut() }
    }

    /// Reborrows the mutable reference to the [`StorageData`] with a shorter
    /// lifetime.
    #[inline]
    pub fn reborrow<'b>(&'b mut self) -> RawStorageMut<'b> {
        RawStorageMut {
            // SAFETY:
            // 1. Guaranteed by invariant on `self`
            // 2. We are creating the `RawStorageMut` here, and we are
            //    not changing the pointer
            // 3. Upheld by mutable borrow of `self`
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns a reference to the [`StorageData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawStorageRef<'_> {
        RawStorageRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns an untyped pointer to the stored value that is valid for
    /// writes for the lifetime `'a`.
    #[inline]
    pub fn into_data_ptr(self) -> NonNull<()> {
        let vtable = self.as_ref().vtable();
        // SAFETY:
        // 1. The pointee is initialized (guaranteed by the invariants of this type)
        // 2. The vtable is guaranteed to match the data in the `StorageData`.
        unsafe { vtable.data_ptr(self.ptr) }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};

    use super::*;

    #[test]
    fn test_raw_storage_size() {
        assert_eq!(
            core::mem::size_of::<RawStorage>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawStorage>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Result<String, RawStorage>>(),
            core::mem::size_of::<String>()
        );

        assert_eq!(
            core::mem::size_of::<RawStorageRef<'_>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawStorageMut<'_>>>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_raw_storage_get_refs() {
        let storage = RawStorage::new::<i32>(100);
        let storage_ref = storage.as_ref();

        // Accessing the pointer multiple times should be safe and consistent
        let ptr1 = storage_ref.as_ptr();
        let ptr2 = storage_ref.as_ptr();
        assert_eq!(ptr1, ptr2);
        assert_eq!(storage_ref.data_ptr(), storage.as_ref().data_ptr());
    }

    #[test]
    fn test_raw_storage_downcast() {
        let int_storage = RawStorage::new::<i32>(42);
        let string_storage = RawStorage::new::<String>(String::from("test"));

        let int_ref = int_storage.as_ref();
        let string_ref = string_storage.as_ref();

        assert_eq!(int_ref.type_id(), TypeId::of::<i32>());
        assert_eq!(string_ref.type_id(), TypeId::of::<String>());

        // The vtables should be different
        assert!(!core::ptr::eq(int_ref.vtable(), string_ref.vtable()));

        // SAFETY: The storage holds an `i32`
        let value: &i32 = unsafe { int_ref.downcast_unchecked::<i32>() };
        assert_eq!(*value, 42);
    }

    #[test]
    fn test_raw_storage_mut() {
        let mut storage = RawStorage::new::<Vec<u8>>(vec![1, 2]);
        let mut storage_mut = storage.as_mut();

        // SAFETY: The storage holds a `Vec<u8>`
        let value: &mut Vec<u8> = unsafe { storage_mut.reborrow().downcast_unchecked::<Vec<u8>>() };
        value.push(3);

        // SAFETY: The storage holds a `Vec<u8>`
        let value: &Vec<u8> = unsafe { storage.as_ref().downcast_unchecked::<Vec<u8>>() };
        assert_eq!(value, &[1, 2, 3]);
    }

    #[test]
    fn test_raw_storage_clone() {
        let plain = RawStorage::new::<String>(String::from("plain"));
        assert!(!plain.as_ref().is_cloneable());
        assert!(plain.as_ref().clone_storage().is_none());

        let cloneable = RawStorage::new_cloneable::<String>(String::from("cloned"));
        let Some(copy) = cloneable.as_ref().clone_storage() else {
            panic!("cloneable storage did not clone");
        };
        assert!(copy.as_ref().is_cloneable());
        assert_ne!(copy.as_ref().data_ptr(), cloneable.as_ref().data_ptr());

        // SAFETY: The storage holds a `String`
        let a: &String = unsafe { cloneable.as_ref().downcast_unchecked::<String>() };
        // SAFETY: The clone holds a `String`
        let b: &String = unsafe { copy.as_ref().downcast_unchecked::<String>() };
        assert_eq!(a, b);
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(RawStorage: Send, Sync);
        static_assertions::assert_not_impl_any!(RawStorageRef<'_>: Send, Sync);
        static_assertions::assert_not_impl_any!(RawStorageMut<'_>: Send, Sync);
    }
}
