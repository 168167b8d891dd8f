//! The owning handle.
//!
//! An [`AnyUnique`] owns at most one value of any `'static` type. The concrete
//! type is not part of the handle's type, so handles owning a `u32`, a
//! `String` or a user-defined struct can all be stored in the same collection.
//! The type is recovered at runtime through checked accessors.
//!
//! # Lifecycle
//!
//! ```
//! use unique_any::AnyUnique;
//!
//! let mut handle: AnyUnique = AnyUnique::new(String::from("first"));
//! assert!(handle.is::<String>());
//!
//! // Checked access
//! handle.get_mut::<String>().unwrap().push_str(" value");
//! assert_eq!(handle.get::<String>().unwrap(), "first value");
//! assert!(handle.get::<&str>().is_none());
//!
//! // Extraction
//! let value: Box<String> = handle.take().unwrap();
//! assert_eq!(*value, "first value");
//! assert!(handle.is_empty());
//! ```

use alloc::boxed::Box;
use core::{any::TypeId, mem};

use crate::{
    AccessError, ErasedValue, TypeIdentity,
    markers::{CloneMarker, Cloneable, ObjectMarkerFor, Uncloneable},
};

/// A uniquely-owning handle to a type-erased value.
///
/// The handle is either empty or owns exactly one heap-allocated value. The
/// value is dropped exactly once: when the handle is dropped, [`reset`],
/// [`replace`]d, or after it has been moved out through [`take`],
/// [`downcast`] or [`release`].
///
/// # Type Parameters
/// - `Cloneability`: Either [`Uncloneable`] (the default) or [`Cloneable`].
///   With `Cloneable`, only [`Clone`] types can be stored and the handle
///   implements [`Clone`].
///
/// # Thread Safety
///
/// Handles are neither [`Send`] nor [`Sync`], since the stored type is not
/// required to be either:
///
/// ```compile_fail
/// use unique_any::AnyUnique;
///
/// let handle: AnyUnique = AnyUnique::new(1_u32);
/// std::thread::spawn(move || drop(handle));
/// ```
///
/// [`reset`]: AnyUnique::reset
/// [`replace`]: AnyUnique::replace
/// [`take`]: AnyUnique::take
/// [`downcast`]: AnyUnique::downcast
/// [`release`]: AnyUnique::release
pub struct AnyUnique<Cloneability: CloneMarker = Uncloneable> {
    value: Option<ErasedValue<Cloneability>>,
}

impl<C: CloneMarker> AnyUnique<C> {
    /// Creates a handle owning `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unique_any::{AnyUnique, markers::Cloneable};
    ///
    /// let plain: AnyUnique = AnyUnique::new(1.5_f64);
    /// let cloneable: AnyUnique<Cloneable> = AnyUnique::new(1.5_f64);
    /// assert_eq!(plain.get::<f64>(), cloneable.get::<f64>());
    /// ```
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: ObjectMarkerFor<C>,
    {
        Self {
            value: Some(ErasedValue::new(value)),
        }
    }

    /// Creates an empty handle.
    ///
    /// An empty handle reports [`TypeIdentity::none`] and every typed access
    /// fails.
    #[must_use]
    pub const fn empty() -> Self {
        Self { value: None }
    }

    /// Creates a handle taking ownership of an already erased value.
    #[must_use]
    pub fn from_erased(value: ErasedValue<C>) -> Self {
        Self { value: Some(value) }
    }

    /// Returns `true` if the handle owns a value.
    #[must_use]
    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    /// Returns `true` if the handle does not own a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Returns the identity of the stored type, or [`TypeIdentity::none`] when
    /// the handle is empty.
    #[must_use]
    pub fn identity(&self) -> TypeIdentity {
        self.value
            .as_ref()
            .map_or_else(TypeIdentity::none, ErasedValue::identity)
    }

    /// Returns the [`TypeId`] of the stored type, if any.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.value.as_ref().map(ErasedValue::type_id)
    }

    /// Returns the name of the stored type, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.value.as_ref().map(ErasedValue::type_name)
    }

    /// Returns `true` if the handle owns a value of type `T`.
    ///
    /// Always `false` for an empty handle.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.value.as_ref().is_some_and(ErasedValue::is::<T>)
    }

    /// Returns a reference to the stored value if the handle owns a `T`.
    ///
    /// Returns `None` when the handle is empty or owns a value of a different
    /// type; [`try_get`](AnyUnique::try_get) tells the two apart.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.value.as_ref()?.downcast_ref::<T>()
    }

    /// Returns a mutable reference to the stored value if the handle owns a
    /// `T`.
    #[must_use]
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.as_mut()?.downcast_mut::<T>()
    }

    /// Like [`get`](AnyUnique::get), but reports why the access failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use unique_any::{AccessError, AnyUnique};
    ///
    /// let handle: AnyUnique = AnyUnique::empty();
    /// assert_eq!(handle.try_get::<u8>(), Err(AccessError::Empty));
    /// ```
    pub fn try_get<T: 'static>(&self) -> Result<&T, AccessError> {
        let identity = self.identity();
        self.get::<T>()
            .ok_or_else(|| AccessError::rejecting::<T>(identity))
    }

    /// Like [`get_mut`](AnyUnique::get_mut), but reports why the access failed.
    pub fn try_get_mut<T: 'static>(&mut self) -> Result<&mut T, AccessError> {
        let identity = self.identity();
        self.get_mut::<T>()
            .ok_or_else(|| AccessError::rejecting::<T>(identity))
    }

    /// Returns a reference to the stored value without checking its type.
    ///
    /// Returns `None` only when the handle is empty.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If the handle owns a value, that value is of type `T` (can be
    ///    verified by calling [`is()`] first)
    ///
    /// [`is()`]: AnyUnique::is
    #[must_use]
    pub unsafe fn get_unchecked<T: 'static>(&self) -> Option<&T> {
        let value = self.value.as_ref()?;
        // SAFETY:
        // 1. Guaranteed by the caller
        Some(unsafe { value.downcast_ref_unchecked::<T>() })
    }

    /// Returns a mutable reference to the stored value without checking its
    /// type.
    ///
    /// Returns `None` only when the handle is empty.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If the handle owns a value, that value is of type `T` (can be
    ///    verified by calling [`is()`] first)
    ///
    /// [`is()`]: AnyUnique::is
    #[must_use]
    pub unsafe fn get_unchecked_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let value = self.value.as_mut()?;
        // SAFETY:
        // 1. Guaranteed by the caller
        Some(unsafe { value.downcast_mut_unchecked::<T>() })
    }

    /// Returns the owned value in its erased form, if any.
    #[must_use]
    pub fn as_erased(&self) -> Option<&ErasedValue<C>> {
        self.value.as_ref()
    }

    /// Returns the owned value in its erased form, if any.
    #[must_use]
    pub fn as_erased_mut(&mut self) -> Option<&mut ErasedValue<C>> {
        self.value.as_mut()
    }

    /// Gives up ownership of the stored value without dropping it.
    ///
    /// The handle is left empty. The caller becomes responsible for the
    /// returned value; dropping it destroys the payload, and
    /// [`reset`](AnyUnique::reset) or [`from_erased`](AnyUnique::from_erased)
    /// hand it back to a handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use unique_any::AnyUnique;
    ///
    /// let mut first: AnyUnique = AnyUnique::new(9_u8);
    /// let released = first.release().unwrap();
    /// assert!(first.is_empty());
    ///
    /// let second = AnyUnique::from_erased(released);
    /// assert_eq!(second.get::<u8>(), Some(&9));
    /// ```
    #[must_use = "dropping the released value destroys it; use `reset(None)` to do so explicitly"]
    pub fn release(&mut self) -> Option<ErasedValue<C>> {
        trace_event!(type_name = self.type_name(), "value released");
        self.value.take()
    }

    /// Replaces the owned value with `value`, dropping the previous one.
    ///
    /// Passing `None` empties the handle.
    pub fn reset(&mut self, value: Option<ErasedValue<C>>) {
        trace_event!(type_name = self.type_name(), "resetting handle");
        self.value = value;
    }

    /// Replaces the owned value with `value`, returning the previous one
    /// instead of dropping it.
    #[must_use]
    pub fn replace<T>(&mut self, value: T) -> Option<ErasedValue<C>>
    where
        T: ObjectMarkerFor<C>,
    {
        self.value.replace(ErasedValue::new(value))
    }

    /// Exchanges the owned values of two handles.
    ///
    /// Neither value is moved in memory, cloned or dropped.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.value, &mut other.value);
    }

    /// Moves the stored value out as a [`Box<T>`] if the handle owns a `T`.
    ///
    /// On success the handle is left empty. If the handle is empty or owns a
    /// value of a different type, `None` is returned and the handle is left
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use unique_any::AnyUnique;
    ///
    /// let mut handle: AnyUnique = AnyUnique::new(vec![1_u8, 2]);
    /// assert!(handle.take::<Vec<i8>>().is_none());
    /// assert!(handle.is::<Vec<u8>>());
    ///
    /// assert_eq!(handle.take::<Vec<u8>>(), Some(Box::new(vec![1, 2])));
    /// assert!(handle.is_empty());
    /// ```
    #[must_use]
    pub fn take<T: 'static>(&mut self) -> Option<Box<T>> {
        self.try_take::<T>().ok()
    }

    /// Like [`take`](AnyUnique::take), but reports why the extraction failed.
    pub fn try_take<T: 'static>(&mut self) -> Result<Box<T>, AccessError> {
        AccessError::check::<T>(self.identity())?;
        let value = self.value.take().ok_or(AccessError::Empty)?;
        trace_event!(type_name = value.type_name(), "value extracted");

        // SAFETY:
        // 1. The check above guarantees that the handle owned a `T`
        let value = unsafe { value.downcast_unchecked::<T>() };
        Ok(Box::new(value))
    }

    /// Converts the handle into a [`Box<T>`] if it owns a `T`.
    ///
    /// Returns the unchanged handle otherwise.
    pub fn downcast<T: 'static>(mut self) -> Result<Box<T>, Self> {
        match self.take::<T>() {
            Some(value) => Ok(value),
            None => Err(self),
        }
    }

    /// Creates a new handle owning an independent copy of the stored value.
    ///
    /// Returns `None` if the stored value was created without a clone
    /// capability. Cloning an empty handle yields an empty handle. For
    /// `AnyUnique<Cloneable>`, prefer [`Clone::clone`], which cannot fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use unique_any::{AnyUnique, markers::Cloneable};
    ///
    /// let plain: AnyUnique = AnyUnique::new(String::from("x"));
    /// assert!(plain.try_clone().is_none());
    ///
    /// let cloneable: AnyUnique<Cloneable> = AnyUnique::new(String::from("x"));
    /// let forgotten = cloneable.into_uncloneable();
    /// let copy = forgotten.try_clone().unwrap();
    /// assert_eq!(copy.get::<String>(), forgotten.get::<String>());
    /// ```
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        match &self.value {
            Some(value) => Some(Self::from_erased(value.try_clone()?)),
            None => Some(Self::empty()),
        }
    }

    /// Forgets the clone capability of the handle.
    #[must_use]
    pub fn into_uncloneable(self) -> AnyUnique<Uncloneable> {
        AnyUnique {
            value: self.value.map(ErasedValue::into_uncloneable),
        }
    }
}

impl<C: CloneMarker> Default for AnyUnique<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: CloneMarker> From<ErasedValue<C>> for AnyUnique<C> {
    fn from(value: ErasedValue<C>) -> Self {
        Self::from_erased(value)
    }
}

impl<C: CloneMarker> From<Option<ErasedValue<C>>> for AnyUnique<C> {
    fn from(value: Option<ErasedValue<C>>) -> Self {
        Self { value }
    }
}

impl From<AnyUnique<Cloneable>> for AnyUnique<Uncloneable> {
    fn from(handle: AnyUnique<Cloneable>) -> Self {
        handle.into_uncloneable()
    }
}

impl Clone for AnyUnique<Cloneable> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<C: CloneMarker> core::fmt::Debug for AnyUnique<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.value {
            Some(value) => f.debug_tuple("AnyUnique").field(value).finish(),
            None => f.write_str("AnyUnique(<empty>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec, vec::Vec};
    use core::cell::RefCell;

    use super::*;

    struct Logged {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Drop for Logged {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_any_unique_send_sync() {
        static_assertions::assert_not_impl_any!(AnyUnique<Uncloneable>: Send, Sync);
        static_assertions::assert_not_impl_any!(AnyUnique<Cloneable>: Send, Sync);
    }

    #[test]
    fn test_any_unique_copy_clone() {
        static_assertions::assert_not_impl_any!(AnyUnique<Uncloneable>: Copy, Clone);
        static_assertions::assert_impl_all!(AnyUnique<Cloneable>: Clone, Default);
        static_assertions::assert_not_impl_any!(AnyUnique<Cloneable>: Copy);
    }

    #[test]
    fn test_any_unique_size() {
        assert_eq!(
            core::mem::size_of::<AnyUnique>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_empty_handle() {
        let mut handle: AnyUnique = AnyUnique::default();
        assert!(handle.is_empty());
        assert!(!handle.is_some());
        assert!(handle.identity().is_none());
        assert_eq!(handle.type_id(), None);
        assert_eq!(handle.type_name(), None);
        assert!(!handle.is::<()>());
        assert!(handle.get::<()>().is_none());
        assert!(handle.get_mut::<()>().is_none());
        assert_eq!(handle.try_get::<()>(), Err(AccessError::Empty));
        assert_eq!(handle.try_get_mut::<()>(), Err(AccessError::Empty));
        assert!(handle.take::<()>().is_none());
        assert!(handle.release().is_none());
        // SAFETY: The handle is empty, so no type requirement applies
        assert!(unsafe { handle.get_unchecked::<u64>() }.is_none());
        assert!(handle.try_clone().is_some_and(|copy| copy.is_empty()));
    }

    #[test]
    fn test_typed_access() {
        let mut handle: AnyUnique = AnyUnique::new(41_i32);
        assert!(handle.is_some());
        assert_eq!(handle.identity(), TypeIdentity::of::<i32>());
        assert_eq!(handle.type_id(), Some(TypeId::of::<i32>()));
        assert_eq!(handle.type_name(), Some("i32"));

        *handle.get_mut::<i32>().unwrap() += 1;
        assert_eq!(handle.get::<i32>(), Some(&42));
        assert!(handle.get::<u32>().is_none());
        assert_eq!(
            handle.try_get_mut::<u32>(),
            Err(AccessError::TypeMismatch {
                expected: TypeIdentity::of::<u32>(),
                found: TypeIdentity::of::<i32>(),
            })
        );

        // SAFETY: The handle owns an `i32`
        let value = unsafe { handle.get_unchecked_mut::<i32>() }.unwrap();
        *value = 7;
        assert_eq!(handle.try_get::<i32>(), Ok(&7));
    }

    #[test]
    fn test_reset_drops_previous() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut handle: AnyUnique = AnyUnique::new(Logged {
            name: "a",
            log: log.clone(),
        });

        let b: ErasedValue = ErasedValue::new(Logged {
            name: "b",
            log: log.clone(),
        });
        handle.reset(Some(b));
        assert_eq!(*log.borrow(), vec!["a"]);

        handle.reset(None);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert!(handle.is_empty());
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut handle: AnyUnique = AnyUnique::new(1_u8);
        let previous = handle.replace(String::from("two")).unwrap();
        assert_eq!(previous.downcast_ref::<u8>(), Some(&1));
        assert!(handle.is::<String>());
    }

    #[test]
    fn test_swap_keeps_addresses() {
        let mut a: AnyUnique = AnyUnique::new(1_u16);
        let mut b: AnyUnique = AnyUnique::empty();
        let addr: *const u16 = a.get::<u16>().unwrap();

        a.swap(&mut b);
        assert!(a.is_empty());
        let swapped: *const u16 = b.get::<u16>().unwrap();
        assert_eq!(addr, swapped);
    }

    #[test]
    fn test_take_mismatch_leaves_handle() {
        let mut handle: AnyUnique = AnyUnique::new(String::from("kept"));
        assert!(handle.take::<&str>().is_none());
        assert_eq!(handle.get::<String>().map(String::as_str), Some("kept"));

        let handle = handle.downcast::<u8>().unwrap_err();
        assert_eq!(*handle.downcast::<String>().unwrap(), "kept");
    }

    #[test]
    fn test_clone_cloneable() {
        let original: AnyUnique<Cloneable> = AnyUnique::new(vec![String::from("a")]);
        let mut copy = original.clone();
        copy.get_mut::<Vec<String>>().unwrap().push(String::from("b"));

        assert_eq!(original.get::<Vec<String>>().unwrap().len(), 1);
        assert_eq!(copy.get::<Vec<String>>().unwrap().len(), 2);

        let empty: AnyUnique<Cloneable> = AnyUnique::empty();
        assert!(empty.clone().is_empty());

        let from_erased = AnyUnique::from_erased(ErasedValue::<Cloneable>::new(3_u8));
        assert!(from_erased.as_erased().is_some_and(ErasedValue::is_cloneable));
        assert_eq!(from_erased.clone().get::<u8>(), Some(&3));
    }

    #[test]
    fn test_debug() {
        let handle: AnyUnique = AnyUnique::new(1_u8);
        assert_eq!(
            format!("{handle:?}"),
            "AnyUnique(ErasedValue { type_name: \"u8\", .. })"
        );
        assert_eq!(format!("{:?}", AnyUnique::<Uncloneable>::empty()), "AnyUnique(<empty>)");
    }
}
