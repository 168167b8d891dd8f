#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A uniquely-owning, type-erased container for a single value.
//!
//! ## Overview
//!
//! [`AnyUnique`] owns at most one heap-allocated value of any `'static` type.
//! The concrete type is erased from the handle's type and recorded at runtime,
//! so it can be queried through a [`TypeIdentity`] and recovered through
//! checked accessors. Ownership is exclusive: the handle can be moved but
//! never implicitly copied, and the owned value is destroyed exactly once.
//!
//! ## Quick Example
//!
//! ```
//! use unique_any::{AnyUnique, TypeIdentity};
//!
//! let mut handles: Vec<AnyUnique> = vec![
//!     AnyUnique::new(42_u32),
//!     AnyUnique::new(String::from("hello")),
//!     AnyUnique::empty(),
//! ];
//!
//! assert_eq!(handles[0].identity(), TypeIdentity::of::<u32>());
//! assert_eq!(handles[1].get::<String>().map(String::as_str), Some("hello"));
//! assert!(handles[2].identity().is_none());
//!
//! // Moving values between handles never copies them
//! let (first, rest) = handles.split_at_mut(1);
//! first[0].swap(&mut rest[1]);
//! assert!(handles[0].is_empty());
//! assert_eq!(handles[2].take::<u32>(), Some(Box::new(42)));
//! ```
//!
//! ## Core Concepts
//!
//! - An [`ErasedValue`] is the owned, type-erased value itself: one allocation
//!   holding the payload and a pointer to a static table describing its type.
//! - An [`AnyUnique`] is a nullable owner of an `ErasedValue`. It provides
//!   typed access, extraction, release, reset, and swap.
//! - The [`markers`] module decides at compile time whether handles can be
//!   cloned. See [`markers::Cloneable`].
//!
//! Typed access comes in three forms:
//! - [`AnyUnique::get`] returns `None` if the handle is empty or the type does
//!   not match.
//! - [`AnyUnique::try_get`] reports the reason as an [`AccessError`].
//! - [`AnyUnique::get_unchecked`] skips the type check and is `unsafe`.
//!
//! ## Features
//!
//! - `tracing`: emits trace-level events under the `unique_any` target when
//!   values are created, cloned, released, extracted, or reset.
//! - `std`: forwards `std` to optional dependencies. The crate itself only
//!   needs `alloc`.

extern crate alloc;

#[macro_use]
mod macros;

mod any_unique;
mod erased_value;
mod error;
mod identity;
pub mod markers;
pub mod prelude;

pub use self::{
    any_unique::AnyUnique, erased_value::ErasedValue, error::AccessError,
    identity::TypeIdentity,
};
