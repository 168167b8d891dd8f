#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`unique-any`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage and the unsafe
//! operations that power the [`unique-any`] container. A value of any
//! `'static` type is boxed next to a `&'static` vtable, and the box is then
//! held through a pointer that has forgotten the concrete type.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`unique-any`] crate,
//! not this one.
//!
//! # Architecture
//!
//! - [`RawStorage`]: Owned, type-erased storage with [`Box`]-based allocation
//! - [`RawStorageRef`]: Borrowed shared reference to the storage
//! - [`RawStorageMut`]: Borrowed mutable reference to the storage
//! - [`StorageData`]: `#[repr(C)]` wrapper holding the vtable and the value
//! - [`StorageVtable`]: Function pointers for type-erased dispatch
//!
//! # Safety Strategy
//!
//! When we erase `StorageData<T>` to `StorageData<Erased>`, the vtable
//! function pointers must keep matching the concrete type stored in memory.
//! This crate maintains that through:
//!
//! - **Module-based encapsulation**: the pointer and data fields are private
//!   to a single module, so the invariants are locally verifiable
//! - **`#[repr(C)]` layout**: the vtable is always the first field, so it can
//!   be read without knowing the payload type
//! - **Documented vtable contracts**: each vtable method specifies exactly
//!   when it can be safely called
//!
//! [`unique-any`]: https://docs.rs/unique-any/latest/unique_any/
//! [`StorageData`]: storage::data::StorageData
//! [`StorageVtable`]: storage::vtable::StorageVtable
//! [`Box`]: alloc::boxed::Box

extern crate alloc;

mod storage;
mod util;

pub use storage::{RawStorage, RawStorageMut, RawStorageRef};
