//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use unique_any::prelude::*;
//!
//! let handle: AnyUnique<markers::Cloneable> = AnyUnique::new(3_u8);
//! let copy = handle.clone();
//! assert_eq!(copy.try_get::<u8>(), Ok(&3));
//! assert_eq!(handle.identity(), TypeIdentity::of::<u8>());
//! ```

pub use crate::{AccessError, AnyUnique, ErasedValue, TypeIdentity, markers};
