//! Module containing the type-erased storage data structure

mod data;
mod raw;
mod vtable;

pub use self::raw::{RawStorage, RawStorageMut, RawStorageRef};
