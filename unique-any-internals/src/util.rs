//! Internal utility types.

/// Marker type used when type-erasing storage.
///
/// This zero-sized type serves as a placeholder in generic type parameters
/// when the actual concrete type has been erased. For example,
/// `StorageData<Erased>` represents storage whose payload type is unknown at
/// the current scope.
///
/// Using a distinct marker type (rather than `()`) keeps an erased
/// `StorageData<()>` from being confused with storage that really holds a
/// unit value.
pub(crate) struct Erased;
