use std::alloc::Layout;
use thiserror::Error;

/// The node allocator could not supply storage for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
pub struct AllocError {
    pub layout: Layout,
}

impl AllocError {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

/// Failure of a fallible emplacement.
///
/// In both cases the list is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EmplaceError<E> {
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("element construction failed: {0}")]
    Construct(#[source] E),
}

impl<E> EmplaceError<E> {
    /// Returns the constructor's error, if that is what failed.
    pub fn into_construct(self) -> Option<E> {
        match self {
            EmplaceError::Construct(err) => Some(err),
            EmplaceError::Alloc(_) => None,
        }
    }
}

/// A bounded cursor move stopped at the ghost node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cursor stopped at the ghost node after {moved} of {requested} steps")]
pub struct SeekError {
    pub moved: usize,
    pub requested: usize,
}

impl From<EmplaceError<std::convert::Infallible>> for AllocError {
    fn from(err: EmplaceError<std::convert::Infallible>) -> Self {
        match err {
            EmplaceError::Alloc(err) => err,
            EmplaceError::Construct(never) => match never {},
        }
    }
}
