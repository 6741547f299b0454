//! Node allocation strategies.
//!
//! Every value node of a [`List`] is obtained from, and returned to, the
//! [`NodeAllocator`] the list was created with. [`Global`] is the default
//! and simply forwards to the global heap; [`Tracking`] wraps another
//! allocator and keeps count of what is live.
//!
//! [`List`]: crate::List

use crate::error::AllocError;
use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

/// A strategy for sourcing and releasing node storage.
///
/// The list asks for exactly one node per call, with the layout of its own
/// node type; callers never rebind the allocator themselves.
///
/// # Propagation policy
///
/// - [`select_on_copy`](NodeAllocator::select_on_copy) chooses the allocator
///   of a list produced by `clone`.
/// - [`PROPAGATE_ON_COPY_ASSIGNMENT`](NodeAllocator::PROPAGATE_ON_COPY_ASSIGNMENT)
///   decides whether `clone_from` adopts the source's allocator.
/// - [`PROPAGATE_ON_SWAP`](NodeAllocator::PROPAGATE_ON_SWAP) decides whether
///   [`List::swap`](crate::List::swap) exchanges allocators along with the
///   nodes.
///
/// # Safety
///
/// - `allocate` must return a block fitting `layout`, valid until it is
///   passed to `deallocate`.
/// - A block allocated by an instance must be releasable by any clone of that
///   instance.
/// - If `PROPAGATE_ON_SWAP` is `false`, a block allocated by any instance must
///   be releasable by any other instance of the type, because a swap moves
///   nodes between lists while the allocators stay put.
pub unsafe trait NodeAllocator: Clone {
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = false;
    const PROPAGATE_ON_SWAP: bool = false;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` (of this instance or one
    /// it may release for, see the trait docs) with the same `layout`, and
    /// must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// The allocator a copy of a list should use.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// The global heap, via [`std::alloc::alloc`] and [`std::alloc::dealloc`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl NodeAllocator for Global {
    // Every `Global` is the same heap, swapping it is a no-op.
    const PROPAGATE_ON_SWAP: bool = true;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "nodes always carry their links");
        // SAFETY: node layouts are never zero-sized.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout)
    }
}

/// Counters shared by a [`Tracking`] allocator and all of its clones.
#[derive(Default)]
pub struct TrackingStats {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    live_bytes: Cell<usize>,
}

impl TrackingStats {
    /// Total number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Total number of deallocations.
    pub fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    /// Number of blocks currently handed out.
    pub fn live(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Bytes currently handed out.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }
}

impl fmt::Debug for TrackingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingStats")
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .field("live_bytes", &self.live_bytes())
            .finish()
    }
}

/// An allocator that counts the blocks it hands out.
///
/// Clones share their counters, so the stats observed through any handle
/// cover every list built from it (and every copy selected from it).
///
/// # Examples
///
/// ```
/// use sentinel_list::alloc::Tracking;
/// use sentinel_list::List;
///
/// let alloc = Tracking::new();
/// let mut list = List::new_in(alloc.clone());
/// list.push_back(1);
/// list.push_back(2);
/// assert_eq!(alloc.stats().live(), 2);
///
/// drop(list);
/// assert_eq!(alloc.stats().live(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tracking<A = Global> {
    inner: A,
    stats: Rc<TrackingStats>,
}

impl Tracking<Global> {
    pub fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A> Tracking<A> {
    /// Track the allocations of `inner`.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            stats: Rc::default(),
        }
    }

    pub fn stats(&self) -> &TrackingStats {
        &self.stats
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Returns `true` if both handles report to the same counters.
    pub fn shares_stats_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.stats, &other.stats)
    }
}

unsafe impl<A: NodeAllocator> NodeAllocator for Tracking<A> {
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = true;
    const PROPAGATE_ON_SWAP: bool = true;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.inner.allocate(layout)?;
        self.stats.allocations.set(self.stats.allocations.get() + 1);
        self.stats
            .live_bytes
            .set(self.stats.live_bytes.get() + layout.size());
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.inner.deallocate(ptr, layout);
        self.stats.deallocations.set(self.stats.deallocations.get() + 1);
        self.stats
            .live_bytes
            .set(self.stats.live_bytes.get() - layout.size());
    }

    fn select_on_copy(&self) -> Self {
        Self {
            inner: self.inner.select_on_copy(),
            stats: Rc::clone(&self.stats),
        }
    }
}
