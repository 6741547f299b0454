//! Node lifecycle: allocate, construct, destroy, deallocate.
//!
//! A node is either fully built and linked, or it does not exist. Storage is
//! acquired before the element is built, and released again if building the
//! element fails or panics, so no half-built node ever becomes reachable.

use crate::alloc::NodeAllocator;
use crate::error::EmplaceError;
use crate::list::{Link, Node};
use std::alloc::Layout;
use std::mem;
use std::ptr::NonNull;

/// Releases a freshly allocated block unless disarmed with `mem::forget`.
struct Rollback<'a, A: NodeAllocator> {
    alloc: &'a A,
    block: NonNull<u8>,
    layout: Layout,
}

impl<A: NodeAllocator> Drop for Rollback<'_, A> {
    fn drop(&mut self) {
        log::debug!(
            "node construction failed, releasing {} bytes",
            self.layout.size()
        );
        // SAFETY: `block` was just returned by `alloc.allocate(layout)` and
        // nothing has been written into it.
        unsafe { self.alloc.deallocate(self.block, self.layout) }
    }
}

/// Allocate a node between `prev` and `next`, and build its element with
/// `make`.
///
/// Only the new node's own links are written; the neighbours are left
/// untouched, so on failure the list is exactly as it was.
pub(crate) fn construct_node<T, A, E, F>(
    alloc: &A,
    prev: NonNull<Link>,
    next: NonNull<Link>,
    make: F,
) -> Result<NonNull<Node<T>>, EmplaceError<E>>
where
    A: NodeAllocator,
    F: FnOnce() -> Result<T, E>,
{
    let layout = Layout::new::<Node<T>>();
    let block = alloc.allocate(layout).map_err(|err| {
        log::warn!(
            "node allocation failed (size {}, align {})",
            layout.size(),
            layout.align()
        );
        err
    })?;
    let rollback = Rollback {
        alloc,
        block,
        layout,
    };
    let element = make().map_err(EmplaceError::Construct)?;
    mem::forget(rollback);

    let node = block.cast::<Node<T>>();
    // SAFETY: `block` fits `Node<T>` and is not aliased.
    unsafe {
        node.as_ptr().write(Node {
            link: Link { next, prev },
            element,
        });
    }
    Ok(node)
}

/// Move the element out of an unlinked node and release its storage.
///
/// # Safety
///
/// `node` must come from [`construct_node`] with an allocator `alloc` may
/// release for, must already be unlinked, and must not be used afterwards.
pub(crate) unsafe fn destroy_node<T, A: NodeAllocator>(alloc: &A, node: NonNull<Node<T>>) -> T {
    let element = std::ptr::addr_of!((*node.as_ptr()).element).read();
    alloc.deallocate(node.cast(), Layout::new::<Node<T>>());
    element
}

#[cfg(test)]
mod tests {
    use super::{construct_node, destroy_node};
    use crate::alloc::Tracking;
    use crate::list::Link;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::ptr::NonNull;

    #[test]
    fn construct_and_destroy() {
        let alloc = Tracking::new();
        let dangling = NonNull::<Link>::dangling();
        let node = construct_node(&alloc, dangling, dangling, || Ok::<_, ()>(String::from("a")))
            .unwrap();
        assert_eq!(alloc.stats().live(), 1);
        let element = unsafe { destroy_node(&alloc, node) };
        assert_eq!(element, "a");
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn construct_failure_releases_storage() {
        let alloc = Tracking::new();
        let dangling = NonNull::<Link>::dangling();
        let result = construct_node::<u32, _, _, _>(&alloc, dangling, dangling, || Err("nope"));
        assert_eq!(result.err().and_then(|err| err.into_construct()), Some("nope"));
        assert_eq!(alloc.stats().allocations(), 1);
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn construct_panic_releases_storage() {
        let alloc = Tracking::new();
        let dangling = NonNull::<Link>::dangling();
        let result = catch_unwind(AssertUnwindSafe(|| {
            construct_node::<u32, _, (), _>(&alloc, dangling, dangling, || panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(alloc.stats().allocations(), 1);
        assert_eq!(alloc.stats().live(), 0);
    }
}
