use std::convert::Infallible;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::{Global, NodeAllocator};
use crate::error::{AllocError, EmplaceError};
use crate::list::cursor::{Cursor, CursorMut, Position};
use crate::{IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;

mod algorithms;
mod store;

/// The `List` is a doubly-linked list over a ghost node, whose value nodes
/// are obtained from a pluggable [`NodeAllocator`].
///
/// It allows inserting, removing elements at any given position in constant
/// time, without moving any other element. In compromise, reaching a
/// position takes *O*(*n*) time.
///
/// The `List` contains:
/// - a pointer `ghost` to the ghost node, which carries links but no payload;
/// - the number of value nodes `len`;
/// - the allocator `alloc` that every value node comes from.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of list nodes, both inclusive;
/// - `start..end`: a half-open range of list nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct List<T, A: NodeAllocator = Global> {
    ghost: NonNull<Link>,
    /// the number of value nodes
    pub(crate) len: usize,
    alloc: A,
    _marker: PhantomData<Box<Node<T>>>,
}

/// The links shared by the ghost node and the value nodes.
#[repr(C)]
pub(crate) struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

/// A value node. `link` comes first, so a `NonNull<Node<T>>` and the
/// `NonNull<Link>` of the same node are the same address.
#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) link: Link,
    pub(crate) element: T,
}

impl<T> Node<T> {
    /// # Safety
    ///
    /// `link` must be a live value node (never the ghost), and the element
    /// must not be mutably borrowed for `'a`.
    pub(crate) unsafe fn element<'a>(link: NonNull<Link>) -> &'a T {
        &(*link.cast::<Node<T>>().as_ptr()).element
    }

    /// # Safety
    ///
    /// `link` must be a live value node (never the ghost), and the element
    /// must not be borrowed elsewhere for `'a`.
    pub(crate) unsafe fn element_mut<'a>(link: NonNull<Link>) -> &'a mut T {
        &mut (*link.cast::<Node<T>>().as_ptr()).element
    }
}

pub(crate) unsafe fn next_of(node: NonNull<Link>) -> NonNull<Link> {
    (*node.as_ptr()).next
}

pub(crate) unsafe fn prev_of(node: NonNull<Link>) -> NonNull<Link> {
    (*node.as_ptr()).prev
}

pub(crate) unsafe fn connect(prev: NonNull<Link>, next: NonNull<Link>) {
    (*prev.as_ptr()).next = next;
    (*next.as_ptr()).prev = prev;
}

// private methods
impl<T, A: NodeAllocator> List<T, A> {
    pub(crate) fn ghost_node(&self) -> NonNull<Link> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Link> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the list).
        unsafe { next_of(self.ghost) }
    }
    pub(crate) fn back_node(&self) -> NonNull<Link> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the list).
        unsafe { prev_of(self.ghost) }
    }

    /// Detach a single node `node` from the list, destroy it, and return its
    /// element.
    ///
    /// It is unsafe because it does not check whether `node` is a value node
    /// of the list.
    pub(crate) unsafe fn detach_node(&mut self, node: NonNull<Link>) -> T {
        debug_assert!(node != self.ghost, "Cannot detach the ghost node");
        self.len -= 1;
        connect(prev_of(node), next_of(node));
        store::destroy_node(&self.alloc, node.cast::<Node<T>>())
    }

    /// Attach a single node `node` to the list, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the list, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        node: NonNull<Link>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        self.len += 1;
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, node);
            assert_adjacent(node, next);
        }
    }

    /// Build a new node right before `next`, and return it.
    ///
    /// Storage is allocated and the element is built before any link of the
    /// list is touched, so a failure leaves the list unchanged.
    ///
    /// It is unsafe because it does not check whether `next` belongs to the
    /// list.
    pub(crate) unsafe fn try_emplace_before<E, F>(
        &mut self,
        next: NonNull<Link>,
        make: F,
    ) -> Result<NonNull<Link>, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let prev = prev_of(next);
        let node = store::construct_node(&self.alloc, prev, next, make)?.cast::<Link>();
        self.attach_node(prev, next, node);
        Ok(node)
    }

    /// Returns `true` if `node` is the ghost node or one of the value nodes.
    ///
    /// Only addresses are compared, so `node` may be dangling.
    #[cfg_attr(not(any(debug_assertions, feature = "checked-positions")), allow(dead_code))]
    pub(crate) fn is_linked(&self, node: NonNull<Link>) -> bool {
        let mut ptr = self.ghost;
        loop {
            if ptr == node {
                return true;
            }
            // SAFETY: every node reachable from the ghost is valid.
            ptr = unsafe { next_of(ptr) };
            if ptr == self.ghost {
                return false;
            }
        }
    }

    fn check_position(&self, pos: Position<T>) {
        assert!(
            pos.ghost == self.ghost,
            "Cannot use a position of another list"
        );
        #[cfg(any(debug_assertions, feature = "checked-positions"))]
        assert!(
            self.is_linked(pos.node),
            "Cannot use a position whose node has been removed"
        );
    }
}

impl<T> List<T> {
    /// Create an empty `List` on the global heap.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    /// let list: List<u32> = List::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Create a `List` of `count` default values.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    /// let list: List<u32> = List::with_default(3);
    /// assert_eq!(list.into_vec(), vec![0, 0, 0]);
    /// ```
    pub fn with_default(count: usize) -> Self
    where
        T: Default,
    {
        Self::with_default_in(count, Global)
    }

    /// Create a `List` of `count` clones of `value`.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::List;
    /// let list = List::from_elem(2, &"ab");
    /// assert_eq!(list.into_vec(), vec!["ab", "ab"]);
    /// ```
    pub fn from_elem(count: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(count, value, Global)
    }
}

impl<T, A: NodeAllocator> List<T, A> {
    /// Create an empty `List` whose nodes come from `alloc`.
    ///
    /// Only the ghost node is allocated here, on the global heap; it is part
    /// of the list itself.
    ///
    /// # Examples
    /// ```
    /// use sentinel_list::alloc::Tracking;
    /// use sentinel_list::List;
    ///
    /// let alloc = Tracking::new();
    /// let list: List<u32, _> = List::new_in(alloc.clone());
    /// assert!(list.is_empty());
    /// assert_eq!(alloc.stats().allocations(), 0);
    /// ```
    pub fn new_in(alloc: A) -> Self {
        Self {
            ghost: new_ghost(),
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Like [`List::with_default`], with nodes from `alloc`.
    pub fn with_default_in(count: usize, alloc: A) -> Self
    where
        T: Default,
    {
        let mut list = Self::new_in(alloc);
        (0..count).for_each(|_| list.emplace_back_with(T::default));
        list
    }

    /// Like [`List::from_elem`], with nodes from `alloc`.
    pub fn from_elem_in(count: usize, value: &T, alloc: A) -> Self
    where
        T: Clone,
    {
        let mut list = Self::new_in(alloc);
        (0..count).for_each(|_| list.emplace_back_with(|| value.clone()));
        list
    }

    /// Returns the allocator of the list.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns `true` if the `List` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.is_empty());
    ///
    /// list.push_front("foo");
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the length of the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Removes all elements from the `List`, from the back.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.front(), Some(&1));
    ///
    /// list.clear();
    /// assert_eq!(list.len(), 0);
    /// assert_eq!(list.front(), None);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_back().is_some() {}
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.cursor_start().current()
    }

    /// Provides a mutable reference to the front element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// list.push_front(1);
    ///
    /// if let Some(x) = list.front_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.front(), Some(&5));
    /// ```
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the front node is a value node.
        unsafe { Some(Node::element_mut(self.front_node())) }
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.cursor_end().previous()
    }

    /// Provides a mutable reference to the back element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2]);
    /// if let Some(x) = list.back_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.back(), Some(&5));
    /// ```
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the back node is a value node.
        unsafe { Some(Node::element_mut(self.back_node())) }
    }

    /// Adds an element first in the list.
    ///
    /// This is an insertion before the first node. It aborts through
    /// [`std::alloc::handle_alloc_error`] if no node can be allocated, see
    /// [`List::try_push_front`] for the fallible version.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front().unwrap(), &2);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front().unwrap(), &1);
    /// ```
    pub fn push_front(&mut self, elt: T) {
        self.cursor_start_mut().insert(elt);
    }

    /// Appends an element to the back of a list.
    ///
    /// This is an insertion before the ghost node. It aborts through
    /// [`std::alloc::handle_alloc_error`] if no node can be allocated, see
    /// [`List::try_push_back`] for the fallible version.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back().unwrap(), &3);
    /// ```
    pub fn push_back(&mut self, elt: T) {
        self.cursor_end_mut().insert(elt);
    }

    /// Adds an element first in the list, or returns an error if no node
    /// can be allocated. The list is unchanged on error, and `elt` is dropped.
    pub fn try_push_front(&mut self, elt: T) -> Result<(), AllocError> {
        self.cursor_start_mut().try_insert(elt).map(drop)
    }

    /// Appends an element to the back of a list, or returns an error if no
    /// node can be allocated. The list is unchanged on error, and `elt` is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.try_push_back(1).is_ok());
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    pub fn try_push_back(&mut self, elt: T) -> Result<(), AllocError> {
        self.cursor_end_mut().try_insert(elt).map(drop)
    }

    /// Builds an element in a new node first in the list.
    pub fn emplace_front_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        self.cursor_start_mut().emplace_with(make);
    }

    /// Builds an element in a new node at the back of the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// list.emplace_back_with(|| String::from("abc"));
    /// assert_eq!(list.back().map(String::as_str), Some("abc"));
    /// ```
    pub fn emplace_back_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        self.cursor_end_mut().emplace_with(make);
    }

    /// Builds an element in a new node first in the list, where building
    /// may fail. See [`CursorMut::try_emplace_with`].
    pub fn try_emplace_front_with<E, F>(&mut self, make: F) -> Result<(), EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cursor_start_mut().try_emplace_with(make).map(drop)
    }

    /// Builds an element in a new node at the back of the list, where
    /// building may fail. See [`CursorMut::try_emplace_with`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::error::EmplaceError;
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.try_emplace_back_with(|| "7".parse::<u8>()).is_ok());
    /// let err = list.try_emplace_back_with(|| "x".parse::<u8>());
    /// assert!(matches!(err, Err(EmplaceError::Construct(_))));
    /// assert_eq!(list.into_vec(), vec![7]);
    /// ```
    pub fn try_emplace_back_with<E, F>(&mut self, make: F) -> Result<(), EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cursor_end_mut().try_emplace_with(make).map(drop)
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// This is a removal of the first node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        self.cursor_start_mut().remove()
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// This is a removal of the node before the ghost node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        self.cursor_end_mut().backspace()
    }

    /// Exchanges the contents of two lists.
    ///
    /// All nodes change hands without being touched, so every [`Position`]
    /// keeps referring to the same element, now inside the other list. The
    /// allocators are exchanged only if [`NodeAllocator::PROPAGATE_ON_SWAP`]
    /// is set.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut a = List::from([1, 2, 3]);
    /// let mut b = List::from([4]);
    /// a.swap(&mut b);
    /// assert_eq!(a.into_vec(), vec![4]);
    /// assert_eq!(b.into_vec(), vec![1, 2, 3]);
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ghost, &mut other.ghost);
        mem::swap(&mut self.len, &mut other.len);
        if A::PROPAGATE_ON_SWAP {
            mem::swap(&mut self.alloc, &mut other.alloc);
        } else {
            log::trace!("swapping lists, allocators stay in place");
        }
    }

    /// Provides a cursor at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// let cursor = list.cursor_start();
    /// assert_eq!(cursor.current(), Some(&1));
    /// ```
    pub fn cursor_start(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, self.front_node())
    }

    /// Provides a cursor at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2, 3]);
    /// let cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, self.ghost_node())
    }

    /// Provides a cursor with editing operations at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the list is empty.
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T, A> {
        let front = self.front_node();
        CursorMut::new(self, front)
    }

    /// Provides a cursor with editing operations at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_end_mut();
    ///
    /// if let Some(x) = cursor.previous_mut() {
    ///     *x *= 5;
    /// }
    /// assert_eq!(cursor.previous(), Some(&15));
    /// ```
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, A> {
        let ghost = self.ghost_node();
        CursorMut::new(self, ghost)
    }

    /// Provides a cursor at the node referred to by `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` was taken from another list. With `debug_assertions`
    /// or the `checked-positions` feature, also panics if the node of `pos`
    /// has been removed.
    ///
    /// # Safety
    ///
    /// The node of `pos` must still be in this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.move_next_cyclic();
    /// let two = cursor.position();
    /// cursor.move_to_start();
    /// cursor.remove();
    ///
    /// // Removing other nodes leaves `two` valid.
    /// let cursor = unsafe { list.cursor_at(two) };
    /// assert_eq!(cursor.current(), Some(&2));
    /// ```
    pub unsafe fn cursor_at(&self, pos: Position<T>) -> Cursor<'_, T, A> {
        self.check_position(pos);
        Cursor::new(self, pos.node)
    }

    /// Provides a cursor with editing operations at the node referred to by
    /// `pos`.
    ///
    /// # Panics
    ///
    /// See [`List::cursor_at`].
    ///
    /// # Safety
    ///
    /// The node of `pos` must still be in this list.
    pub unsafe fn cursor_mut_at(&mut self, pos: Position<T>) -> CursorMut<'_, T, A> {
        self.check_position(pos);
        CursorMut::new(self, pos.node)
    }

    /// Inserts `elt` right before the node referred to by `pos` (the ghost
    /// node means the back), and returns the position of the new node.
    ///
    /// No other position is affected.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time, plus *O*(*n*) for the
    /// position check when it is enabled.
    ///
    /// # Panics
    ///
    /// See [`List::cursor_at`].
    ///
    /// # Safety
    ///
    /// The node of `pos` must still be in this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start();
    /// cursor.seek_by(1);
    /// let two = cursor.position();
    ///
    /// let nine = unsafe { list.insert_before(two, 9) };
    /// assert_eq!(list.len(), 4);
    /// assert_eq!(unsafe { list.cursor_at(nine) }.current(), Some(&9));
    /// assert_eq!(list.into_vec(), vec![1, 9, 2, 3]);
    /// ```
    pub unsafe fn insert_before(&mut self, pos: Position<T>, elt: T) -> Position<T> {
        self.cursor_mut_at(pos).insert(elt)
    }

    /// Removes the node referred to by `pos` and returns its element.
    ///
    /// Only `pos` (and its copies) become invalid.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time, plus *O*(*n*) for the
    /// position check when it is enabled.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the ghost node; see also [`List::cursor_at`].
    ///
    /// # Safety
    ///
    /// The node of `pos` must still be in this list.
    pub unsafe fn erase(&mut self, pos: Position<T>) -> T {
        self.cursor_mut_at(pos)
            .remove()
            .expect("Cannot erase the ghost node")
    }

    /// Provides a forward iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Provides a forward iterator with mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([0, 1, 2]);
    ///
    /// for element in list.iter_mut() {
    ///     *element += 10;
    /// }
    ///
    /// let mut iter = list.iter().rev();
    /// assert_eq!(iter.next(), Some(&12));
    /// assert_eq!(iter.next(), Some(&11));
    /// assert_eq!(iter.next(), Some(&10));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Collects the elements into a `Vec`, front to back.
    pub fn into_vec(self) -> Vec<T> {
        self.into_iter().collect()
    }
}

impl<T: Debug, A: NodeAllocator> Debug for List<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: NodeAllocator + Default> Default for List<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

/// Unwrap the result of an infallible emplacement, reporting allocation
/// failure the way std collections do.
pub(crate) fn unwrap_emplaced<P>(result: Result<P, EmplaceError<Infallible>>) -> P {
    match result {
        Ok(pos) => pos,
        Err(err) => std::alloc::handle_alloc_error(AllocError::from(err).layout),
    }
}

fn new_ghost() -> NonNull<Link> {
    let ghost = NonNull::from(Box::leak(Box::new(Link {
        next: NonNull::dangling(),
        prev: NonNull::dangling(),
    })));
    // SAFETY: `ghost` was just leaked from a box, and it links to itself.
    unsafe { connect(ghost, ghost) };
    ghost
}

#[cfg(debug_assertions)]
fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(next_of(prev), next);
        assert_eq!(prev_of(next), prev);
    }
}

impl<T, A: NodeAllocator> Drop for List<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost was leaked from a box in `new_ghost`, and no value
        // node refers to it anymore.
        unsafe { drop(Box::from_raw(self.ghost.as_ptr())) };
    }
}

unsafe impl<T: Send, A: NodeAllocator + Send> Send for List<T, A> {}

unsafe impl<T: Sync, A: NodeAllocator + Sync> Sync for List<T, A> {}

// Ensure that `List` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: List<&'static str>) -> List<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::{NodeAllocator, Tracking};
    use crate::error::{AllocError, EmplaceError};
    use crate::list::List;
    use std::alloc::Layout;
    use std::cell::{Cell, RefCell};
    use std::ptr::NonNull;
    use std::rc::Rc;
    use thiserror::Error;

    /// Refuses to allocate once `budget` allocations have been served.
    #[derive(Clone)]
    struct Budget {
        left: Rc<Cell<usize>>,
        inner: Tracking,
    }

    impl Budget {
        fn new(budget: usize, inner: &Tracking) -> Self {
            Self {
                left: Rc::new(Cell::new(budget)),
                inner: inner.clone(),
            }
        }
    }

    unsafe impl NodeAllocator for Budget {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            match self.left.get() {
                0 => Err(AllocError::new(layout)),
                left => {
                    self.left.set(left - 1);
                    self.inner.allocate(layout)
                }
            }
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.inner.deallocate(ptr, layout)
        }
    }

    fn assert_consistent<T, A: NodeAllocator>(list: &List<T, A>) {
        assert_eq!(list.iter().count(), list.len());
        assert_eq!(list.iter().rev().count(), list.len());
        let mut cursor = list.cursor_start();
        let mut steps = 0;
        while cursor.current().is_some() {
            cursor.move_next_cyclic();
            steps += 1;
        }
        assert_eq!(steps, list.len());
        assert!(cursor == list.cursor_end());
    }

    #[test]
    fn list_create() {
        let mut list = List::<i32>::new();
        assert!(list.is_empty());
        list.push_back(1);
        assert!(!list.is_empty());
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
    }

    #[test]
    fn list_drop() {
        #[derive(Debug)]
        struct DropChecker<'a, T: Copy> {
            value: T,
            dropped: &'a RefCell<Vec<T>>,
        }
        impl<'a, T: Copy> DropChecker<'a, T> {
            fn new(value: T, dropped: &'a RefCell<Vec<T>>) -> Self {
                Self { value, dropped }
            }
        }
        impl<'a, T: Copy> Drop for DropChecker<'a, T> {
            fn drop(&mut self) {
                self.dropped.borrow_mut().push(self.value);
            }
        }
        let dropped = RefCell::new(Vec::<i32>::new());
        let mut list = List::new();
        list.push_back(DropChecker::new(1, &dropped));
        list.push_back(DropChecker::new(2, &dropped));
        list.push_back(DropChecker::new(3, &dropped));
        drop(list);
        // Destruction removes from the back.
        assert_eq!(dropped.borrow().as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn list_push_and_pop() {
        let mut list = List::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);

        list.push_back(1);
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());

        list.push_front(1);
        list.push_front(2);
        list.push_back(3);
        assert_consistent(&list);
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_back(), Some(3));

        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert!(list.is_empty());
        assert_consistent(&list);
    }

    #[test]
    fn list_constructors() {
        let list: List<String> = List::with_default(3);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(String::is_empty));

        let list = List::from_elem(2, &vec![1, 2]);
        assert_eq!(list.into_vec(), vec![vec![1, 2], vec![1, 2]]);

        let alloc = Tracking::new();
        let list = List::from_elem_in(4, &7u8, alloc.clone());
        assert_eq!(alloc.stats().live(), 4);
        assert_eq!(list.iter().copied().sum::<u8>(), 28);
        drop(list);
        assert_eq!(alloc.stats().live(), 0);

        let list: List<u8> = List::default();
        assert!(list.is_empty());
    }

    #[test]
    fn list_counts_match_traversal() {
        let mut list = List::new();
        for i in 0..20 {
            match i % 5 {
                0 | 1 => list.push_back(i),
                2 => list.push_front(i),
                3 => {
                    list.pop_front();
                }
                _ => {
                    let mut cursor = list.cursor_start_mut();
                    cursor.seek_by(1);
                    cursor.insert(i);
                }
            }
            assert_consistent(&list);
        }
        while list.pop_back().is_some() {
            assert_consistent(&list);
        }
    }

    #[test]
    fn list_scenarios() {
        // Forward and backward traversal.
        let mut list = List::new();
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1]);

        // Insert before the position of `2`.
        let two = {
            let mut cursor = list.cursor_start();
            cursor.seek_by(1);
            cursor.position()
        };
        unsafe { list.insert_before(two, 9) };
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 9, 2, 3]);
        assert_eq!(list.len(), 4);

        // Pop the front; `two` still refers to `2`.
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![9, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(unsafe { list.cursor_at(two) }.current(), Some(&2));

        // A default list starts and ends at the ghost.
        let empty = List::<i32>::new();
        assert_eq!(empty.len(), 0);
        assert!(empty.cursor_start() == empty.cursor_end());
    }

    #[test]
    fn list_erase_keeps_other_positions() {
        let mut list = List::from([10, 20, 30, 40]);
        let mut positions = Vec::new();
        let mut cursor = list.cursor_start();
        while cursor.current().is_some() {
            positions.push(cursor.position());
            cursor.move_next_cyclic();
        }

        assert_eq!(unsafe { list.erase(positions[1]) }, 20);
        assert_eq!(unsafe { list.erase(positions[3]) }, 40);
        assert_eq!(unsafe { list.cursor_at(positions[0]) }.current(), Some(&10));
        assert_eq!(unsafe { list.cursor_at(positions[2]) }.current(), Some(&30));
        assert_eq!(list.len(), 2);
        assert_consistent(&list);
    }

    #[test]
    #[should_panic(expected = "Cannot erase the ghost node")]
    fn list_erase_ghost() {
        let mut list = List::from([1]);
        let end = list.cursor_end().position();
        unsafe { list.erase(end) };
    }

    #[test]
    #[should_panic(expected = "another list")]
    fn list_foreign_position() {
        let list = List::from([1]);
        let other = List::from([1]);
        let pos = other.cursor_start().position();
        let _ = unsafe { list.cursor_at(pos) };
    }

    #[cfg(any(debug_assertions, feature = "checked-positions"))]
    #[test]
    #[should_panic(expected = "has been removed")]
    fn list_removed_position() {
        let mut list = List::from([1, 2]);
        let pos = list.cursor_start().position();
        list.pop_front();
        let _ = unsafe { list.cursor_at(pos) };
    }

    #[test]
    fn list_construct_failure() {
        #[derive(Debug, Error, PartialEq)]
        #[error("constructor refused")]
        struct Refused;

        let alloc = Tracking::new();
        let mut list = List::new_in(alloc.clone());
        let mut calls = 0;
        for i in 0..5 {
            calls += 1;
            let result = list.try_emplace_back_with(|| if calls == 3 { Err(Refused) } else { Ok(i) });
            if calls == 3 {
                assert!(matches!(result, Err(EmplaceError::Construct(Refused))));
                break;
            }
            assert!(result.is_ok());
        }
        assert_eq!(list.len(), 2);
        assert_eq!(alloc.stats().allocations(), 3);
        assert_eq!(alloc.stats().live(), 2);
        assert_consistent(&list);
    }

    #[test]
    fn list_construct_panic() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let alloc = Tracking::new();
        let mut list = List::new_in(alloc.clone());
        list.push_back(1);
        list.push_back(2);
        let result = catch_unwind(AssertUnwindSafe(|| {
            list.emplace_front_with(|| panic!("constructor panicked"))
        }));
        assert!(result.is_err());
        assert_eq!(list.len(), 2);
        assert_eq!(alloc.stats().live(), 2);
        assert_consistent(&list);
    }

    #[test]
    fn list_alloc_failure() {
        let tracking = Tracking::new();
        let mut list = List::new_in(Budget::new(2, &tracking));
        assert!(list.try_push_back(1).is_ok());
        assert!(list.try_push_front(0).is_ok());
        let err = list.try_push_back(2).unwrap_err();
        assert_eq!(err.layout.size(), std::mem::size_of::<super::Node<i32>>());
        assert!(matches!(
            list.try_emplace_front_with(|| Ok::<_, std::fmt::Error>(5)),
            Err(EmplaceError::Alloc(_))
        ));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_consistent(&list);
        drop(list);
        assert_eq!(tracking.stats().live(), 0);
    }

    #[test]
    fn list_swap() {
        let left = Tracking::new();
        let right = Tracking::new();
        let mut a = List::from_iter_in(0..3, left.clone());
        let mut b = List::from_iter_in(10..12, right.clone());
        let pos = a.cursor_start().position();

        a.swap(&mut b);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
        assert!(a.allocator().shares_stats_with(&right));
        assert!(b.allocator().shares_stats_with(&left));
        assert_eq!(unsafe { b.cursor_at(pos) }.current(), Some(&0));
        assert_consistent(&a);
        assert_consistent(&b);

        drop(a);
        assert_eq!(right.stats().live(), 0);
        assert_eq!(left.stats().live(), 3);
        drop(b);
        assert_eq!(left.stats().live(), 0);
    }

    #[test]
    fn list_swap_keeps_allocators() {
        let tracking = Tracking::new();
        let mut a = List::from_iter_in(0..3, Budget::new(3, &tracking));
        let mut b = List::from_iter_in(0..1, Budget::new(5, &tracking));
        a.swap(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 3);
        // `Budget` does not propagate: `a` keeps its exhausted budget.
        assert!(a.try_push_back(1).is_err());
        assert!(b.try_push_back(1).is_ok());
        drop((a, b));
        assert_eq!(tracking.stats().live(), 0);
    }
}
