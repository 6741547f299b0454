use crate::alloc::{Global, NodeAllocator};
use crate::error::{AllocError, EmplaceError, SeekError};
use crate::list::{next_of, prev_of, unwrap_emplaced, Link, List, Node};
use std::convert::Infallible;
use std::fmt;
use std::fmt::Formatter;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A cursor over a `List`.
///
/// A `Cursor` is like an iterator, except that it can freely seek back-and-forth.
///
/// In a list with length *n*, there are *n* + 1 valid locations for the cursor:
/// the *n* value nodes and the ghost node, which stands for "past the back"
/// and, the chain being cyclic, also for "before the front".
///
/// # Examples
///
/// Here is a simple example showing how the cursors work. (The ghost node of the
/// list is denoted by `#`).
/// ```
/// use sentinel_list::List;
///
/// // Create a list: [ A B C D #]
/// let list = List::from(['A', 'B', 'C', 'D']);
///
/// // Create a cursor at start: [|A B C D #]
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'A'));
///
/// // Move cursor forward: [ A|B C D #]
/// assert!(cursor.move_next().is_ok());
/// assert_eq!(cursor.current(), Some(&'B'));
///
/// // Create a cursor in the end: [ A B C D|#]
/// let mut cursor = list.cursor_end();
/// assert_eq!(cursor.current(), None);
///
/// // Move cursor backward: [ A B C|D #]
/// assert!(cursor.move_prev().is_ok());
/// assert_eq!(cursor.current(), Some(&'D'));
///
/// // Create a cursor in the end and move forward: [ A B C D|#]
/// let mut cursor = list.cursor_end();
/// assert!(cursor.move_next().is_err());
/// // Move cursor forward, cyclically: [|A B C D #]
/// cursor.move_next_cyclic();
/// assert_eq!(cursor.current(), Some(&'A'));
/// ```
pub struct Cursor<'a, T: 'a, A: NodeAllocator = Global> {
    pub(crate) current: NonNull<Link>,
    pub(crate) list: &'a List<T, A>,
}

impl<'a, T: 'a, A: NodeAllocator> Clone for Cursor<'a, T, A> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            list: self.list,
        }
    }
}

/// Compare cursors by the node they point to.
///
/// Only cursors belong to the same list and have the same positions
/// are considered equal.
///
/// # Examples
/// ```
/// use sentinel_list::List;
///
/// let list = List::from([1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let mut cursor2 = cursor1.clone();
/// // The same list, and the same position.
/// assert_eq!(cursor1, cursor2);
///
/// cursor2.move_next_cyclic();
/// // The same list, but different positions.
/// assert_ne!(cursor1, cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_start();
/// // Different list, equal elements.
/// assert_ne!(cursor1, cursor3);
/// ```
impl<'a, T: 'a, A: NodeAllocator> PartialEq for Cursor<'a, T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_list_with(other) && self.current == other.current
    }
}

impl<'a, T: 'a, A: NodeAllocator> Eq for Cursor<'a, T, A> {}

/// A cursor over a `List` with editing operations.
///
/// A `CursorMut` is like an iterator, except that it can freely seek back-and-forth,
/// and can safely mutate the list during iteration. This is because the lifetime of
/// its yielded references is tied to its own lifetime, instead of just the underlying
/// list. This means cursors cannot yield multiple elements at once.
///
/// A `CursorMut` converts into a [`Cursor`], but not the other way around.
///
/// # Examples
///
/// ```compile_fail
/// use sentinel_list::List;
///
/// let mut list = List::from([1, 2, 3]);
/// let mut cursor = list.cursor_start_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", cursor.current());
/// ```
pub struct CursorMut<'a, T: 'a, A: NodeAllocator = Global> {
    pub(crate) current: NonNull<Link>,
    pub(crate) list: &'a mut List<T, A>,
}

/// A non-owning handle to a node of a `List`, detached from any borrow.
///
/// A position is taken from a cursor with [`Cursor::position`] or
/// [`CursorMut::position`], and turned back into a cursor with
/// [`List::cursor_at`] or [`List::cursor_mut_at`]. It stays valid as long as
/// its node is in the list: inserting or removing *other* nodes does not
/// affect it. Once its own node is removed, it is dangling for good.
///
/// Equality is identity of the node, not of the element.
///
/// # Examples
///
/// ```
/// use sentinel_list::List;
///
/// let mut list = List::from([1, 2, 3]);
/// let back = list.cursor_end().position();
/// assert!(back.is_end());
///
/// list.push_back(4);
/// assert_eq!(list.cursor_end().position(), back);
/// ```
pub struct Position<T> {
    pub(crate) ghost: NonNull<Link>,
    pub(crate) node: NonNull<Link>,
    _marker: PhantomData<*const Node<T>>,
}

impl<T> Position<T> {
    pub(crate) fn new(ghost: NonNull<Link>, node: NonNull<Link>) -> Self {
        Self {
            ghost,
            node,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the position is the ghost node of its list.
    pub fn is_end(&self) -> bool {
        self.node == self.ghost
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Position<T> {}

impl<T> Hash for Position<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state)
    }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("node", &self.node)
            .field("is_end", &self.is_end())
            .finish()
    }
}

macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        // Private methods
        impl<'a, T: 'a, A: NodeAllocator> $CURSOR<'a, T, A> {
            pub(crate) fn is_ghost_node(&self) -> bool {
                self.current == self.list.ghost_node()
            }
            pub(crate) fn is_front_node(&self) -> bool {
                self.prev_node() == self.list.ghost_node()
            }
            pub(crate) fn next_node(&self) -> NonNull<Link> {
                // SAFETY: `current.next` is always valid since it is a cyclic list.
                unsafe { next_of(self.current) }
            }
            pub(crate) fn prev_node(&self) -> NonNull<Link> {
                // SAFETY: `current.prev` is always valid since it is a cyclic list.
                unsafe { prev_of(self.current) }
            }
        }

        impl<'a, T: 'a, A: NodeAllocator> $CURSOR<'a, T, A> {
            /// Returns `true` if the `List` is empty. See [`List::is_empty`].
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Returns the length of the `List`. See [`List::len`].
            pub fn len(&self) -> usize {
                self.list.len()
            }

            /// Returns `true` if the cursor is at the ghost node.
            pub fn is_end(&self) -> bool {
                self.is_ghost_node()
            }

            /// Returns a detached handle to the node the cursor points to.
            pub fn position(&self) -> Position<T> {
                Position::new(self.list.ghost_node(), self.current)
            }

            /// Move the cursor to the next position, where passing
            /// through the ghost node is allowed.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // The cursor is at the ghost node
            /// assert_eq!(cursor.previous(), Some(&3));
            /// cursor.move_next_cyclic();
            ///
            /// // The cursor is now at the first node
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn move_next_cyclic(&mut self) {
                self.current = self.next_node();
            }

            /// Move the cursor to the previous position, where passing
            /// through the ghost node is allowed.
            ///
            /// This operation should compute in *O*(*1*) time.
            pub fn move_prev_cyclic(&mut self) {
                self.current = self.prev_node();
            }

            /// Move the cursor to the next position, or return an error
            /// when passing through the ghost node is happened.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // Forbid to move passing through the ghost node
            /// assert!(cursor.move_next().is_err());
            ///
            /// // the cursor is still at the ghost node
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn move_next(&mut self) -> Result<(), SeekError> {
                if self.is_ghost_node() {
                    return Err(SeekError {
                        moved: 0,
                        requested: 1,
                    });
                }
                self.move_next_cyclic();
                Ok(())
            }

            /// Move the cursor to the previous position, or return an error
            /// when passing through the ghost node is happened.
            ///
            /// This operation should compute in *O*(*1*) time.
            pub fn move_prev(&mut self) -> Result<(), SeekError> {
                if self.is_front_node() {
                    return Err(SeekError {
                        moved: 0,
                        requested: 1,
                    });
                }
                self.move_prev_cyclic();
                Ok(())
            }

            /// Move forward the cursor by given steps, or return an error
            /// when passing through the ghost node is happened.
            ///
            /// If an error occurs, the cursor will stay at the ghost node.
            ///
            /// This operation should compute in *O*(*n*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// let err = cursor.seek_forward(5).unwrap_err();
            /// assert_eq!(err.moved, 3);
            ///
            /// // the cursor is now at the ghost node
            /// assert!(cursor.is_end());
            /// ```
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), SeekError> {
                (0..steps).try_for_each(|moved| {
                    self.move_next().map_err(|_| SeekError {
                        moved,
                        requested: steps,
                    })
                })
            }

            /// Move backward the cursor by given steps, or return an error
            /// when passing through the ghost node is happened.
            ///
            /// If an error occurs, the cursor will stay at the first node.
            ///
            /// This operation should compute in *O*(*n*) time.
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), SeekError> {
                (0..steps).try_for_each(|moved| {
                    self.move_prev().map_err(|_| SeekError {
                        moved,
                        requested: steps,
                    })
                })
            }

            /// Walk `offset` links: forward along `next` if positive, backward
            /// along `prev` if negative.
            ///
            /// The walk is cyclic and passes through the ghost node like any
            /// other node, so it never fails. Compare with a cursor at the end
            /// to detect the boundary; do not count on wrapping around.
            ///
            /// This operation should compute in *O*(|*offset*|) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use sentinel_list::List;
            ///
            /// let list = List::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// cursor.seek_by(2);
            /// assert_eq!(cursor.current(), Some(&3));
            /// cursor.seek_by(-1);
            /// assert_eq!(cursor.current(), Some(&2));
            ///
            /// // Two steps forward from `2` passes `3` and lands on the ghost.
            /// cursor.seek_by(2);
            /// assert_eq!(cursor, list.cursor_end());
            /// ```
            pub fn seek_by(&mut self, offset: isize) {
                if offset >= 0 {
                    (0..offset).for_each(|_| self.move_next_cyclic());
                } else {
                    (offset..0).for_each(|_| self.move_prev_cyclic());
                }
            }

            /// Set the cursor to the start of the list (i.e. the first node).
            ///
            /// This operation should compute in *O*(*1*) time.
            #[inline]
            pub fn move_to_start(&mut self) {
                self.current = self.list.front_node();
            }

            /// Set the cursor to the end of the list (i.e. the ghost node).
            ///
            /// This operation should compute in *O*(*1*) time.
            #[inline]
            pub fn move_to_end(&mut self) {
                self.current = self.list.ghost_node();
            }
        }

        impl<'a, T: fmt::Debug + 'a, A: NodeAllocator> fmt::Debug for $CURSOR<'a, T, A> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("current", &self.current())
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut);
impl_cursor!(Cursor);

impl<'a, T: 'a, A: NodeAllocator> Cursor<'a, T, A> {
    pub(crate) fn new(list: &'a List<T, A>, current: NonNull<Link>) -> Self {
        Self { current, list }
    }

    fn same_list_with(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list)
    }

    /// Return an immutable reference of current node of the cursor,
    /// or return `None` if it is located at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from([1, 2]);
    /// let mut cursor = list.cursor_start();
    /// assert_eq!(cursor.current(), Some(&1));
    /// cursor.seek_by(2);
    /// assert_eq!(cursor.current(), None);
    /// ```
    pub fn current(&self) -> Option<&'a T> {
        if self.is_ghost_node() {
            return None;
        }
        // SAFETY: it is safe because non-ghost nodes must hold a
        // valid element, and the list is borrowed immutably for `'a`.
        unsafe { Some(Node::element(self.current)) }
    }

    /// Return an immutable reference of previous node of the cursor,
    /// or return `None` if it is located at the first node.
    pub fn previous(&self) -> Option<&'a T> {
        if self.is_front_node() {
            return None;
        }
        // SAFETY: it is safe because the previous node of a non-first node
        // is never a ghost node, and non-ghost nodes must hold a valid element.
        unsafe { Some(Node::element(self.prev_node())) }
    }

    /// Returns the list the cursor belongs to.
    pub fn view(&self) -> &'a List<T, A> {
        self.list
    }
}

impl<'a, T: 'a, A: NodeAllocator> CursorMut<'a, T, A> {
    pub(crate) fn new(list: &'a mut List<T, A>, current: NonNull<Link>) -> Self {
        Self { current, list }
    }
}

// Methods that does not change the linking structure of the list.
impl<'a, T: 'a, A: NodeAllocator> CursorMut<'a, T, A> {
    /// Return an immutable reference of current node of the cursor,
    /// or return `None` if it is located at the ghost node.
    pub fn current(&self) -> Option<&T> {
        self.as_cursor().current()
    }

    /// Return an immutable reference of previous node of the cursor,
    /// or return `None` if it is located at the first node.
    pub fn previous(&self) -> Option<&T> {
        self.as_cursor().previous()
    }

    /// Return an mutable reference of current node of the cursor,
    /// or return `None` if it is located at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    ///
    /// // Create a cursor and mutate the element in the current node.
    /// let mut cursor = list.cursor_start_mut();
    /// *cursor.current_mut().unwrap() *= 5;
    /// assert_eq!(cursor.current(), Some(&5));
    ///
    /// // Cannot mutate the ghost node.
    /// assert!(list.cursor_end_mut().current_mut().is_none());
    /// ```
    pub fn current_mut(&mut self) -> Option<&mut T> {
        if self.is_ghost_node() {
            return None;
        }
        // SAFETY: it is safe because non-ghost nodes must hold a
        // valid element, and the cursor is borrowed mutably.
        unsafe { Some(Node::element_mut(self.current)) }
    }

    /// Return a mutable reference of previous node of the cursor,
    /// or return `None` if it is located at the first node.
    pub fn previous_mut(&mut self) -> Option<&mut T> {
        if self.is_front_node() {
            return None;
        }
        // SAFETY: it is safe because the previous node of a non-first node
        // is never a ghost node, and non-ghost nodes must hold a valid element.
        unsafe { Some(Node::element_mut(self.prev_node())) }
    }

    /// Re-borrow the mutable cursor as a short-lived immutable one.
    pub fn as_cursor(&self) -> Cursor<'_, T, A> {
        Cursor::new(&*self.list, self.current)
    }

    /// Convert the mutable cursor to an immutable one.
    pub fn into_cursor(self) -> Cursor<'a, T, A> {
        Cursor::new(self.list, self.current)
    }

    /// Temporarily view the list via an immutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    ///
    /// // Temporarily view the list
    /// assert_eq!(cursor.view().back(), Some(&3));
    ///
    /// cursor.insert(4);
    /// assert_eq!(list.into_vec(), vec![4, 1, 2, 3]);
    /// ```
    pub fn view(&self) -> &List<T, A> {
        &*self.list
    }
}

// Methods that might change the linking structure of the list.
impl<'a, T: 'a, A: NodeAllocator> CursorMut<'a, T, A> {
    /// Build an element with `make` in a new node before the cursor, and
    /// return the position of the new node. The cursor stays put.
    ///
    /// The node is allocated first, then the element is built. If either
    /// step fails, the allocation is released and the list is unchanged.
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.seek_by(1);
    ///
    /// assert!(cursor.try_emplace_with(|| "2".parse::<i32>()).is_ok());
    /// assert!(cursor.try_emplace_with(|| "two".parse::<i32>()).is_err());
    /// assert_eq!(cursor.current(), Some(&3));
    /// assert_eq!(list.into_vec(), vec![1, 2, 3]);
    /// ```
    pub fn try_emplace_with<E, F>(&mut self, make: F) -> Result<Position<T>, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // SAFETY: `self.current` is a valid node in the list, so it is safe.
        let node = unsafe { self.list.try_emplace_before(self.current, make)? };
        Ok(Position::new(self.list.ghost_node(), node))
    }

    /// Build an element with `make` in a new node before the cursor, and
    /// return the position of the new node. The cursor stays put.
    ///
    /// If `make` panics, the allocation is released and the list is
    /// unchanged.
    pub fn emplace_with<F>(&mut self, make: F) -> Position<T>
    where
        F: FnOnce() -> T,
    {
        unwrap_emplaced(self.try_emplace_with(|| Ok::<T, Infallible>(make())))
    }

    /// Add an element before the cursor position, and return the position
    /// of the new node. The cursor stays put.
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.seek_by(1);
    ///
    /// cursor.insert(4); // becomes [1, 4, 2, 3]
    /// assert_eq!(cursor.current(), Some(&2));
    ///
    /// cursor.move_to_end();
    /// cursor.insert(5); // becomes [1, 4, 2, 3, 5]
    /// assert_eq!(cursor.previous(), Some(&5));
    ///
    /// assert_eq!(list.into_vec(), vec![1, 4, 2, 3, 5]);
    /// ```
    pub fn insert(&mut self, item: T) -> Position<T> {
        self.emplace_with(|| item)
    }

    /// Like [`CursorMut::insert`], but returns an error if no node can be
    /// allocated. The list is unchanged on error, and `item` is dropped.
    pub fn try_insert(&mut self, item: T) -> Result<Position<T>, AllocError> {
        self.try_emplace_with(|| Ok::<T, Infallible>(item))
            .map_err(AllocError::from)
    }

    /// Remove the element at the cursor and return it, or return `None`
    /// if the cursor is at the ghost node. After removal, the cursor
    /// is moved to the next node unless no removing is happened.
    ///
    /// This operation should compute in *O*(*1*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_iter(0..10);
    /// let mut cursor = list.cursor_start_mut();
    /// cursor.seek_by(5);
    ///
    /// assert_eq!(cursor.remove(), Some(5)); // becomes [0, 1, 2, 3, 4, 6, 7, 8, 9]
    /// assert_eq!(cursor.current(), Some(&6));
    ///
    /// cursor.move_to_end();
    /// assert_eq!(cursor.remove(), None);
    ///
    /// assert_eq!(list.into_vec(), vec![0, 1, 2, 3, 4, 6, 7, 8, 9]);
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        if self.is_ghost_node() {
            return None;
        }
        let next = self.next_node();
        // SAFETY: `self.current` is a valid non-ghost node in the list, so it is safe.
        let element = unsafe { self.list.detach_node(self.current) };
        self.current = next;
        Some(element)
    }

    /// Remove the element before the cursor and return it, or return `None` if
    /// the cursor is at the first node. After removal, the cursor is not moved.
    ///
    /// This operation should compute in *O*(*1*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let mut list = List::from_iter(0..4);
    /// let mut cursor = list.cursor_end_mut();
    ///
    /// assert_eq!(cursor.backspace(), Some(3));
    /// assert!(cursor.is_end());
    ///
    /// cursor.move_to_start();
    /// assert_eq!(cursor.backspace(), None);
    /// assert_eq!(cursor.current(), Some(&0));
    /// ```
    pub fn backspace(&mut self) -> Option<T> {
        self.move_prev().ok()?;
        self.remove()
    }
}

impl<'a, T: 'a, A: NodeAllocator> From<CursorMut<'a, T, A>> for Cursor<'a, T, A> {
    fn from(cursor: CursorMut<'a, T, A>) -> Self {
        cursor.into_cursor()
    }
}

unsafe impl<T: Sync, A: NodeAllocator + Sync> Send for Cursor<'_, T, A> {}

unsafe impl<T: Sync, A: NodeAllocator + Sync> Sync for Cursor<'_, T, A> {}

unsafe impl<T: Send, A: NodeAllocator + Send> Send for CursorMut<'_, T, A> {}

unsafe impl<T: Sync, A: NodeAllocator + Sync> Sync for CursorMut<'_, T, A> {}
