//! This crate provides a doubly-linked list over a ghost node, whose value
//! nodes are obtained from a pluggable allocator.
//!
//! The [`List`] allows inserting, removing elements at any given position in
//! constant time, without moving any other element. In compromise, accessing
//! or mutating elements at any position take *O*(*n*) time.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(0); // insert 0 at the beginning of the list
//! assert_eq!(cursor.current(), Some(&1));
//! assert_eq!(cursor.view(), &List::from([0, 1, 2, 3, 4]));
//!
//! cursor.seek_by(2); // move the cursor two nodes forward, and remove it.
//! assert_eq!(cursor.remove(), Some(3));
//! assert_eq!(cursor.view(), &List::from([0, 1, 2, 4]));
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║ payload T ║           ║ payload T ║                            ↑   ↑
//! │  ╚═══════════╝           ╚═══════════╝                            │   │
//! │      Node 0                  Node 1                               │   │
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╟───────────╢
//! ║    len    ║
//! ╟───────────╢
//! ║   alloc   ║
//! ╚═══════════╝
//!     List
//! ```
//! The `List` contains:
//! - a pointer `ghost` that points to the ghost node;
//! - a length field `len` counting the value nodes;
//! - the allocator `alloc` that value nodes come from.
//!
//! Each value node of the list `List<T, A>` is allocated by `alloc`, and contains:
//! - the `next` pointer that points to the next element (or the ghost node if it
//!   is the last element in the list);
//! - the `prev` pointer that points to the previous element (or the ghost node if
//!   it is the first element in the list);
//! - the actual payload `T`.
//!
//! The ghost node carries the two links only, and lives as long as the list.
//!
//! Initially, there is a ghost node in an empty list, of which the `next` and `prev`
//! pointer point to itself.
//!
//! As elements are inserted into the list, `ghost.next` points to the first element,
//! and `ghost.prev` points to the last element of the list.
//!
//! # Iteration
//!
//! Iterating over a list is by the [`Iter`] and [`IterMut`] iterators. These are
//! double-ended iterators and iterate the list like an array (fused and non-cyclic).
//! [`IterMut`] provides mutability of the elements (but not the linked structure of
//! the list).
//!
//! ## Examples
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), Some(&3));
//! assert_eq!(iter.next(), None);
//! assert_eq!(iter.next(), None); // Fused and non-cyclic
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![6, 4, 2]);
//! ```
//!
//! # Cursor Views
//!
//! Beside iteration, the cursors [`Cursor`] and [`CursorMut`] provide more
//! flexible ways of viewing a list.
//!
//! As the names suggest, they are like cursors and can move forward or backward
//! over the list. In a list with length *n*, there are *n* + 1 valid locations
//! for the cursor: the *n* value nodes and the ghost node.
//!
//! Moving with [`seek_by`] is cyclic and passes through the ghost node, while
//! [`move_next`] and [`seek_forward`] stop there with an error. Two cursors are
//! equal when they point to the same node of the same list.
//!
//! A [`CursorMut`] can be turned into a [`Cursor`], but not the other way around.
//!
//! ## Examples
//!
//! ```
//! use sentinel_list::List;
//!
//! let list = List::from([1, 2, 3]);
//! let mut cursor = list.cursor_start();
//!
//! cursor.seek_by(3);
//! assert_eq!(cursor, list.cursor_end());
//! assert_eq!(cursor.current(), None);
//!
//! cursor.seek_by(1); // Wraps around through the ghost node
//! assert_eq!(cursor.current(), Some(&1));
//! ```
//!
//! # Cursor Mutations
//!
//! [`CursorMut`] provides many useful ways to mutate the list in any position.
//! - [`insert`]: insert a new item before the cursor;
//! - [`try_emplace_with`]: build a new item before the cursor, from a fallible
//!   constructor;
//! - [`remove`]: remove the item at the cursor;
//! - [`backspace`]: remove the item before the cursor;
//!
//! ## Examples
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(5); // becomes [5, 1, 2, 3, 4], points to 1
//! assert_eq!(cursor.current(), Some(&1));
//!
//! assert!(cursor.seek_forward(2).is_ok());
//! assert_eq!(cursor.remove(), Some(3)); // becomes [5, 1, 2, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(cursor.backspace(), Some(2)); // becomes [5, 1, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(list.into_vec(), vec![5, 1, 4]);
//! ```
//!
//! # Positions
//!
//! A [`Position`] is a detached handle to a node, taken from a cursor. It
//! outlives the cursor's borrow and stays valid while its node is in the list,
//! whatever happens to the other nodes. Resolving it is `unsafe`, since the
//! list cannot cheaply tell whether the node is still there.
//!
//! ```
//! use sentinel_list::List;
//!
//! let mut list = List::from(['a']);
//! let mut cursor = list.cursor_start_mut();
//! let a = cursor.position();
//! cursor.move_to_end();
//! let d = cursor.insert('d');
//!
//! list.push_front('_');
//! // SAFETY: both nodes are still in the list.
//! unsafe {
//!     list.insert_before(d, 'c');
//!     assert_eq!(list.erase(a), 'a');
//! }
//! assert_eq!(list.into_vec(), vec!['_', 'c', 'd']);
//! ```
//!
//! # Allocators
//!
//! Value nodes come from a [`NodeAllocator`], given at construction with the
//! `*_in` constructors. The default [`Global`] uses the global heap. The
//! allocator's associated consts decide what happens to it on `clone_from`
//! and [`List::swap`].
//!
//! Allocation failure aborts through [`std::alloc::handle_alloc_error`] in the
//! plain operations, and is returned as an error by the `try_*` ones. In both
//! cases, and when building an element fails, the list is left as it was.
//!
//! [`List`]: crate::List
//! [`Iter`]: crate::Iter
//! [`IterMut`]: crate::IterMut
//! [`Position`]: crate::Position
//! [`NodeAllocator`]: crate::alloc::NodeAllocator
//! [`Global`]: crate::alloc::Global
//! [`Cursor`]: crate::list::cursor::Cursor
//! [`CursorMut`]: crate::list::cursor::CursorMut
//! [`seek_by`]: crate::list::cursor::Cursor::seek_by
//! [`move_next`]: crate::list::cursor::Cursor::move_next
//! [`seek_forward`]: crate::list::cursor::Cursor::seek_forward
//! [`insert`]: crate::list::cursor::CursorMut::insert
//! [`try_emplace_with`]: crate::list::cursor::CursorMut::try_emplace_with
//! [`remove`]: crate::list::cursor::CursorMut::remove
//! [`backspace`]: crate::list::cursor::CursorMut::backspace

#[doc(inline)]
pub use list::cursor::{Cursor, CursorMut, Position};
#[doc(inline)]
pub use list::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::List;

pub mod alloc;
pub mod error;
pub mod list;
