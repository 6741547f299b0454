use crate::alloc::NodeAllocator;
use crate::error::AllocError;
use crate::list::List;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;

impl<T: PartialEq, A: NodeAllocator, B: NodeAllocator> PartialEq<List<T, B>> for List<T, A> {
    fn eq(&self, other: &List<T, B>) -> bool {
        self.len == other.len && self.iter().eq(other)
    }
}

impl<T: Eq, A: NodeAllocator> Eq for List<T, A> {}

impl<T: PartialOrd, A: NodeAllocator> PartialOrd for List<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord, A: NodeAllocator> Ord for List<T, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

/// Deep copy, element by element, into freshly allocated nodes.
///
/// `clone` takes the allocator chosen by [`NodeAllocator::select_on_copy`].
/// `clone_from` builds the copy aside and swaps it in, so if cloning an
/// element panics, `self` is left untouched. The copy is built with the
/// source's allocator if [`NodeAllocator::PROPAGATE_ON_COPY_ASSIGNMENT`]
/// holds, and with `self`'s otherwise.
///
/// # Examples
///
/// ```
/// use sentinel_list::alloc::Tracking;
/// use sentinel_list::List;
///
/// let a = Tracking::new();
/// let b = Tracking::new();
/// let source = List::from_iter_in([1, 2, 3], a.clone());
/// let mut target = List::from_iter_in([9], b.clone());
///
/// target.clone_from(&source);
/// assert_eq!(target, source);
///
/// // `Tracking` propagates on copy-assignment.
/// assert!(target.allocator().shares_stats_with(&a));
/// assert_eq!((a.stats().live(), b.stats().live()), (6, 0));
/// ```
impl<T: Clone, A: NodeAllocator> Clone for List<T, A> {
    fn clone(&self) -> Self {
        Self::from_iter_in(self.iter().cloned(), self.alloc.select_on_copy())
    }

    fn clone_from(&mut self, source: &Self) {
        let alloc = if A::PROPAGATE_ON_COPY_ASSIGNMENT {
            source.alloc.clone()
        } else {
            self.alloc.clone()
        };
        let mut copy = Self::from_iter_in(source.iter().cloned(), alloc);
        mem::swap(self, &mut copy);
    }
}

impl<T: Hash, A: NodeAllocator> Hash for List<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T, A: NodeAllocator> List<T, A> {
    /// Returns `true` if the `List` contains an element equal to the given value.
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
    /// assert_eq!(list.contains(&0), true);
    /// assert_eq!(list.contains(&10), false);
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.iter().any(|e| e == x)
    }

    /// Like `clone`, but returns an error instead of aborting when a node
    /// cannot be allocated. Nodes copied so far are released on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentinel_list::List;
    ///
    /// let list = List::from(["a", "b"]);
    /// let copy = list.try_clone().unwrap();
    /// assert_eq!(copy, list);
    /// ```
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut copy = Self::new_in(self.alloc.select_on_copy());
        for elt in self {
            copy.try_push_back(elt.clone())?;
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::{NodeAllocator, Tracking};
    use crate::error::AllocError;
    use crate::List;
    use std::alloc::Layout;
    use std::cell::Cell;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::ptr::NonNull;
    use std::rc::Rc;

    /// Instances differ only by `tag`, and share one heap and one budget.
    #[derive(Clone)]
    struct Tagged {
        tag: u32,
        budget: Rc<Cell<usize>>,
        inner: Tracking,
    }

    impl Tagged {
        fn new(tag: u32, budget: usize, inner: &Tracking) -> Self {
            Self {
                tag,
                budget: Rc::new(Cell::new(budget)),
                inner: inner.clone(),
            }
        }
    }

    unsafe impl NodeAllocator for Tagged {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            match self.budget.get() {
                0 => Err(AllocError::new(layout)),
                left => {
                    self.budget.set(left - 1);
                    self.inner.allocate(layout)
                }
            }
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.inner.deallocate(ptr, layout)
        }

        fn select_on_copy(&self) -> Self {
            Self {
                tag: self.tag + 100,
                ..self.clone()
            }
        }
    }

    fn hash_of<H: Hash>(value: &H) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn list_compare() {
        let a = List::from([1, 2, 3]);
        let b = List::from_iter_in([1, 2, 3], Tracking::new());
        assert_eq!(a, b);
        assert_ne!(a, List::from([1, 2]));
        assert!(List::from([1, 2]) < a);
        assert!(List::from([1, 3]) > a);
        assert_eq!(hash_of(&a), hash_of(&a.clone()));
        assert_ne!(hash_of(&List::<u8>::new()), hash_of(&List::from([0u8])));
        assert!(a.contains(&3));
        assert!(!a.contains(&4));
    }

    #[test]
    fn list_clone_is_deep() {
        let source = List::from([String::from("a"), String::from("b")]);
        let mut copy = source.clone();
        copy.front_mut().unwrap().push('!');
        copy.push_back(String::from("c"));
        assert_eq!(source.into_vec(), vec!["a", "b"]);
        assert_eq!(copy.into_vec(), vec!["a!", "b", "c"]);
    }

    #[test]
    fn list_clone_selects_allocator() {
        let tracking = Tracking::new();
        let source = List::from_iter_in(0..3, Tagged::new(1, 10, &tracking));
        let copy = source.clone();
        assert_eq!(copy.allocator().tag, 101);
        assert_eq!(copy, source);
        assert_eq!(tracking.stats().live(), 6);

        let copy = source.try_clone().unwrap();
        assert_eq!(copy.allocator().tag, 101);
    }

    #[test]
    fn list_clone_from_keeps_allocator() {
        let tracking = Tracking::new();
        let source = List::from_iter_in(0..3, Tagged::new(1, 10, &tracking));
        let mut target = List::from_iter_in(10..12, Tagged::new(2, 10, &tracking));
        target.clone_from(&source);
        assert_eq!(target.allocator().tag, 2);
        assert_eq!(target, source);
        assert_eq!(tracking.stats().live(), 6);
    }

    #[test]
    fn list_clone_from_propagates_allocator() {
        let a = Tracking::new();
        let b = Tracking::new();
        let source = List::from_iter_in(0..3, a.clone());
        let mut target = List::from_iter_in(10..15, b.clone());
        target.clone_from(&source);
        assert!(target.allocator().shares_stats_with(&a));
        assert_eq!(a.stats().live(), 6);
        assert_eq!(b.stats().live(), 0);
    }

    #[test]
    fn list_try_clone_failure() {
        let tracking = Tracking::new();
        let source = List::from_iter_in(0..3, Tagged::new(1, 4, &tracking));
        assert_eq!(source.try_clone().err().map(|err| err.layout.size() > 0), Some(true));
        assert_eq!(source.into_vec(), vec![0, 1, 2]);
        assert_eq!(tracking.stats().live(), 0);
    }

    #[test]
    fn list_clone_from_panic() {
        struct Fragile(u32);

        impl Clone for Fragile {
            fn clone(&self) -> Self {
                assert_ne!(self.0, 2, "cannot clone 2");
                Fragile(self.0)
            }
        }

        let tracking = Tracking::new();
        let source = List::from_iter_in((0..4).map(Fragile), tracking.clone());
        let mut target = List::from_iter_in([Fragile(7)], tracking.clone());
        let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
        assert!(result.is_err());

        assert_eq!(target.len(), 1);
        assert_eq!(target.front().map(|f| f.0), Some(7));
        assert_eq!(tracking.stats().live(), 5);
    }
}
