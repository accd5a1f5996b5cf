//! Stream-style collection pipelines for the Klotho demo.
//!
//! [`Stream`] wraps any iterator and exposes the familiar pipeline vocabulary:
//! intermediate stages (`filter`, `map`, `sorted`, `distinct`, `peek`,
//! `limit`, `skip`) and terminal stages (`reduce`, `fold`, `for_each`,
//! `collect`, `count`, `min`, `max`). Every stage is lazy except `sorted`,
//! which has to buffer its input before it can yield anything.
//!
//! ```rust
//! use klotho_iter::Stream;
//!
//! let total = Stream::of([1, 2, 3, 4, 5, 6, 6, 6, 7, 6])
//!     .filter(|&i| i == 6)
//!     .map(|i| i * 2)
//!     .sorted()
//!     .reduce(|a, b| a + b);
//! assert_eq!(total, Some(48));
//!
//! let distinct: Vec<i32> = Stream::of([3, 1, 3, 2, 1]).sorted().distinct().collect();
//! assert_eq!(distinct, vec![1, 2, 3]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::iter::{Filter, Inspect, Map, Skip, Take};
use std::vec;

/// A pipeline over the items of an iterator.
#[derive(Debug, Clone)]
#[must_use = "streams are lazy and do nothing unless a terminal stage is called"]
pub struct Stream<I> {
    iter: I,
}

impl<I: Iterator> Stream<I> {
    /// Wrap an existing iterator.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }

    /// Keep only the items matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Stream<Filter<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Stream::new(self.iter.filter(predicate))
    }

    /// Transform every item with `func`.
    pub fn map<B, F>(self, func: F) -> Stream<Map<I, F>>
    where
        F: FnMut(I::Item) -> B,
    {
        Stream::new(self.iter.map(func))
    }

    /// Observe every item as it flows past without changing it.
    pub fn peek<F>(self, func: F) -> Stream<Inspect<I, F>>
    where
        F: FnMut(&I::Item),
    {
        Stream::new(self.iter.inspect(func))
    }

    /// Yield at most `n` items.
    pub fn limit(self, n: usize) -> Stream<Take<I>> {
        Stream::new(self.iter.take(n))
    }

    /// Drop the first `n` items.
    pub fn skip(self, n: usize) -> Stream<Skip<I>> {
        Stream::new(self.iter.skip(n))
    }

    /// Sort the items in ascending order. The sort is stable.
    pub fn sorted(self) -> Stream<vec::IntoIter<I::Item>>
    where
        I::Item: Ord,
    {
        let mut items: Vec<_> = self.iter.collect();
        items.sort();
        Stream::new(items.into_iter())
    }

    /// Sort the items with a custom comparator. The sort is stable.
    pub fn sorted_by<F>(self, compare: F) -> Stream<vec::IntoIter<I::Item>>
    where
        F: FnMut(&I::Item, &I::Item) -> Ordering,
    {
        let mut items: Vec<_> = self.iter.collect();
        items.sort_by(compare);
        Stream::new(items.into_iter())
    }

    /// Drop repeated items, keeping the first occurrence of each.
    pub fn distinct(self) -> Stream<Distinct<I>>
    where
        I::Item: Eq + Hash + Clone,
    {
        Stream::new(Distinct {
            iter: self.iter,
            seen: HashSet::new(),
        })
    }

    /// Combine all items with an associative function.
    ///
    /// Returns `None` for an empty stream.
    pub fn reduce<F>(self, func: F) -> Option<I::Item>
    where
        F: FnMut(I::Item, I::Item) -> I::Item,
    {
        self.iter.reduce(func)
    }

    /// Combine all items into `identity` with `func`.
    pub fn fold<B, F>(self, identity: B, func: F) -> B
    where
        F: FnMut(B, I::Item) -> B,
    {
        self.iter.fold(identity, func)
    }

    /// Run `func` on every item.
    pub fn for_each<F>(self, func: F)
    where
        F: FnMut(I::Item),
    {
        self.iter.for_each(func);
    }

    /// Gather the items into a collection.
    pub fn collect<C>(self) -> C
    where
        C: FromIterator<I::Item>,
    {
        self.iter.collect()
    }

    /// Count the items.
    pub fn count(self) -> usize {
        self.iter.count()
    }

    /// The smallest item, if any.
    pub fn min(self) -> Option<I::Item>
    where
        I::Item: Ord,
    {
        self.iter.min()
    }

    /// The largest item, if any.
    pub fn max(self) -> Option<I::Item>
    where
        I::Item: Ord,
    {
        self.iter.max()
    }

    /// Whether any item matches `predicate`.
    pub fn any_match<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.iter.any(predicate)
    }

    /// Whether every item matches `predicate`. True for an empty stream.
    pub fn all_match<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.iter.all(predicate)
    }
}

impl<T> Stream<vec::IntoIter<T>> {
    /// Build a stream over the items of any collection.
    pub fn of<C>(items: C) -> Self
    where
        C: IntoIterator<Item = T>,
    {
        Self::new(items.into_iter().collect::<Vec<_>>().into_iter())
    }

    /// A stream with no items.
    pub fn empty() -> Self {
        Self::new(Vec::new().into_iter())
    }
}

impl<I: Iterator> IntoIterator for Stream<I> {
    type Item = I::Item;
    type IntoIter = I;

    fn into_iter(self) -> I {
        self.iter
    }
}

/// Start a stream from anything iterable, without buffering it.
pub fn stream<C: IntoIterator>(items: C) -> Stream<C::IntoIter> {
    Stream::new(items.into_iter())
}

/// Iterator adapter behind [`Stream::distinct`].
pub struct Distinct<I: Iterator> {
    iter: I,
    seen: HashSet<I::Item>,
}

impl<I> Iterator for Distinct<I>
where
    I: Iterator,
    I::Item: Eq + Hash + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let seen = &mut self.seen;
        self.iter.find(|item| seen.insert(item.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}
