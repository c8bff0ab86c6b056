//! Owned ordered container used for property records and method tables
//!
//! Keeps the append / remove / destroy contract of an intrusive list while
//! owning its elements outright: removing an element hands it back to the
//! caller, destroying drops every element in insertion order.

use crate::error::JyResult;

/// Insertion-ordered, owning list.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedList<T> {
    items: Vec<T>,
}

impl<T> OrderedList<T> {
    /// Create an empty list
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append at the tail, reporting allocation failure
    pub fn try_append(&mut self, item: T) -> JyResult<()> {
        self.items.try_reserve(1)?;
        self.items.push(item);
        Ok(())
    }

    /// Append at the tail
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove and return the element at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove and return the first element matching `pred`
    pub fn remove_first(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(pred)?;
        Some(self.items.remove(index))
    }

    /// Drop every element, head first
    pub fn destroy(&mut self) {
        for item in self.items.drain(..) {
            drop(item);
        }
    }

    /// First element matching `pred`
    pub fn find(&self, pred: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.items.iter().find(pred)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
