//! Append-only growable buffers.
//!
//! `GrowBuf<T>` is a contiguous sequence with an explicit capacity policy:
//! an empty buffer owns no allocation, the first growth reserves
//! [`DEFAULT_CAPACITY`] slots, and every later growth doubles the capacity
//! until the requested count fits. This keeps the number of reallocations
//! logarithmic in the number of appended items.
//!
//! Running out of memory while growing is not recoverable here. The process
//! prints a diagnostic and aborts.

use std::fmt;

/// Capacity reserved by the first growth of an empty buffer.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A growable, append-only buffer with doubling growth.
#[derive(PartialEq, Eq)]
pub struct GrowBuf<T> {
    items: Vec<T>,
    capacity: usize,
    reallocations: usize,
}

impl<T> Default for GrowBuf<T> {
    fn default() -> Self {
        GrowBuf {
            items: Vec::new(),
            capacity: 0,
            reallocations: 0,
        }
    }
}

/// A clone owns the same capacity as the original, so it grows at the same
/// points.
impl<T: Clone> Clone for GrowBuf<T> {
    fn clone(&self) -> Self {
        let mut items = Vec::new();
        if items.try_reserve_exact(self.capacity).is_err() {
            out_of_memory();
        }
        items.extend_from_slice(&self.items);
        GrowBuf {
            items,
            capacity: self.capacity,
            reallocations: self.reallocations,
        }
    }
}

impl<T> GrowBuf<T> {
    /// Create an empty buffer. No memory is allocated until the first append.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single item.
    pub fn append(&mut self, item: T) {
        self.reserve_for(1);
        self.items.push(item);
    }

    /// Append every item yielded by `iter`, in order.
    pub fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_for(lower);
        for item in iter {
            self.append(item);
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated capacity according to the growth policy.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the backing storage has been grown.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Drop all items but keep the allocation for reuse.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// View the stored items.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the stored items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Make room for `additional` more items, growing by doubling.
    fn reserve_for(&mut self, additional: usize) {
        let needed = match self.items.len().checked_add(additional) {
            Some(n) => n,
            None => out_of_memory(),
        };
        if needed <= self.capacity {
            return;
        }

        let mut new_cap = if self.capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            self.capacity
        };
        while new_cap < needed {
            new_cap = match new_cap.checked_mul(2) {
                Some(n) => n,
                None => out_of_memory(),
            };
        }

        if self
            .items
            .try_reserve_exact(new_cap - self.items.len())
            .is_err()
        {
            out_of_memory();
        }
        self.capacity = new_cap;
        self.reallocations += 1;
    }
}

impl<T: Clone> GrowBuf<T> {
    /// Append a slice of items, preserving their order.
    pub fn append_many(&mut self, items: &[T]) {
        self.reserve_for(items.len());
        self.items.extend_from_slice(items);
    }
}

impl<T> std::ops::Deref for GrowBuf<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a GrowBuf<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for GrowBuf<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = GrowBuf::new();
        buf.extend(iter);
        buf
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowBuf")
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// A growable byte buffer, used to assemble strings.
pub type ByteBuf = GrowBuf<u8>;

impl GrowBuf<u8> {
    /// Append the raw bytes of `s` (without a terminator).
    pub fn append_str(&mut self, s: &str) {
        self.append_many(s.as_bytes());
    }

    /// Append a single NUL terminator byte.
    pub fn append_null(&mut self) {
        self.append(0);
    }

    /// View the contents as text, excluding a trailing NUL terminator.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        let bytes = match self.items.split_last() {
            Some((0, rest)) => rest,
            _ => &self.items[..],
        };
        String::from_utf8_lossy(bytes)
    }
}

#[cold]
fn out_of_memory() -> ! {
    eprintln!("error: not enough memory to grow buffer");
    std::process::abort()
}
