//! # Backing Arrays
//!
//! Growable collections of fixed-size byte slots. Every slot of an array has
//! the same width for the array's lifetime; growth only adds slots.

use super::element::{MappedElement, MappedElementMut};
use crate::config::PoolConfig;

/// A resizable array of fixed-size byte slots.
///
/// Slots are addressed by numeric index and accessed through
/// [`MappedElement`] views. Implementations decide how the bytes are laid
/// out (one buffer or many).
pub trait MappedElementArray {
    /// Creates an array of `num_elements` zeroed slots of
    /// `bytes_per_element` bytes each.
    fn with_len(num_elements: usize, bytes_per_element: usize) -> Self
    where
        Self: Sized;

    /// Creates an array sized for a pool configuration.
    ///
    /// Implementations with tunable layout (such as chunk sizes) read it from
    /// `config`; the default ignores it.
    fn with_config(num_elements: usize, bytes_per_element: usize, config: &PoolConfig) -> Self
    where
        Self: Sized,
    {
        let _ = config;
        Self::with_len(num_elements, bytes_per_element)
    }

    /// Number of slots.
    fn len(&self) -> usize;

    /// Whether the array holds no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest number of slots this array can address.
    fn max_len(&self) -> usize;

    /// Width of one slot in bytes.
    fn bytes_per_element(&self) -> usize;

    /// Resizes to `num_elements` slots, keeping the contents of surviving
    /// slots. New slots are zeroed.
    fn resize(&mut self, num_elements: usize);

    /// Read-only view of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn element(&self, index: usize) -> MappedElement<'_>;

    /// Read/write view of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn element_mut(&mut self, index: usize) -> MappedElementMut<'_>;

    /// Swaps the contents of two slots.
    fn swap_elements(&mut self, a: usize, b: usize);

    /// Copies the contents of slot `from` into slot `to`.
    fn copy_element(&mut self, from: usize, to: usize);
}

/// Backing array holding all slots in one contiguous buffer.
///
/// Growth reallocates and copies the buffer.
#[derive(Debug, Clone)]
pub struct SingleByteArray {
    data: Vec<u8>,
    bytes_per_element: usize,
}

impl SingleByteArray {
    #[inline]
    fn range(&self, index: usize) -> std::ops::Range<usize> {
        let start = index * self.bytes_per_element;
        start..start + self.bytes_per_element
    }

    /// The raw contiguous buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl MappedElementArray for SingleByteArray {
    fn with_len(num_elements: usize, bytes_per_element: usize) -> Self {
        assert!(bytes_per_element > 0, "Slot width must be greater than zero");
        Self {
            data: vec![0u8; num_elements * bytes_per_element],
            bytes_per_element,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len() / self.bytes_per_element
    }

    #[inline]
    fn max_len(&self) -> usize {
        isize::MAX as usize / self.bytes_per_element
    }

    #[inline]
    fn bytes_per_element(&self) -> usize {
        self.bytes_per_element
    }

    fn resize(&mut self, num_elements: usize) {
        self.data.resize(num_elements * self.bytes_per_element, 0);
    }

    #[inline]
    fn element(&self, index: usize) -> MappedElement<'_> {
        let range = self.range(index);
        MappedElement::new(&self.data[range])
    }

    #[inline]
    fn element_mut(&mut self, index: usize) -> MappedElementMut<'_> {
        let range = self.range(index);
        MappedElementMut::new(&mut self.data[range])
    }

    fn swap_elements(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let width = self.bytes_per_element;
        let (head, tail) = self.data.split_at_mut(hi * width);
        head[lo * width..(lo + 1) * width].swap_with_slice(&mut tail[..width]);
    }

    fn copy_element(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let src = self.range(from);
        self.data.copy_within(src, to * self.bytes_per_element);
    }
}
