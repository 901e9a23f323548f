//! # Chunked Backing Array
//!
//! Slots are spread over several equally sized buffers. Growing appends
//! buffers and never moves bytes that are already stored, so very large pools
//! do not need one huge contiguous allocation.

use super::array::MappedElementArray;
use super::element::{MappedElement, MappedElementMut};
use crate::config::PoolConfig;

/// Default number of slots per buffer.
pub const DEFAULT_CHUNK_SLOTS: usize = 4096;

/// Backing array made of fixed-size buffers.
#[derive(Debug, Clone)]
pub struct ChunkedByteArray {
    chunks: Vec<Box<[u8]>>,
    chunk_slots: usize,
    bytes_per_element: usize,
    len: usize,
}

impl ChunkedByteArray {
    /// Creates an array of `num_elements` zeroed slots, `chunk_slots` slots
    /// per buffer.
    ///
    /// # Panics
    ///
    /// Panics if `bytes_per_element` or `chunk_slots` is zero.
    #[must_use]
    pub fn with_chunk_slots(num_elements: usize, bytes_per_element: usize, chunk_slots: usize) -> Self {
        assert!(bytes_per_element > 0, "Slot width must be greater than zero");
        assert!(chunk_slots > 0, "Chunk size must be greater than zero");
        let mut array = Self {
            chunks: Vec::new(),
            chunk_slots,
            bytes_per_element,
            len: 0,
        };
        array.resize(num_elements);
        array
    }

    /// Number of buffers currently held.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        assert!(index < self.len, "Slot {index} out of bounds (len {})", self.len);
        let chunk = index / self.chunk_slots;
        let start = (index % self.chunk_slots) * self.bytes_per_element;
        (chunk, start)
    }
}

impl MappedElementArray for ChunkedByteArray {
    fn with_len(num_elements: usize, bytes_per_element: usize) -> Self {
        Self::with_chunk_slots(num_elements, bytes_per_element, DEFAULT_CHUNK_SLOTS)
    }

    fn with_config(num_elements: usize, bytes_per_element: usize, config: &PoolConfig) -> Self {
        Self::with_chunk_slots(num_elements, bytes_per_element, config.chunk_slots)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
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
        let needed_chunks = num_elements.div_ceil(self.chunk_slots);
        let chunk_bytes = self.chunk_slots * self.bytes_per_element;
        if num_elements > self.len {
            // Slots past the old length may hold bytes from before a shrink.
            let old_len = self.len;
            let kept = self.chunks.len() * self.chunk_slots;
            self.len = num_elements.min(kept);
            for index in old_len..self.len {
                self.element_mut(index).zero();
            }
            while self.chunks.len() < needed_chunks {
                self.chunks.push(vec![0u8; chunk_bytes].into_boxed_slice());
            }
        } else {
            self.chunks.truncate(needed_chunks);
        }
        self.len = num_elements;
    }

    #[inline]
    fn element(&self, index: usize) -> MappedElement<'_> {
        let (chunk, start) = self.locate(index);
        MappedElement::new(&self.chunks[chunk][start..start + self.bytes_per_element])
    }

    #[inline]
    fn element_mut(&mut self, index: usize) -> MappedElementMut<'_> {
        let (chunk, start) = self.locate(index);
        let width = self.bytes_per_element;
        MappedElementMut::new(&mut self.chunks[chunk][start..start + width])
    }

    fn swap_elements(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let width = self.bytes_per_element;
        let (ca, sa) = self.locate(a);
        let (cb, sb) = self.locate(b);
        if ca == cb {
            let (lo, hi) = if sa < sb { (sa, sb) } else { (sb, sa) };
            let (head, tail) = self.chunks[ca].split_at_mut(hi);
            head[lo..lo + width].swap_with_slice(&mut tail[..width]);
        } else {
            let ((c_lo, s_lo), (c_hi, s_hi)) = if ca < cb { ((ca, sa), (cb, sb)) } else { ((cb, sb), (ca, sa)) };
            let (head, tail) = self.chunks.split_at_mut(c_hi);
            head[c_lo][s_lo..s_lo + width].swap_with_slice(&mut tail[0][s_hi..s_hi + width]);
        }
    }

    fn copy_element(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let width = self.bytes_per_element;
        let (cf, sf) = self.locate(from);
        let (ct, st) = self.locate(to);
        if cf == ct {
            self.chunks[cf].copy_within(sf..sf + width, st);
        } else if cf < ct {
            let (head, tail) = self.chunks.split_at_mut(ct);
            tail[0][st..st + width].copy_from_slice(&head[cf][sf..sf + width]);
        } else {
            let (head, tail) = self.chunks.split_at_mut(cf);
            head[ct][st..st + width].copy_from_slice(&tail[0][sf..sf + width]);
        }
    }
}
