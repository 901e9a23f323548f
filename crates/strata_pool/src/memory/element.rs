//! # Mapped Elements
//!
//! A mapped element is a view of one fixed-size slot inside a backing array.
//! Primitive values are read and written at byte offsets relative to the
//! start of the slot, in native byte order.
//!
//! Views are created on demand from an array and dropped immediately, so
//! "rebinding" an accessor to another slot costs nothing.

use bytemuck::Pod;

/// Size of a byte field.
pub const BYTE_SIZE: usize = 1;
/// Size of a boolean field.
pub const BOOLEAN_SIZE: usize = 1;
/// Size of an `i32` field.
pub const INT_SIZE: usize = 4;
/// Size of an `i64` field.
pub const LONG_SIZE: usize = 8;
/// Size of an `f32` field.
pub const FLOAT_SIZE: usize = 4;
/// Size of an `f64` field.
pub const DOUBLE_SIZE: usize = 8;
/// Size of a cross-reference (slot index) field.
pub const INDEX_SIZE: usize = 4;

#[inline]
fn read<T: Pod>(bytes: &[u8], offset: usize) -> T {
    bytemuck::pod_read_unaligned(&bytes[offset..offset + std::mem::size_of::<T>()])
}

#[inline]
fn write<T: Pod>(bytes: &mut [u8], offset: usize, value: T) {
    bytes[offset..offset + std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
}

macro_rules! getters {
    () => {
        /// Number of bytes in the slot.
        #[inline]
        #[must_use]
        pub fn len(&self) -> usize {
            self.bytes.len()
        }

        /// Whether the slot is zero-sized.
        #[inline]
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.bytes.is_empty()
        }

        /// Raw bytes of the slot.
        #[inline]
        #[must_use]
        pub fn as_bytes(&self) -> &[u8] {
            &*self.bytes
        }

        /// Reads the byte at `offset`.
        #[inline]
        #[must_use]
        pub fn get_byte(&self, offset: usize) -> u8 {
            self.bytes[offset]
        }

        /// Reads a boolean stored as one byte at `offset`.
        #[inline]
        #[must_use]
        pub fn get_bool(&self, offset: usize) -> bool {
            self.bytes[offset] != 0
        }

        /// Reads an `i32` at `offset`.
        #[inline]
        #[must_use]
        pub fn get_int(&self, offset: usize) -> i32 {
            read(&*self.bytes, offset)
        }

        /// Reads an `i64` at `offset`.
        #[inline]
        #[must_use]
        pub fn get_long(&self, offset: usize) -> i64 {
            read(&*self.bytes, offset)
        }

        /// Reads an `f32` at `offset`.
        #[inline]
        #[must_use]
        pub fn get_float(&self, offset: usize) -> f32 {
            read(&*self.bytes, offset)
        }

        /// Reads an `f64` at `offset`.
        #[inline]
        #[must_use]
        pub fn get_double(&self, offset: usize) -> f64 {
            read(&*self.bytes, offset)
        }

        /// Reads a 4-byte cross-reference at `offset`.
        ///
        /// Negative values are "no reference" sentinels. Any scaling of the
        /// stored value (e.g. by an element stride) is up to the caller.
        #[inline]
        #[must_use]
        pub fn get_index(&self, offset: usize) -> i32 {
            read(&*self.bytes, offset)
        }
    };
}

/// Read-only view of one slot.
///
/// # Panics
///
/// Every accessor panics if `offset + width` exceeds the slot size.
#[derive(Clone, Copy, Debug)]
pub struct MappedElement<'a> {
    bytes: &'a [u8],
}

impl<'a> MappedElement<'a> {
    /// Wraps the bytes of one slot.
    #[inline]
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    getters!();
}

/// Read/write view of one slot.
///
/// # Panics
///
/// Every accessor panics if `offset + width` exceeds the slot size.
#[derive(Debug)]
pub struct MappedElementMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MappedElementMut<'a> {
    /// Wraps the bytes of one slot.
    #[inline]
    #[must_use]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    getters!();

    /// Reborrows as a read-only view.
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> MappedElement<'_> {
        MappedElement::new(&*self.bytes)
    }

    /// Overwrites the whole slot with zeros.
    #[inline]
    pub fn zero(&mut self) {
        self.bytes.fill(0);
    }

    /// Writes a byte at `offset`.
    #[inline]
    pub fn put_byte(&mut self, value: u8, offset: usize) {
        self.bytes[offset] = value;
    }

    /// Writes a boolean as one byte at `offset`.
    #[inline]
    pub fn put_bool(&mut self, value: bool, offset: usize) {
        self.bytes[offset] = u8::from(value);
    }

    /// Writes an `i32` at `offset`.
    #[inline]
    pub fn put_int(&mut self, value: i32, offset: usize) {
        write(&mut *self.bytes, offset, value);
    }

    /// Writes an `i64` at `offset`.
    #[inline]
    pub fn put_long(&mut self, value: i64, offset: usize) {
        write(&mut *self.bytes, offset, value);
    }

    /// Writes an `f32` at `offset`.
    #[inline]
    pub fn put_float(&mut self, value: f32, offset: usize) {
        write(&mut *self.bytes, offset, value);
    }

    /// Writes an `f64` at `offset`.
    #[inline]
    pub fn put_double(&mut self, value: f64, offset: usize) {
        write(&mut *self.bytes, offset, value);
    }

    /// Writes a 4-byte cross-reference at `offset`.
    #[inline]
    pub fn put_index(&mut self, value: i32, offset: usize) {
        write(&mut *self.bytes, offset, value);
    }
}
