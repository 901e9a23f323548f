//! # Record Layout
//!
//! Typed fields at fixed byte offsets inside a slot. Offsets are `const`, so a
//! record layout is computed once at compile time by chaining fields:
//!
//! ```rust,ignore
//! const X: DoubleField = DoubleField::at(0);
//! const ID: IntField = IntField::at(X.end());
//! const SIZE_IN_BYTES: usize = ID.end();
//! ```

use crate::error::{PoolError, PoolResult};
use crate::memory::{
    MappedElement, MappedElementMut, BOOLEAN_SIZE, BYTE_SIZE, DOUBLE_SIZE, FLOAT_SIZE, INDEX_SIZE,
    INT_SIZE, LONG_SIZE,
};

/// A typed value stored at a fixed offset of a slot.
pub trait Field: Copy {
    /// The value type read and written by this field.
    type Value;

    /// Byte offset of the field inside the slot.
    fn offset(self) -> usize;

    /// Reads the field.
    fn get(self, access: &MappedElement<'_>) -> Self::Value;

    /// Writes the field.
    fn put(self, access: &mut MappedElementMut<'_>, value: Self::Value);
}

macro_rules! scalar_field {
    ($(#[$doc:meta])* $name:ident, $value:ty, $width:expr, $get:ident, $put:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name {
            offset: usize,
        }

        impl $name {
            /// Places the field at `offset`.
            #[must_use]
            pub const fn at(offset: usize) -> Self {
                Self { offset }
            }

            /// First byte after the field.
            #[must_use]
            pub const fn end(self) -> usize {
                self.offset + $width
            }
        }

        impl Field for $name {
            type Value = $value;

            #[inline]
            fn offset(self) -> usize {
                self.offset
            }

            #[inline]
            fn get(self, access: &MappedElement<'_>) -> $value {
                access.$get(self.offset)
            }

            #[inline]
            fn put(self, access: &mut MappedElementMut<'_>, value: $value) {
                access.$put(value, self.offset);
            }
        }
    };
}

scalar_field!(
    /// A `u8` field.
    ByteField, u8, BYTE_SIZE, get_byte, put_byte
);
scalar_field!(
    /// A boolean field stored as one byte.
    BoolField, bool, BOOLEAN_SIZE, get_bool, put_bool
);
scalar_field!(
    /// An `i32` field.
    IntField, i32, INT_SIZE, get_int, put_int
);
scalar_field!(
    /// An `i64` field.
    LongField, i64, LONG_SIZE, get_long, put_long
);
scalar_field!(
    /// An `f32` field.
    FloatField, f32, FLOAT_SIZE, get_float, put_float
);
scalar_field!(
    /// An `f64` field.
    DoubleField, f64, DOUBLE_SIZE, get_double, put_double
);
scalar_field!(
    /// A 4-byte cross-reference to another slot. Negative means "none".
    IndexField, i32, INDEX_SIZE, get_index, put_index
);

impl IndexField {
    /// Stored value meaning "no slot".
    pub const NONE: i32 = -1;

    /// Reads the reference as a slot index, `None` for the negative sentinel.
    #[inline]
    #[must_use]
    pub fn get_slot(self, access: &MappedElement<'_>) -> Option<usize> {
        usize::try_from(access.get_index(self.offset)).ok()
    }

    /// Writes a slot index, or [`IndexField::NONE`] for `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::IndexOverflow`] if the slot does not fit in 31
    /// bits. Nothing is written.
    #[inline]
    pub fn put_slot(self, access: &mut MappedElementMut<'_>, slot: Option<usize>) -> PoolResult<()> {
        let raw = match slot {
            Some(s) => i32::try_from(s).map_err(|_| PoolError::IndexOverflow(s))?,
            None => Self::NONE,
        };
        access.put_index(raw, self.offset);
        Ok(())
    }
}

/// `N` consecutive `f64` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoubleArrayField<const N: usize> {
    offset: usize,
}

impl<const N: usize> DoubleArrayField<N> {
    /// Places the field at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self { offset }
    }

    /// First byte after the field.
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + N * DOUBLE_SIZE
    }

    /// Reads element `i`.
    #[inline]
    #[must_use]
    pub fn get_one(self, access: &MappedElement<'_>, i: usize) -> f64 {
        debug_assert!(i < N, "element {i} out of range for array of {N}");
        access.get_double(self.offset + i * DOUBLE_SIZE)
    }

    /// Writes element `i`.
    #[inline]
    pub fn put_one(self, access: &mut MappedElementMut<'_>, i: usize, value: f64) {
        debug_assert!(i < N, "element {i} out of range for array of {N}");
        access.put_double(value, self.offset + i * DOUBLE_SIZE);
    }
}

impl<const N: usize> Field for DoubleArrayField<N> {
    type Value = [f64; N];

    #[inline]
    fn offset(self) -> usize {
        self.offset
    }

    #[inline]
    fn get(self, access: &MappedElement<'_>) -> [f64; N] {
        std::array::from_fn(|i| access.get_double(self.offset + i * DOUBLE_SIZE))
    }

    #[inline]
    fn put(self, access: &mut MappedElementMut<'_>, value: [f64; N]) {
        for (i, v) in value.into_iter().enumerate() {
            access.put_double(v, self.offset + i * DOUBLE_SIZE);
        }
    }
}

/// Const builder that lays fields out back to back.
///
/// Each call returns the placed field and the builder advanced past it:
///
/// ```rust,ignore
/// const A: (DoubleField, Layout) = Layout::new().double();
/// const B: (IntField, Layout) = A.1.int();
/// const SIZE_IN_BYTES: usize = B.1.size();
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    next: usize,
}

macro_rules! layout_step {
    ($(#[$doc:meta])* $method:ident, $field:ident) => {
        $(#[$doc])*
        #[must_use]
        pub const fn $method(self) -> ($field, Self) {
            let field = $field::at(self.next);
            (field, Self { next: field.end() })
        }
    };
}

impl Layout {
    /// An empty layout starting at offset 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Total bytes laid out so far.
    #[must_use]
    pub const fn size(self) -> usize {
        self.next
    }

    layout_step!(
        /// Places a [`ByteField`].
        byte, ByteField
    );
    layout_step!(
        /// Places a [`BoolField`].
        boolean, BoolField
    );
    layout_step!(
        /// Places an [`IntField`].
        int, IntField
    );
    layout_step!(
        /// Places a [`LongField`].
        long, LongField
    );
    layout_step!(
        /// Places a [`FloatField`].
        float, FloatField
    );
    layout_step!(
        /// Places a [`DoubleField`].
        double, DoubleField
    );
    layout_step!(
        /// Places an [`IndexField`].
        index, IndexField
    );

    /// Places a [`DoubleArrayField`] of `N` values.
    #[must_use]
    pub const fn double_array<const N: usize>(self) -> (DoubleArrayField<N>, Self) {
        let field = DoubleArrayField::at(self.next);
        (field, Self { next: field.end() })
    }
}
