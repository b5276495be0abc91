/// Generates read method(s) for a single primitive type.
macro_rules! impl_read_primitive {
    // Single byte - no endianness suffix
    (u8) => {
        /// Reads a `u8` at the given offset.
        ///
        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn read_u8_at(&self, offset: usize) -> u8 {
            self.0[offset]
        }
    };
    // Multi-byte types - le/be variants
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Reads a little-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<read_ $type _le_at>](&self, offset: usize) -> $type {
                <$type>::from_le_bytes(self.0[offset..offset + $size].try_into().unwrap())
            }

            #[doc = "Reads a big-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<read_ $type _be_at>](&self, offset: usize) -> $type {
                <$type>::from_be_bytes(self.0[offset..offset + $size].try_into().unwrap())
            }
        }
    };
}

/// Generates read methods for the integer widths a parameter can occupy.
macro_rules! impl_read_primitives {
    () => {
        impl_read_primitive!(u8);
        impl_read_primitive!(u16, 2);
        impl_read_primitive!(u32, 4);

        /// Reads a `size`-byte unsigned integer at `offset` in the given byte order.
        ///
        /// # Panics
        /// Panics if `size` is not 1, 2 or 4, or if `offset + size > len()`.
        #[inline]
        pub fn read_uint_at(
            &self,
            offset: usize,
            size: usize,
            endianness: $crate::parameter::Endianness,
        ) -> u32 {
            assert!(
                offset + size <= self.0.len(),
                "read out of bounds: offset {} + size {} > len {}",
                offset,
                size,
                self.0.len()
            );
            match (size, endianness) {
                (1, _) => u32::from(self.read_u8_at(offset)),
                (2, $crate::parameter::Endianness::Little) => {
                    u32::from(self.read_u16_le_at(offset))
                }
                (2, $crate::parameter::Endianness::Big) => u32::from(self.read_u16_be_at(offset)),
                (4, $crate::parameter::Endianness::Little) => self.read_u32_le_at(offset),
                (4, $crate::parameter::Endianness::Big) => self.read_u32_be_at(offset),
                _ => panic!("unsupported integer size {}", size),
            }
        }
    };
}

/// Generates write method(s) for a single primitive type.
macro_rules! impl_write_primitive {
    // Single byte - no endianness suffix
    (u8) => {
        /// Writes a `u8` at the given offset.
        ///
        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn write_u8_at(&mut self, offset: usize, value: u8) {
            self.0[offset] = value;
        }
    };
    // Multi-byte types - le/be variants
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Writes a little-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<write_ $type _le_at>](&mut self, offset: usize, value: $type) {
                self.0[offset..offset + $size].copy_from_slice(&value.to_le_bytes());
            }

            #[doc = "Writes a big-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<write_ $type _be_at>](&mut self, offset: usize, value: $type) {
                self.0[offset..offset + $size].copy_from_slice(&value.to_be_bytes());
            }
        }
    };
}

/// Generates write methods for the integer widths a parameter can occupy.
macro_rules! impl_write_primitives {
    () => {
        impl_write_primitive!(u8);
        impl_write_primitive!(u16, 2);
        impl_write_primitive!(u32, 4);

        /// Writes the low `size` bytes of `value` at `offset` in the given byte order.
        ///
        /// # Panics
        /// Panics if `size` is not 1, 2 or 4, or if `offset + size > len()`.
        #[inline]
        pub fn write_uint_at(
            &mut self,
            offset: usize,
            size: usize,
            value: u32,
            endianness: $crate::parameter::Endianness,
        ) {
            assert!(
                offset + size <= self.0.len(),
                "write out of bounds: offset {} + size {} > len {}",
                offset,
                size,
                self.0.len()
            );
            match (size, endianness) {
                (1, _) => self.write_u8_at(offset, value as u8),
                (2, $crate::parameter::Endianness::Little) => {
                    self.write_u16_le_at(offset, value as u16)
                }
                (2, $crate::parameter::Endianness::Big) => {
                    self.write_u16_be_at(offset, value as u16)
                }
                (4, $crate::parameter::Endianness::Little) => self.write_u32_le_at(offset, value),
                (4, $crate::parameter::Endianness::Big) => self.write_u32_be_at(offset, value),
                _ => panic!("unsupported integer size {}", size),
            }
        }
    };
}

/// Generates common slice methods (len, is_empty).
macro_rules! impl_slice_common {
    () => {
        /// Returns the length of the slice.
        #[inline]
        pub fn len(&self) -> usize {
            self.0.len()
        }

        /// Returns true if the slice is empty.
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    };
}

/// Generates read-only slice methods (copy_to_slice, read primitives).
macro_rules! impl_slice_ro {
    () => {
        /// Copies the entire slice to the destination buffer.
        ///
        /// # Panics
        /// Panics if destination length doesn't match slice length.
        #[inline]
        pub fn copy_to_slice(&self, dest: &mut [u8]) {
            dest.copy_from_slice(&self.0[..]);
        }

        impl_read_primitives!();
    };
}

/// Generates write slice methods (fill, write primitives).
macro_rules! impl_slice_wo {
    () => {
        /// Fills the entire slice with the given value.
        #[inline]
        pub fn fill(&mut self, value: u8) {
            self.0.fill(value);
        }

        impl_write_primitives!();
    };
}

pub(super) use impl_read_primitive;
pub(super) use impl_read_primitives;
pub(super) use impl_slice_common;
pub(super) use impl_slice_ro;
pub(super) use impl_slice_wo;
pub(super) use impl_write_primitive;
pub(super) use impl_write_primitives;
