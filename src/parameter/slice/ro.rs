use super::macros::{impl_read_primitive, impl_read_primitives, impl_slice_common, impl_slice_ro};

/// Read-only view over a region of the blackboard.
///
/// Handed to sync hooks for each dirty block and used by the blackboard
/// itself to decode parameter values.
#[derive(Debug, Clone, Copy)]
pub struct ROSlice<'a>(&'a [u8]);

impl<'a> ROSlice<'a> {
    /// Creates a new read-only slice wrapper.
    #[inline]
    pub fn new(slice: &'a [u8]) -> Self {
        Self(slice)
    }

    /// Returns the underlying bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    impl_slice_common!();
    impl_slice_ro!();
}
