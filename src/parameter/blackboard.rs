use crate::parameter::{
    Endianness, RangeError, SyncError,
    helpers::{block_span, range_span},
    slice::{ROSlice, RWSlice},
};

/// Object-safe access to a blackboard image.
///
/// Parameter nodes and sync hooks only see blackboards through this trait,
/// so configuration areas of a different size can be accessed with the
/// same node code as the main image.
///
/// Offsets and sizes are always derived from the tree layout. Reading or
/// writing outside the image is a contract violation and panics.
pub trait BlackboardAccess {
    /// Size of the image in bytes.
    fn size(&self) -> usize;

    /// Reads a `size`-byte integer at `offset` stored in `endianness` order.
    fn read_integer(&self, size: usize, offset: usize, endianness: Endianness) -> u32;

    /// Writes the low `size` bytes of `value` at `offset` and marks them dirty.
    fn write_integer(&mut self, value: u32, size: usize, offset: usize, endianness: Endianness);

    /// Writes like [`write_integer`](Self::write_integer) without marking dirty.
    fn load_integer(&mut self, value: u32, size: usize, offset: usize, endianness: Endianness);

    /// Returns true if any block has been written since the last clear.
    fn any_dirty(&self) -> bool;

    /// Visits each dirty block in ascending address order.
    fn for_each_dirty(
        &self,
        f: &mut dyn FnMut(usize, ROSlice<'_>) -> Result<(), SyncError>,
    ) -> Result<(), SyncError>;

    /// Clears all dirty flags.
    fn clear_dirty(&mut self);
}

/// Byte-exact image of the parameter space.
///
/// # Const Generics
/// - `TS`: Total size of the image in bytes
/// - `BS`: Block size in bytes for dirty tracking granularity
/// - `BC`: Block count (must equal `TS / BS`)
pub struct Blackboard<const TS: usize, const BS: usize, const BC: usize>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    bytes: [u8; TS],
    dirty: bitmaps::Bitmap<BC>,
}

impl<const TS: usize, const BS: usize, const BC: usize> core::fmt::Debug for Blackboard<TS, BS, BC>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Blackboard")
            .field("size", &TS)
            .field("dirty_blocks", &self.dirty.len())
            .finish_non_exhaustive()
    }
}

impl<const TS: usize, const BS: usize, const BC: usize> Default for Blackboard<TS, BS, BC>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const TS: usize, const BS: usize, const BC: usize> Blackboard<TS, BS, BC>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    pub fn new() -> Self {
        debug_assert!(
            TS == BS * BC,
            "Total size must match block size x block count",
        );

        Self {
            bytes: [0; TS],
            dirty: bitmaps::Bitmap::new(),
        }
    }

    /// Returns the whole image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Provides read access to `len` bytes at `offset`.
    pub fn with_ro_slice<F, R>(&self, offset: usize, len: usize, f: F) -> Result<R, RangeError>
    where
        F: FnOnce(ROSlice<'_>) -> R,
    {
        let (start, end) = range_span::<TS>(offset, len)?;
        Ok(f(ROSlice::new(&self.bytes[start..end])))
    }

    /// Provides read-write access to `len` bytes at `offset`, optionally marking them dirty.
    pub fn with_rw_slice<F, R>(&mut self, offset: usize, len: usize, f: F) -> Result<R, RangeError>
    where
        F: FnOnce(RWSlice<'_>) -> (bool, R),
    {
        let (start, end) = range_span::<TS>(offset, len)?;
        let (dirty, result) = f(RWSlice::new(&mut self.bytes[start..end]));
        if dirty {
            self.mark_dirty(offset, len)?;
        }
        Ok(result)
    }

    pub fn is_dirty(&self, offset: usize, len: usize) -> Result<bool, RangeError> {
        let (sb, eb) = block_span::<TS, BS, BC>(offset, len)?;
        Ok((sb..=eb).any(|block| self.dirty.get(block)))
    }

    pub fn mark_dirty(&mut self, offset: usize, len: usize) -> Result<(), RangeError> {
        let (sb, eb) = block_span::<TS, BS, BC>(offset, len)?;
        self.set_dirty_blocks(sb, eb);
        Ok(())
    }

    fn set_dirty_blocks(&mut self, first: usize, last: usize) {
        for block in first..=last {
            self.dirty.set(block, true);
        }
    }

    fn store(&mut self, value: u32, size: usize, offset: usize, endianness: Endianness) {
        RWSlice::new(&mut self.bytes).write_uint_at(offset, size, value, endianness);
    }
}

impl<const TS: usize, const BS: usize, const BC: usize> BlackboardAccess for Blackboard<TS, BS, BC>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    #[inline]
    fn size(&self) -> usize {
        TS
    }

    fn read_integer(&self, size: usize, offset: usize, endianness: Endianness) -> u32 {
        ROSlice::new(&self.bytes).read_uint_at(offset, size, endianness)
    }

    fn write_integer(&mut self, value: u32, size: usize, offset: usize, endianness: Endianness) {
        self.store(value, size, offset, endianness);
        self.set_dirty_blocks(offset / BS, (offset + size - 1) / BS);
    }

    fn load_integer(&mut self, value: u32, size: usize, offset: usize, endianness: Endianness) {
        self.store(value, size, offset, endianness);
    }

    fn any_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn for_each_dirty(
        &self,
        f: &mut dyn FnMut(usize, ROSlice<'_>) -> Result<(), SyncError>,
    ) -> Result<(), SyncError> {
        let mut idx = self.dirty.first_index();
        while let Some(block) = idx {
            let off = block * BS;
            f(off, ROSlice::new(&self.bytes[off..(off + BS)]))?;
            idx = self.dirty.next_index(block);
        }
        Ok(())
    }

    fn clear_dirty(&mut self) {
        self.dirty = bitmaps::Bitmap::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 16-byte image, 4-byte blocks, 4 dirty blocks
    type TestBlackboard = Blackboard<16, 4, 4>;

    #[test]
    fn new_blackboard_is_zeroed_and_clean() {
        let bb = TestBlackboard::new();
        assert_eq!(bb.as_bytes(), &[0u8; 16]);
        assert!(!bb.any_dirty());
        assert_eq!(bb.size(), 16);
    }

    #[test]
    fn big_endian_target_stores_most_significant_byte_first() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0x0102, 2, 4, Endianness::Big);
        assert_eq!(bb.as_bytes()[4..6], [0x01, 0x02]);
        assert_eq!(bb.read_integer(2, 4, Endianness::Big), 0x0102);
    }

    #[test]
    fn little_endian_target_stores_least_significant_byte_first() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0x0102, 2, 4, Endianness::Little);
        assert_eq!(bb.as_bytes()[4..6], [0x02, 0x01]);
        assert_eq!(bb.read_integer(2, 4, Endianness::Little), 0x0102);
    }

    #[test]
    fn write_marks_spanned_blocks_dirty() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0xDEADBEEF, 4, 6, Endianness::Little);

        assert!(bb.any_dirty());
        assert!(!bb.is_dirty(0, 4).unwrap());
        assert!(bb.is_dirty(4, 4).unwrap());
        assert!(bb.is_dirty(8, 4).unwrap());
        assert!(!bb.is_dirty(12, 4).unwrap());
    }

    #[test]
    fn write_marks_only_the_blocks_it_touches() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0xAB, 1, 15, Endianness::Little);
        bb.write_integer(0x1234, 2, 3, Endianness::Big);

        assert!(bb.is_dirty(0, 4).unwrap());
        assert!(bb.is_dirty(4, 4).unwrap());
        assert!(!bb.is_dirty(8, 4).unwrap());
        assert!(bb.is_dirty(15, 1).unwrap());
    }

    #[test]
    fn load_does_not_mark_dirty() {
        let mut bb = TestBlackboard::new();
        bb.load_integer(0x7F, 1, 0, Endianness::Little);

        assert_eq!(bb.as_bytes()[0], 0x7F);
        assert!(!bb.any_dirty());
    }

    #[test]
    fn for_each_dirty_visits_blocks_in_order() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0xAA, 1, 13, Endianness::Little);
        bb.write_integer(0xBB, 1, 1, Endianness::Little);

        let mut seen = [(0usize, 0u8); 2];
        let mut count = 0;
        bb.for_each_dirty(&mut |addr, slice| {
            seen[count] = (addr, slice.read_u8_at(addr % 4));
            count += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, [(0, 0xBB), (12, 0xAA)]);

        bb.clear_dirty();
        assert!(!bb.any_dirty());
    }

    #[test]
    fn for_each_dirty_stops_on_error() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(1, 1, 0, Endianness::Little);
        bb.write_integer(1, 1, 8, Endianness::Little);

        let mut calls = 0;
        let result = bb.for_each_dirty(&mut |_, _| {
            calls += 1;
            Err(SyncError::new("link down"))
        });

        assert_eq!(result, Err(SyncError::new("link down")));
        assert_eq!(calls, 1);
    }

    #[test]
    fn slice_access_errors() {
        let mut bb = TestBlackboard::new();

        assert_eq!(bb.with_ro_slice(0, 0, |_| ()), Err(RangeError::ZeroLength));
        assert_eq!(bb.with_ro_slice(14, 4, |_| ()), Err(RangeError::OutOfBounds));
        assert_eq!(
            bb.with_rw_slice(14, 4, |_| (true, ())),
            Err(RangeError::OutOfBounds)
        );
    }

    #[test]
    fn rw_slice_marks_dirty_on_request() {
        let mut bb = TestBlackboard::new();

        bb.with_rw_slice(0, 4, |mut slice| {
            slice.write_u32_le_at(0, 0x11223344);
            (false, ())
        })
        .unwrap();
        assert!(!bb.any_dirty());

        bb.with_rw_slice(8, 2, |mut slice| {
            slice.write_u16_be_at(0, 0x5566);
            (true, ())
        })
        .unwrap();
        assert!(bb.is_dirty(8, 1).unwrap());
        assert_eq!(bb.as_bytes()[..4], [0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    #[should_panic(expected = "write out of bounds")]
    fn write_past_end_is_contract_violation() {
        let mut bb = TestBlackboard::new();
        bb.write_integer(0, 4, 14, Endianness::Little);
    }
}
