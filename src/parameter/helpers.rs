//! Utility functions for offset, block and raw-width calculations.
//!
//! These helpers are shared by the blackboard and the type layer, and are
//! useful when implementing a custom [`SyncHook`](crate::parameter::SyncHook)
//! that needs to reason about dirty block boundaries.

use crate::parameter::RangeError;

/// Calculates which blocks are spanned by a byte range.
///
/// Returns the inclusive range `(start_block, end_block)` for the given
/// offset and length, or an error if the range is invalid.
///
/// # Type Parameters
/// * `TS` - Total size of the blackboard
/// * `BS` - Block size in bytes
/// * `BC` - Block count
///
/// # Example
/// ```
/// use parameter_blackboard::parameter::helpers::block_span;
///
/// // 64-byte image, 16-byte blocks, 4 blocks
/// let (start, end) = block_span::<64, 16, 4>(14, 4).unwrap();
/// assert_eq!((start, end), (0, 1));
/// ```
pub fn block_span<const TS: usize, const BS: usize, const BC: usize>(
    offset: usize,
    len: usize,
) -> Result<(usize, usize), RangeError> {
    let (start, end) = range_span::<TS>(offset, len)?;
    let sb = start / BS;
    let eb = (end - 1) / BS; // inclusive

    if eb >= BC {
        return Err(RangeError::OutOfBounds);
    }

    Ok((sb, eb))
}

/// Calculates the byte range `(start, end)` for an offset and length, end exclusive.
///
/// # Errors
/// * [`RangeError::ZeroLength`] - if `len` is 0
/// * [`RangeError::OutOfBounds`] - if the range exceeds `TS`
pub fn range_span<const TS: usize>(
    offset: usize,
    len: usize,
) -> Result<(usize, usize), RangeError> {
    if len == 0 {
        return Err(RangeError::ZeroLength);
    }

    let end = offset.checked_add(len).ok_or(RangeError::OutOfBounds)?;

    if end > TS {
        return Err(RangeError::OutOfBounds);
    }

    Ok((offset, end))
}

/// Mask selecting the low `size` bytes of a raw value.
#[inline]
pub const fn raw_mask(size: usize) -> u32 {
    if size >= 4 {
        u32::MAX
    } else {
        (1u32 << (size * 8)) - 1
    }
}

/// Sign-extends the low `size` bytes of `raw` to a full `i32`.
#[inline]
pub const fn sign_extend(raw: u32, size: usize) -> i32 {
    let shift = 32 - (size as u32) * 8;
    ((raw << shift) as i32) >> shift
}
