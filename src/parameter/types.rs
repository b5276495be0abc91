/// Byte order of the subsystem the blackboard image mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Maps a "subsystem is big endian" flag to a byte order.
    #[inline]
    pub fn from_big_endian(big_endian: bool) -> Self {
        if big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    #[inline]
    pub fn is_big(self) -> bool {
        matches!(self, Endianness::Big)
    }
}

/// How textual values are interpreted on input and produced on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueSpace {
    /// Human-readable values in the type's domain (literals, decimals, ...).
    #[default]
    Real,
    /// Raw blackboard integers, only checked against the storage size.
    Raw,
}

/// Number formatting used when producing raw-space text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputRawFormat {
    #[default]
    Decimal,
    /// Zero-padded `0x` notation, two digits per storage byte.
    Hexadecimal,
}
