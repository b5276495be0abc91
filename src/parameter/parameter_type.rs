//! Shared type metadata and the conversions between text, host values and
//! raw blackboard integers.
//!
//! A [`ParameterType`] is declared once in a tree and referenced by any
//! number of parameter nodes. Encoding (`to_blackboard_*`) validates against
//! the type's domain and never produces a value wider than the storage size.
//! Text decoding is total: every bit pattern of the storage size renders.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::{fmt::Write, num::IntErrorKind};

use crate::parameter::{
    AccessError, OutputRawFormat, SchemaError, ValueSpace,
    helpers::{raw_mask, sign_extend},
};

/// One literal of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLiteral {
    literal: String,
    numerical: i32,
}

impl EnumLiteral {
    pub fn new(literal: impl Into<String>, numerical: i32) -> Self {
        Self {
            literal: literal.into(),
            numerical,
        }
    }

    #[inline]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    #[inline]
    pub fn numerical(&self) -> i32 {
        self.numerical
    }
}

/// Element kinds a parameter type can describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Boolean,
    UnsignedInteger { min: u32, max: u32 },
    SignedInteger { min: i32, max: i32 },
    /// Signed Qn.m: one sign bit, `integral` bits, `fractional` bits.
    FixedPoint { integral: u8, fractional: u8 },
    Enum { literals: Vec<EnumLiteral> },
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Boolean => "Boolean",
            TypeKind::UnsignedInteger { .. } => "UnsignedInteger",
            TypeKind::SignedInteger { .. } => "SignedInteger",
            TypeKind::FixedPoint { .. } => "FixedPoint",
            TypeKind::Enum { .. } => "Enum",
        }
    }
}

/// Immutable description of a parameter's storage and domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterType {
    name: String,
    kind: TypeKind,
    size: usize,
    array_length: usize,
    default_value: Option<u32>,
}

impl ParameterType {
    fn with_kind(name: impl Into<String>, kind: TypeKind, size: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            array_length: 0,
            default_value: None,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Boolean, 1)
    }

    /// Unsigned integer spanning the full range of `size` bytes.
    pub fn unsigned_integer(name: impl Into<String>, size: usize) -> Self {
        let max = raw_mask(size);
        Self::with_kind(name, TypeKind::UnsignedInteger { min: 0, max }, size)
    }

    /// Signed integer spanning the full two's complement range of `size` bytes.
    pub fn signed_integer(name: impl Into<String>, size: usize) -> Self {
        let max = (raw_mask(size) >> 1) as i32;
        Self::with_kind(
            name,
            TypeKind::SignedInteger { min: -max - 1, max },
            size,
        )
    }

    pub fn fixed_point(name: impl Into<String>, size: usize, integral: u8, fractional: u8) -> Self {
        Self::with_kind(
            name,
            TypeKind::FixedPoint {
                integral,
                fractional,
            },
            size,
        )
    }

    pub fn enumeration<'a>(
        name: impl Into<String>,
        size: usize,
        literals: impl IntoIterator<Item = (&'a str, i32)>,
    ) -> Self {
        let literals = literals
            .into_iter()
            .map(|(literal, numerical)| EnumLiteral::new(literal, numerical))
            .collect();
        Self::with_kind(name, TypeKind::Enum { literals }, size)
    }

    /// Narrows an integer type's admitted range. Ignored by other kinds.
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        match &mut self.kind {
            TypeKind::UnsignedInteger { min: lo, max: hi } => {
                *lo = min.clamp(0, i64::from(u32::MAX)) as u32;
                *hi = max.clamp(0, i64::from(u32::MAX)) as u32;
            }
            TypeKind::SignedInteger { min: lo, max: hi } => {
                *lo = min.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                *hi = max.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            }
            _ => {}
        }
        self
    }

    /// Makes this an array type of `length` elements (0 means scalar).
    pub fn with_array_length(mut self, length: usize) -> Self {
        self.array_length = length;
        self
    }

    /// Overrides the raw default used to initialize the blackboard.
    pub fn with_default_value(mut self, raw: u32) -> Self {
        self.default_value = Some(raw);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Storage size of one element in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn array_length(&self) -> usize {
        self.array_length
    }

    /// Raw encoding written by default-value initialization.
    pub fn default_value(&self) -> u32 {
        if let Some(raw) = self.default_value {
            return raw;
        }
        let mask = raw_mask(self.size);
        match &self.kind {
            TypeKind::Boolean | TypeKind::FixedPoint { .. } => 0,
            TypeKind::UnsignedInteger { min, .. } => *min,
            TypeKind::SignedInteger { min, max } => (0i32.clamp(*min, *max) as u32) & mask,
            TypeKind::Enum { literals } => literals
                .first()
                .map_or(0, |first| (first.numerical as u32) & mask),
        }
    }

    /// Checks the declaration is self-consistent.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !matches!(self.size, 1 | 2 | 4) {
            return Err(SchemaError::InvalidSize);
        }
        let mask = raw_mask(self.size);
        match &self.kind {
            TypeKind::Boolean => {
                if self.size != 1 {
                    return Err(SchemaError::InvalidSize);
                }
            }
            TypeKind::UnsignedInteger { min, max } => {
                if min > max || *max > mask {
                    return Err(SchemaError::InvalidRange);
                }
            }
            TypeKind::SignedInteger { min, max } => {
                let (lo, hi) = signed_bounds(self.size);
                if min > max || *min < lo || *max > hi {
                    return Err(SchemaError::InvalidRange);
                }
            }
            TypeKind::FixedPoint {
                integral,
                fractional,
            } => {
                let bits = 1 + usize::from(*integral) + usize::from(*fractional);
                if bits > self.size * 8 {
                    return Err(SchemaError::FixedPointTooWide);
                }
            }
            TypeKind::Enum { literals } => {
                let (lo, hi) = signed_bounds(self.size);
                if literals.is_empty()
                    || literals
                        .iter()
                        .any(|l| l.numerical < lo || l.numerical > hi || l.literal.is_empty())
                {
                    return Err(SchemaError::InvalidEnum);
                }
            }
        }

        let default = self.default_value();
        if default & !mask != 0 || !self.admits_raw(default) {
            return Err(SchemaError::InvalidDefault);
        }
        Ok(())
    }

    fn admits_raw(&self, raw: u32) -> bool {
        match &self.kind {
            TypeKind::Boolean => raw <= 1,
            TypeKind::UnsignedInteger { min, max } => (*min..=*max).contains(&raw),
            TypeKind::SignedInteger { min, max } => {
                (*min..=*max).contains(&sign_extend(raw, self.size))
            }
            TypeKind::FixedPoint { .. } => true,
            TypeKind::Enum { .. } => self.literal_of(sign_extend(raw, self.size)).is_some(),
        }
    }

    fn literal_of(&self, numerical: i32) -> Option<&str> {
        match &self.kind {
            TypeKind::Enum { literals } => literals
                .iter()
                .find(|l| l.numerical == numerical)
                .map(EnumLiteral::literal),
            _ => None,
        }
    }

    fn unsupported(&self, host: &str) -> AccessError {
        AccessError::type_mismatch(format!(
            "Unsupported conversion from {} to {} parameter type {}",
            host,
            self.kind.name(),
            self.name
        ))
    }

    fn out_of_admitted_range(&self, value: impl core::fmt::Display) -> AccessError {
        let range = match &self.kind {
            TypeKind::UnsignedInteger { min, max } => format!("[{min}, {max}]"),
            TypeKind::SignedInteger { min, max } => format!("[{min}, {max}]"),
            TypeKind::FixedPoint { .. } => {
                let (lo, hi) = self.fixed_point_bounds();
                format!("[{lo}, {hi}]")
            }
            _ => String::from("[0, 1]"),
        };
        AccessError::out_of_range(format!(
            "Value {value} standing out of admitted range {range} for {}",
            self.name
        ))
    }

    // ---- text ----

    /// Parses `text` and encodes it for the blackboard.
    pub fn to_blackboard_text(&self, text: &str, space: ValueSpace) -> Result<u32, AccessError> {
        let text = text.trim();
        if space == ValueSpace::Raw {
            return self.raw_from_text(text);
        }

        match &self.kind {
            TypeKind::Boolean => match text {
                "true" => Ok(1),
                "false" => Ok(0),
                _ => {
                    let value = parse_integer(text)?;
                    match value {
                        0 | 1 => Ok(value as u32),
                        _ => Err(self.out_of_admitted_range(text)),
                    }
                }
            },
            TypeKind::UnsignedInteger { min, max } => {
                let value = parse_integer(text)?;
                if value < i64::from(*min) || value > i64::from(*max) {
                    return Err(self.out_of_admitted_range(text));
                }
                Ok(value as u32)
            }
            TypeKind::SignedInteger { min, max } => {
                let value = if is_hex(text) {
                    // Hexadecimal input is the raw two's complement pattern.
                    let raw = parse_integer(text)?;
                    if raw < 0 || raw > i64::from(raw_mask(self.size)) {
                        return Err(self.out_of_admitted_range(text));
                    }
                    i64::from(sign_extend(raw as u32, self.size))
                } else {
                    parse_integer(text)?
                };
                if value < i64::from(*min) || value > i64::from(*max) {
                    return Err(self.out_of_admitted_range(text));
                }
                Ok((value as i32 as u32) & raw_mask(self.size))
            }
            TypeKind::FixedPoint { .. } => {
                let value: f64 = text.parse().map_err(|_| {
                    AccessError::invalid_format(format!(
                        "Value {text} is not a valid decimal for {}",
                        self.name
                    ))
                })?;
                if !value.is_finite() {
                    return Err(AccessError::invalid_format(format!(
                        "Value {text} is not a finite decimal for {}",
                        self.name
                    )));
                }
                self.to_blackboard_real(value)
            }
            TypeKind::Enum { literals } => {
                if let Some(found) = literals.iter().find(|l| l.literal == text) {
                    return Ok((found.numerical as u32) & raw_mask(self.size));
                }
                let numerical = parse_integer(text).map_err(|_| {
                    AccessError::invalid_format(format!(
                        "Provided value {text} is not part of the lexical space of {}",
                        self.name
                    ))
                })?;
                match i32::try_from(numerical).ok().and_then(|n| self.literal_of(n)) {
                    Some(_) => Ok((numerical as i32 as u32) & raw_mask(self.size)),
                    None => Err(AccessError::out_of_range(format!(
                        "Provided value {text} is not part of the numerical space of {}",
                        self.name
                    ))),
                }
            }
        }
    }

    fn raw_from_text(&self, text: &str) -> Result<u32, AccessError> {
        let value = parse_integer(text)?;
        let mask = raw_mask(self.size);
        let (lo, _) = signed_bounds(self.size);
        if value > i64::from(mask) || value < i64::from(lo) {
            return Err(AccessError::out_of_range(format!(
                "Raw value {text} does not fit in {} byte(s) of {}",
                self.size, self.name
            )));
        }
        Ok((value as i32 as u32) & mask)
    }

    /// Renders a raw blackboard value as text. Never fails.
    ///
    /// Enumeration values with no literal render as their decimal number.
    pub fn from_blackboard_text(
        &self,
        raw: u32,
        space: ValueSpace,
        raw_format: OutputRawFormat,
    ) -> String {
        let raw = raw & raw_mask(self.size);
        if space == ValueSpace::Raw {
            return match raw_format {
                OutputRawFormat::Decimal => raw.to_string(),
                OutputRawFormat::Hexadecimal => {
                    format!("0x{:0width$X}", raw, width = self.size * 2)
                }
            };
        }

        match &self.kind {
            TypeKind::Boolean => String::from(if raw != 0 { "1" } else { "0" }),
            TypeKind::UnsignedInteger { .. } => raw.to_string(),
            TypeKind::SignedInteger { .. } => sign_extend(raw, self.size).to_string(),
            TypeKind::FixedPoint { fractional, .. } => {
                let precision = libm::ceil(f64::from(*fractional) * core::f64::consts::LOG10_2);
                format!("{:.*}", precision as usize, self.decode_fixed_point(raw))
            }
            TypeKind::Enum { .. } => {
                let numerical = sign_extend(raw, self.size);
                match self.literal_of(numerical) {
                    Some(literal) => String::from(literal),
                    None => numerical.to_string(),
                }
            }
        }
    }

    // ---- typed host values ----

    pub fn to_blackboard_bool(&self, value: bool) -> Result<u32, AccessError> {
        match self.kind {
            TypeKind::Boolean => Ok(u32::from(value)),
            _ => Err(self.unsupported("boolean")),
        }
    }

    pub fn from_blackboard_bool(&self, raw: u32) -> Result<bool, AccessError> {
        match self.kind {
            TypeKind::Boolean => Ok(raw & raw_mask(self.size) != 0),
            _ => Err(self.unsupported("boolean")),
        }
    }

    pub fn to_blackboard_unsigned(&self, value: u32) -> Result<u32, AccessError> {
        match self.kind {
            TypeKind::Boolean if value > 1 => Err(self.out_of_admitted_range(value)),
            TypeKind::Boolean => Ok(value),
            TypeKind::UnsignedInteger { min, max } if !(min..=max).contains(&value) => {
                Err(self.out_of_admitted_range(value))
            }
            TypeKind::UnsignedInteger { .. } => Ok(value),
            _ => Err(self.unsupported("unsigned integer")),
        }
    }

    pub fn from_blackboard_unsigned(&self, raw: u32) -> Result<u32, AccessError> {
        let raw = raw & raw_mask(self.size);
        match self.kind {
            TypeKind::Boolean => Ok(u32::from(raw != 0)),
            TypeKind::UnsignedInteger { .. } => Ok(raw),
            _ => Err(self.unsupported("unsigned integer")),
        }
    }

    pub fn to_blackboard_signed(&self, value: i32) -> Result<u32, AccessError> {
        match &self.kind {
            TypeKind::SignedInteger { min, max } if !(*min..=*max).contains(&value) => {
                Err(self.out_of_admitted_range(value))
            }
            TypeKind::Enum { .. } if self.literal_of(value).is_none() => {
                Err(AccessError::out_of_range(format!(
                    "Provided value {value} is not part of the numerical space of {}",
                    self.name
                )))
            }
            TypeKind::SignedInteger { .. } | TypeKind::Enum { .. } => {
                Ok((value as u32) & raw_mask(self.size))
            }
            _ => Err(self.unsupported("signed integer")),
        }
    }

    pub fn from_blackboard_signed(&self, raw: u32) -> Result<i32, AccessError> {
        match self.kind {
            TypeKind::SignedInteger { .. } | TypeKind::Enum { .. } => {
                Ok(sign_extend(raw, self.size))
            }
            _ => Err(self.unsupported("signed integer")),
        }
    }

    pub fn to_blackboard_real(&self, value: f64) -> Result<u32, AccessError> {
        if !value.is_finite() {
            return Err(self.out_of_admitted_range(value));
        }
        match &self.kind {
            TypeKind::UnsignedInteger { min, max } => {
                let rounded = libm::round(value);
                if rounded < f64::from(*min) || rounded > f64::from(*max) {
                    return Err(self.out_of_admitted_range(value));
                }
                Ok(rounded as u32)
            }
            TypeKind::SignedInteger { min, max } => {
                let rounded = libm::round(value);
                if rounded < f64::from(*min) || rounded > f64::from(*max) {
                    return Err(self.out_of_admitted_range(value));
                }
                Ok((rounded as i32 as u32) & raw_mask(self.size))
            }
            TypeKind::FixedPoint {
                integral,
                fractional,
            } => {
                let scaled = libm::round(value * f64::from(1u32 << *fractional));
                let limit = (1i64 << (u32::from(*integral) + u32::from(*fractional))) as f64;
                if scaled < -limit || scaled > limit - 1.0 {
                    return Err(self.out_of_admitted_range(value));
                }
                Ok((scaled as i64 as i32 as u32) & raw_mask(self.size))
            }
            _ => Err(self.unsupported("double")),
        }
    }

    pub fn from_blackboard_real(&self, raw: u32) -> Result<f64, AccessError> {
        match self.kind {
            TypeKind::UnsignedInteger { .. } => Ok(f64::from(raw & raw_mask(self.size))),
            TypeKind::SignedInteger { .. } => Ok(f64::from(sign_extend(raw, self.size))),
            TypeKind::FixedPoint { .. } => Ok(self.decode_fixed_point(raw)),
            _ => Err(self.unsupported("double")),
        }
    }

    fn decode_fixed_point(&self, raw: u32) -> f64 {
        let fractional = match self.kind {
            TypeKind::FixedPoint { fractional, .. } => fractional,
            _ => 0,
        };
        f64::from(sign_extend(raw, self.size)) / f64::from(1u32 << fractional)
    }

    fn fixed_point_bounds(&self) -> (f64, f64) {
        match self.kind {
            TypeKind::FixedPoint {
                integral,
                fractional,
            } => {
                let scale = f64::from(1u32 << fractional);
                let limit = (1i64 << (u32::from(integral) + u32::from(fractional))) as f64;
                (-limit / scale, (limit - 1.0) / scale)
            }
            _ => (0.0, 0.0),
        }
    }

    /// Human-readable description of the type, one property per line.
    pub fn properties(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Type: {}", self.name);
        let _ = writeln!(out, "Kind: {}", self.kind.name());
        let _ = writeln!(out, "Size: {} byte(s)", self.size);
        match &self.kind {
            TypeKind::UnsignedInteger { min, max } => {
                let _ = writeln!(out, "Range: [{min}, {max}]");
            }
            TypeKind::SignedInteger { min, max } => {
                let _ = writeln!(out, "Range: [{min}, {max}]");
            }
            TypeKind::FixedPoint {
                integral,
                fractional,
            } => {
                let _ = writeln!(out, "Notation: Q{integral}.{fractional}");
            }
            TypeKind::Enum { literals } => {
                out.push_str("Value pairs:");
                for l in literals {
                    let _ = write!(out, " {{{}, {}}}", l.literal, l.numerical);
                }
                out.push('\n');
            }
            TypeKind::Boolean => {}
        }
        out
    }
}

fn signed_bounds(size: usize) -> (i32, i32) {
    let max = (raw_mask(size) >> 1) as i32;
    (-max - 1, max)
}

fn is_hex(text: &str) -> bool {
    text.starts_with("0x") || text.starts_with("0X")
}

/// Parses a decimal or `0x` hexadecimal integer with an optional sign.
fn parse_integer(text: &str) -> Result<i64, AccessError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    };

    match parsed {
        Ok(magnitude) => {
            let magnitude = i64::try_from(magnitude).map_err(|_| {
                AccessError::out_of_range(format!("Value {text} exceeds integer range"))
            })?;
            Ok(if negative { -magnitude } else { magnitude })
        }
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(
                AccessError::out_of_range(format!("Value {text} exceeds integer range")),
            ),
            _ => Err(AccessError::invalid_format(format!(
                "Value {text} is not a valid integer"
            ))),
        },
    }
}
