use alloc::{string::String, vec::Vec};

/// Category of a recoverable parameter access failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Text does not parse as the declared type, or a numeric path token is not numeric.
    InvalidFormat,
    /// Value outside the type's domain, or index past the end of an array.
    OutOfRange,
    /// More values provided than the array has room for.
    TooManyValues,
    /// Unconsumed path tokens, or a path that names no parameter.
    PathNotFound,
    /// The synchronization hook reported a failure.
    SyncFailure,
    /// The parameter type cannot be accessed as the requested host type.
    TypeMismatch,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorKind::InvalidFormat => write!(f, "invalid format"),
            ErrorKind::OutOfRange => write!(f, "out of range"),
            ErrorKind::TooManyValues => write!(f, "too many values"),
            ErrorKind::PathNotFound => write!(f, "path not found"),
            ErrorKind::SyncFailure => write!(f, "synchronization failure"),
            ErrorKind::TypeMismatch => write!(f, "type mismatch"),
        }
    }
}

/// Failure of a parameter access, annotated with the nodes it crossed.
///
/// Each node a failure propagates through pushes its own path onto the
/// trail, so the rendered message reads innermost cause first and then
/// the node paths in the order they were crossed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessError {
    kind: ErrorKind,
    message: String,
    trail: Vec<String>,
}

impl AccessError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trail: Vec::new(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn path_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathNotFound, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    /// Appends a path segment to the trail.
    pub fn with_path(mut self, segment: impl Into<String>) -> Self {
        self.trail.push(segment.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The innermost message, without path annotations.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn trail(&self) -> &[String] {
        &self.trail
    }
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)?;
        for segment in &self.trail {
            write!(f, " {segment}")?;
        }
        Ok(())
    }
}

impl From<SyncError> for AccessError {
    fn from(err: SyncError) -> Self {
        AccessError::new(ErrorKind::SyncFailure, err.message)
    }
}

/// Failure reported by a [`SyncHook`](crate::parameter::SyncHook).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    message: String,
}

impl SyncError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl core::fmt::Display for SyncError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors raised while declaring a parameter tree or assembling a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaError {
    /// Storage size is not 1, 2 or 4 bytes, or not allowed for the kind.
    InvalidSize,
    /// Declared bounds are inverted or do not fit the storage size.
    InvalidRange,
    /// Default value lies outside the type's domain.
    InvalidDefault,
    /// Enumeration declared without literals, or with values that do not fit.
    InvalidEnum,
    /// Fixed-point integral and fractional bits exceed the storage size.
    FixedPointTooWide,
    /// Node name is empty or contains a path separator.
    InvalidName,
    /// A sibling with the same name already exists.
    DuplicateName,
    /// Parent handle does not belong to this tree.
    UnknownParent,
    /// Parent is a parameter, not a block.
    ParentNotBlock,
    /// Type handle does not belong to this tree.
    UnknownType,
    /// The tree does not fit in the blackboard image.
    FootprintTooLarge,
}

impl core::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchemaError::InvalidSize => write!(f, "unsupported storage size"),
            SchemaError::InvalidRange => write!(f, "range does not fit the storage size"),
            SchemaError::InvalidDefault => write!(f, "default value outside the type domain"),
            SchemaError::InvalidEnum => write!(f, "enumeration literals missing or too wide"),
            SchemaError::FixedPointTooWide => write!(f, "fixed-point format exceeds storage size"),
            SchemaError::InvalidName => write!(f, "node name is empty or contains '/'"),
            SchemaError::DuplicateName => write!(f, "duplicate sibling name"),
            SchemaError::UnknownParent => write!(f, "unknown parent node"),
            SchemaError::ParentNotBlock => write!(f, "parent node is not a block"),
            SchemaError::UnknownType => write!(f, "unknown parameter type"),
            SchemaError::FootprintTooLarge => write!(f, "tree footprint exceeds blackboard size"),
        }
    }
}

/// Errors from raw, range-addressed blackboard access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Offset or length exceeds the blackboard bounds.
    OutOfBounds,
    /// Operation attempted with zero length.
    ZeroLength,
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RangeError::OutOfBounds => write!(f, "offset or length exceeds blackboard bounds"),
            RangeError::ZeroLength => write!(f, "operation attempted with zero length"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_appends_trail_in_crossing_order() {
        let err = AccessError::out_of_range("Value 300 standing out of admitted range [0, 255]")
            .with_path("/Audio/gains/2")
            .with_path("/Audio");

        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.trail().len(), 2);
        assert_eq!(
            err.to_string(),
            "Value 300 standing out of admitted range [0, 255] /Audio/gains/2 /Audio"
        );
    }

    #[test]
    fn sync_error_converts_to_sync_failure() {
        let err: AccessError = SyncError::new("bus timeout").into();
        assert_eq!(err.kind(), ErrorKind::SyncFailure);
        assert_eq!(err.message(), "bus timeout");
    }
}
