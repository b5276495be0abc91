use alloc::string::String;

use crate::parameter::{AccessContext, AccessError, ParameterType};

/// Host value types a parameter can be read or written as.
///
/// Implemented for `bool`, `u32`, `i32`, `f64` and `String`; typed access
/// on scalar and array parameters is generic over this trait.
pub trait ParameterValue: Sized {
    /// Validates `self` against `ty` and encodes it as a raw blackboard value.
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        ctx: &AccessContext<'_>,
    ) -> Result<u32, AccessError>;

    /// Decodes a raw blackboard value.
    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        ctx: &AccessContext<'_>,
    ) -> Result<Self, AccessError>;
}

impl ParameterValue for bool {
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<u32, AccessError> {
        ty.to_blackboard_bool(*self)
    }

    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<Self, AccessError> {
        ty.from_blackboard_bool(raw)
    }
}

impl ParameterValue for u32 {
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<u32, AccessError> {
        ty.to_blackboard_unsigned(*self)
    }

    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<Self, AccessError> {
        ty.from_blackboard_unsigned(raw)
    }
}

impl ParameterValue for i32 {
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<u32, AccessError> {
        ty.to_blackboard_signed(*self)
    }

    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<Self, AccessError> {
        ty.from_blackboard_signed(raw)
    }
}

impl ParameterValue for f64 {
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<u32, AccessError> {
        ty.to_blackboard_real(*self)
    }

    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        _: &AccessContext<'_>,
    ) -> Result<Self, AccessError> {
        ty.from_blackboard_real(raw)
    }
}

// Text goes through the context's value space, like path-based access.
impl ParameterValue for String {
    fn to_blackboard(
        &self,
        ty: &ParameterType,
        ctx: &AccessContext<'_>,
    ) -> Result<u32, AccessError> {
        ty.to_blackboard_text(self, ctx.value_space())
    }

    fn from_blackboard(
        raw: u32,
        ty: &ParameterType,
        ctx: &AccessContext<'_>,
    ) -> Result<Self, AccessError> {
        Ok(ty.from_blackboard_text(raw, ctx.value_space(), ctx.output_raw_format()))
    }
}
