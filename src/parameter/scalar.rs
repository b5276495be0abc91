use alloc::{format, string::String};
use core::fmt::Write;

use crate::parameter::{
    AccessContext, AccessError, ParameterType, ParameterValue, PathNavigator,
    settings::{SettingsContent, exchange_value_space},
};

/// A scalar parameter: one value of its type at a fixed blackboard offset.
///
/// This is a borrowed view into a [`ParameterTree`](crate::parameter::ParameterTree);
/// the tree owns the name, path and type.
#[derive(Debug, Clone, Copy)]
pub struct Parameter<'t> {
    name: &'t str,
    path: &'t str,
    offset: usize,
    ty: &'t ParameterType,
}

impl<'t> Parameter<'t> {
    pub(crate) fn new(name: &'t str, path: &'t str, offset: usize, ty: &'t ParameterType) -> Self {
        Self {
            name,
            path,
            offset,
            ty,
        }
    }

    #[inline]
    pub fn name(&self) -> &'t str {
        self.name
    }

    #[inline]
    pub fn path(&self) -> &'t str {
        self.path
    }

    /// Byte offset of the first element in the main blackboard.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Storage size of one element.
    #[inline]
    pub fn size(&self) -> usize {
        self.ty.size()
    }

    #[inline]
    pub fn parameter_type(&self) -> &'t ParameterType {
        self.ty
    }

    /// Reads or writes the value as text.
    ///
    /// The navigator must be positioned just past this parameter; any
    /// remaining component is `PathNotFound`. A write that fails, or whose
    /// sync fails, carries this parameter's path in the error trail.
    pub fn access_value(
        &self,
        navigator: &mut PathNavigator<'_>,
        value: &mut String,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        if navigator.next().is_some() {
            return Err(AccessError::path_not_found(format!(
                "Path not found: {}",
                navigator.current_path()
            )));
        }

        if is_set {
            self.do_set_value(value, self.offset, ctx)
                .and_then(|()| ctx.sync_if_enabled())
                .map_err(|err| err.with_path(self.path))
        } else {
            *value = self.do_get_value(self.offset, ctx);
            Ok(())
        }
    }

    /// Reads or writes the value as a typed host value.
    pub fn access_as<T: ParameterValue>(
        &self,
        value: &mut T,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        if is_set {
            self.write_as(value, ctx)
        } else {
            *value = self.read_as(ctx)?;
            Ok(())
        }
    }

    pub fn read_as<T: ParameterValue>(&self, ctx: &AccessContext<'_>) -> Result<T, AccessError> {
        let raw = ctx.read_integer(self.size(), self.offset);
        T::from_blackboard(raw, self.ty, ctx).map_err(|err| err.with_path(self.path))
    }

    /// Encodes and writes `value`, then syncs if enabled.
    pub fn write_as<T: ParameterValue>(
        &self,
        value: &T,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        value
            .to_blackboard(self.ty, ctx)
            .map(|raw| ctx.write_integer(raw, self.size(), self.offset))
            .and_then(|()| ctx.sync_if_enabled())
            .map_err(|err| err.with_path(self.path))
    }

    pub(crate) fn do_set_value(
        &self,
        text: &str,
        offset: usize,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let raw = self.ty.to_blackboard_text(text, ctx.value_space())?;
        ctx.write_integer(raw, self.size(), offset);
        Ok(())
    }

    pub(crate) fn do_get_value(&self, offset: usize, ctx: &AccessContext<'_>) -> String {
        let raw = ctx.read_integer(self.size(), offset);
        self.ty
            .from_blackboard_text(raw, ctx.value_space(), ctx.output_raw_format())
    }

    /// Loads the type's default without marking the blackboard dirty.
    pub fn set_default_values(&self, ctx: &mut AccessContext<'_>) {
        ctx.load_integer(self.ty.default_value(), self.size(), self.offset);
    }

    pub fn log_value(&self, ctx: &AccessContext<'_>) -> String {
        self.do_get_value(self.offset, ctx)
    }

    /// Exchanges the value with a configuration document node.
    ///
    /// `base_offset` is the offset of the area blackboard `ctx` points at.
    /// With `serialize_out` the value is saved to `content`, otherwise it
    /// is loaded from it.
    pub fn serialize_settings(
        &self,
        content: &mut dyn SettingsContent,
        base_offset: usize,
        serialize_out: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        exchange_value_space(content, serialize_out, ctx);

        let offset = self.offset - base_offset;
        if serialize_out {
            content.set_text_content(self.do_get_value(offset, ctx));
            Ok(())
        } else {
            self.do_set_value(content.text_content(), offset, ctx)
                .map_err(|err| err.with_path(self.path))
        }
    }

    pub fn properties(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Path: {}", self.path);
        let _ = writeln!(out, "Offset: {}", self.offset);
        out.push_str(&self.ty.properties());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use crate::parameter::{
        Blackboard, Endianness, ErrorKind, NoSync, ValueSpace,
        test_support::{FailingSync, RecordingSync, SettingsElement},
    };

    type TestBlackboard = Blackboard<16, 4, 4>;

    fn volume_type() -> ParameterType {
        ParameterType::unsigned_integer("Percent", 1).with_range(0, 100)
    }

    fn access(
        param: &Parameter<'_>,
        path: &str,
        value: &mut String,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let mut nav = PathNavigator::new(path).unwrap();
        nav.navigate_through("Audio").unwrap();
        nav.navigate_through("volume").unwrap();
        param.access_value(&mut nav, value, is_set, ctx)
    }

    #[test]
    fn set_then_get_round_trips_text() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 3, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = RecordingSync::default();
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        let mut value = String::from("42");
        access(&param, "/Audio/volume", &mut value, true, &mut ctx).unwrap();

        let mut read = String::new();
        access(&param, "/Audio/volume", &mut read, false, &mut ctx).unwrap();
        assert_eq!(read, "42");
        assert_eq!(ctx.blackboard().read_integer(1, 3, Endianness::Little), 42);
        drop(ctx);
        assert_eq!(hook.calls, 1);
    }

    #[test]
    fn trailing_component_is_path_not_found() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 0, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = NoSync;
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        let mut value = String::new();
        let err = access(&param, "/Audio/volume/0", &mut value, false, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert_eq!(err.message(), "Path not found: /Audio/volume/0");
    }

    #[test]
    fn failed_write_carries_path_and_leaves_value() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 0, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = RecordingSync::default();
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        let mut value = String::from("101");
        let err = access(&param, "/Audio/volume", &mut value, true, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.trail(), ["/Audio/volume"]);
        assert!(!ctx.blackboard().any_dirty());
        drop(ctx);
        assert_eq!(hook.calls, 0);
    }

    #[test]
    fn sync_failure_keeps_written_value() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 0, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = FailingSync::new("bus error");
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        let mut value = String::from("7");
        let err = access(&param, "/Audio/volume", &mut value, true, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyncFailure);
        assert_eq!(err.to_string(), "bus error /Audio/volume");
        assert_eq!(param.log_value(&ctx), "7");
    }

    #[test]
    fn auto_sync_off_skips_hook() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 0, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = FailingSync::new("unreachable");
        let mut ctx =
            AccessContext::new(&mut bb, &mut hook, Endianness::Little).with_auto_sync(false);

        let mut value = String::from("9");
        access(&param, "/Audio/volume", &mut value, true, &mut ctx).unwrap();
        assert!(ctx.blackboard().any_dirty());
    }

    #[test]
    fn typed_access_checks_domain() {
        let ty = ParameterType::signed_integer("Balance", 2).with_range(-50, 50);
        let param = Parameter::new("balance", "/Audio/balance", 2, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = NoSync;
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Big);

        param.access_as(&mut -12i32, true, &mut ctx).unwrap();
        let mut read = 0i32;
        param.access_as(&mut read, false, &mut ctx).unwrap();
        assert_eq!(read, -12);
        assert_eq!(ctx.blackboard().read_integer(2, 2, Endianness::Big), 0xFFF4);

        let err = param.access_as(&mut 51i32, true, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.trail(), ["/Audio/balance"]);

        let err = param.access_as(&mut true, true, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn defaults_load_without_dirtying() {
        let ty = volume_type().with_default_value(80);
        let param = Parameter::new("volume", "/Audio/volume", 1, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = NoSync;
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        param.set_default_values(&mut ctx);
        assert_eq!(param.log_value(&ctx), "80");
        assert!(!ctx.blackboard().any_dirty());
    }

    #[test]
    fn settings_exchange_honours_value_space() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 4, &ty);
        // Area blackboard holding bytes 4..8 of the main image.
        let mut area = Blackboard::<4, 4, 1>::new();
        let mut hook = NoSync;
        let mut ctx = AccessContext::new(&mut area, &mut hook, Endianness::Little);

        let mut element = SettingsElement::new("0x1E");
        element.space = Some(ValueSpace::Raw);
        param.serialize_settings(&mut element, 4, false, &mut ctx).unwrap();
        assert_eq!(ctx.value_space(), ValueSpace::Raw);
        assert_eq!(ctx.read_integer(1, 0), 30);

        let mut saved = SettingsElement::new("");
        param.serialize_settings(&mut saved, 4, true, &mut ctx).unwrap();
        assert_eq!(saved.text, "30");
        assert_eq!(saved.space, Some(ValueSpace::Raw));
    }

    #[test]
    fn settings_load_failure_carries_path() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 0, &ty);
        let mut bb = TestBlackboard::new();
        let mut hook = NoSync;
        let mut ctx = AccessContext::new(&mut bb, &mut hook, Endianness::Little);

        let mut element = SettingsElement::new("loud");
        let err = param
            .serialize_settings(&mut element, 0, false, &mut ctx)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(err.trail(), ["/Audio/volume"]);
    }

    #[test]
    fn properties_list_node_and_type() {
        let ty = volume_type();
        let param = Parameter::new("volume", "/Audio/volume", 5, &ty);
        let props = param.properties();
        assert!(props.starts_with("Name: volume\nPath: /Audio/volume\nOffset: 5\n"));
        assert!(props.contains("Range: [0, 100]"));
    }
}
