use alloc::{format, string::String, vec::Vec};
use core::fmt::Write;

use crate::parameter::{
    AccessContext, AccessError, ErrorKind, Parameter, ParameterType, ParameterValue,
    PathNavigator,
    settings::{SettingsContent, exchange_value_space},
};

/// A fixed-length array of values of one type, laid out contiguously.
///
/// Paths address the whole array (`/Audio/gains`) or one element
/// (`/Audio/gains/2`). Multi-value writes are not atomic: the first failing
/// element stops the write and the elements before it stay written.
#[derive(Debug, Clone, Copy)]
pub struct ArrayParameter<'t> {
    base: Parameter<'t>,
}

impl<'t> ArrayParameter<'t> {
    pub(crate) fn new(name: &'t str, path: &'t str, offset: usize, ty: &'t ParameterType) -> Self {
        Self {
            base: Parameter::new(name, path, offset, ty),
        }
    }

    /// The element-level view shared with scalar parameters.
    #[inline]
    pub fn as_parameter(&self) -> &Parameter<'t> {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &'t str {
        self.base.name()
    }

    #[inline]
    pub fn path(&self) -> &'t str {
        self.base.path()
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.base.offset()
    }

    /// Storage size of one element.
    #[inline]
    pub fn size(&self) -> usize {
        self.base.size()
    }

    #[inline]
    pub fn parameter_type(&self) -> &'t ParameterType {
        self.base.parameter_type()
    }

    #[inline]
    pub fn array_length(&self) -> usize {
        self.parameter_type().array_length()
    }

    /// Bytes occupied by all elements.
    #[inline]
    pub fn footprint(&self) -> usize {
        self.size() * self.array_length()
    }

    fn element_offset(&self, index: usize) -> usize {
        self.offset() + index * self.size()
    }

    /// Consumes the optional index component following the array name.
    ///
    /// Returns `None` when the path addresses the whole array.
    pub fn index(&self, navigator: &mut PathNavigator<'_>) -> Result<Option<usize>, AccessError> {
        let Some(token) = navigator.next() else {
            return Ok(None);
        };

        let index = token.parse::<usize>().map_err(|_| {
            AccessError::invalid_format(format!(
                "Expected numerical expression as last item in {}",
                navigator.current_path()
            ))
        })?;

        if index >= self.array_length() {
            return Err(AccessError::out_of_range(format!(
                "Provided index out of range (max is {})",
                self.array_length() - 1
            )));
        }

        if navigator.next().is_some() {
            return Err(AccessError::path_not_found(format!(
                "Path not found: {}",
                navigator.current_path()
            )));
        }

        Ok(Some(index))
    }

    /// Reads or writes the array, or one element of it, as text.
    ///
    /// Without an index a write starts at element 0 and a read returns all
    /// elements separated by single spaces.
    pub fn access_value(
        &self,
        navigator: &mut PathNavigator<'_>,
        value: &mut String,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let index = self.index(navigator)?;

        if is_set {
            self.set_values(index.unwrap_or(0), 0, value, ctx)?;
            ctx.sync_if_enabled().map_err(|err| err.with_path(self.path()))
        } else {
            *value = match index {
                Some(index) => self.base.do_get_value(self.element_offset(index), ctx),
                None => self.get_values(0, ctx),
            };
            Ok(())
        }
    }

    /// Writes the values in `text` starting at element `start`.
    ///
    /// Values are separated by whitespace and/or commas. `base_offset` is
    /// the offset of the blackboard `ctx` points at within the main image.
    /// Nothing is written if there are more values than remaining elements.
    pub fn set_values(
        &self,
        start: usize,
        base_offset: usize,
        text: &str,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let values: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .collect();

        if values.len() + start > self.array_length() {
            return Err(AccessError::new(
                ErrorKind::TooManyValues,
                "Too many values provided",
            ));
        }

        let mut offset = self.element_offset(start) - base_offset;
        for (index, value) in (start..).zip(values) {
            log::trace!("{}/{} <- {}", self.path(), index, value);
            self.base
                .do_set_value(value, offset, ctx)
                .map_err(|err| err.with_path(format!("{}/{}", self.path(), index)))?;
            offset += self.size();
        }
        Ok(())
    }

    /// Renders every element, separated by single spaces.
    pub fn get_values(&self, base_offset: usize, ctx: &AccessContext<'_>) -> String {
        let mut out = String::new();
        let start = self.offset() - base_offset;
        for index in 0..self.array_length() {
            if index > 0 {
                out.push(' ');
            }
            out.push_str(&self.base.do_get_value(start + index * self.size(), ctx));
        }
        out
    }

    /// Reads or writes all elements as typed host values.
    ///
    /// A read replaces the contents of `values`. A write requires exactly
    /// [`array_length`](Self::array_length) values, stops at the first
    /// element that fails to encode, then syncs if enabled. Failures carry
    /// this array's path.
    ///
    /// # Panics
    /// On a write whose `values` length differs from the array length.
    pub fn access_values<T: ParameterValue>(
        &self,
        values: &mut Vec<T>,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let result = if is_set {
            self.set_typed_values(values, ctx)
                .and_then(|()| ctx.sync_if_enabled())
        } else {
            self.get_typed_values(values, ctx)
        };
        result.map_err(|err| err.with_path(self.path()))
    }

    fn set_typed_values<T: ParameterValue>(
        &self,
        values: &[T],
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        assert_eq!(
            values.len(),
            self.array_length(),
            "value count must match array length"
        );

        let ty = self.parameter_type();
        for (index, value) in values.iter().enumerate() {
            let raw = value.to_blackboard(ty, ctx)?;
            ctx.write_integer(raw, self.size(), self.element_offset(index));
        }
        Ok(())
    }

    fn get_typed_values<T: ParameterValue>(
        &self,
        values: &mut Vec<T>,
        ctx: &AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let ty = self.parameter_type();
        values.clear();
        values.reserve(self.array_length());
        for index in 0..self.array_length() {
            let raw = ctx.read_integer(self.size(), self.element_offset(index));
            values.push(T::from_blackboard(raw, ty, ctx)?);
        }
        Ok(())
    }

    /// Loads the type's default into every element without marking dirty.
    pub fn set_default_values(&self, ctx: &mut AccessContext<'_>) {
        let raw = self.parameter_type().default_value();
        for index in 0..self.array_length() {
            ctx.load_integer(raw, self.size(), self.element_offset(index));
        }
    }

    pub fn log_value(&self, ctx: &AccessContext<'_>) -> String {
        self.get_values(0, ctx)
    }

    /// Exchanges all elements with a configuration document node.
    pub fn serialize_settings(
        &self,
        content: &mut dyn SettingsContent,
        base_offset: usize,
        serialize_out: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        exchange_value_space(content, serialize_out, ctx);

        if serialize_out {
            content.set_text_content(self.get_values(base_offset, ctx));
            Ok(())
        } else {
            self.set_values(0, base_offset, content.text_content(), ctx)
        }
    }

    pub fn properties(&self) -> String {
        let mut out = self.base.properties();
        let _ = writeln!(out, "Array length: {}", self.array_length());
        out
    }
}
