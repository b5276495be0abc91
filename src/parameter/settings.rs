use alloc::string::String;

use crate::parameter::{AccessContext, ValueSpace};

/// A value node of a configuration document.
///
/// Document parsing lives outside this crate; parameters only exchange the
/// node's text and its optional `ValueSpace` attribute.
pub trait SettingsContent {
    fn text_content(&self) -> &str;

    fn set_text_content(&mut self, text: String);

    /// The node's value space attribute, if present.
    fn value_space(&self) -> Option<ValueSpace>;

    fn set_value_space(&mut self, space: ValueSpace);
}

/// Applies the value space attribute in the direction of the exchange.
///
/// Loading adopts the attribute when present. Saving tags the node only
/// for raw output; real is the implied default.
pub(crate) fn exchange_value_space(
    content: &mut dyn SettingsContent,
    serialize_out: bool,
    ctx: &mut AccessContext<'_>,
) {
    if serialize_out {
        if ctx.value_space() == ValueSpace::Raw {
            content.set_value_space(ValueSpace::Raw);
        }
    } else if let Some(space) = content.value_space() {
        ctx.set_value_space(space);
    }
}
