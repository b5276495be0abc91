//! Test support utilities - only compiled in test builds.

use alloc::string::String;

use crate::parameter::{
    BlackboardAccess, ParameterTree, ParameterType, SettingsContent, SyncError, SyncHook,
    ValueSpace,
};

/// Bytes laid out by [`sample_tree`].
pub const SAMPLE_FOOTPRINT: usize = 27;

/// An audio-like tree exercising every type kind.
///
/// ```text
/// /Audio
///   volume    u8 [0, 100], default 50      @0
///   gains     u8[4]                        @1
///   balance   s16 [-100, 100]              @5
///   enabled   bool                         @7
///   mode      enum8 Stereo=0 Mono=1 Off=-1 @8
///   Mixer
///     levels  s16[3]                       @9
///     trim    Q7.8 in 2 bytes              @15
///     flags   bool[2]                      @17
///     coeffs  u32[2]                       @19
/// ```
pub fn sample_tree() -> ParameterTree {
    let mut b = ParameterTree::builder("Audio").unwrap();
    let root = b.root();

    let percent = b
        .add_type(
            ParameterType::unsigned_integer("Percent", 1)
                .with_range(0, 100)
                .with_default_value(50),
        )
        .unwrap();
    let gain = b
        .add_type(ParameterType::unsigned_integer("Gain", 1).with_array_length(4))
        .unwrap();
    let balance = b
        .add_type(ParameterType::signed_integer("Balance", 2).with_range(-100, 100))
        .unwrap();
    let flag = b.add_type(ParameterType::boolean("Flag")).unwrap();
    let mode = b
        .add_type(ParameterType::enumeration(
            "Mode",
            1,
            [("Stereo", 0), ("Mono", 1), ("Off", -1)],
        ))
        .unwrap();
    let level = b
        .add_type(ParameterType::signed_integer("Level", 2).with_array_length(3))
        .unwrap();
    let trim = b
        .add_type(ParameterType::fixed_point("Trim", 2, 7, 8))
        .unwrap();
    let flags = b
        .add_type(ParameterType::boolean("Flags").with_array_length(2))
        .unwrap();
    let coeff = b
        .add_type(ParameterType::unsigned_integer("Coeff", 4).with_array_length(2))
        .unwrap();

    b.add_parameter(root, "volume", percent).unwrap();
    b.add_parameter(root, "gains", gain).unwrap();
    b.add_parameter(root, "balance", balance).unwrap();
    b.add_parameter(root, "enabled", flag).unwrap();
    b.add_parameter(root, "mode", mode).unwrap();

    let mixer = b.add_block(root, "Mixer").unwrap();
    b.add_parameter(mixer, "levels", level).unwrap();
    b.add_parameter(mixer, "trim", trim).unwrap();
    b.add_parameter(mixer, "flags", flags).unwrap();
    b.add_parameter(mixer, "coeffs", coeff).unwrap();

    b.build()
}

/// Sync hook that counts calls and clears dirty state.
#[derive(Debug, Default)]
pub struct RecordingSync {
    pub calls: usize,
    pub dirty_blocks: usize,
}

impl SyncHook for RecordingSync {
    fn sync(&mut self, blackboard: &mut dyn BlackboardAccess) -> Result<(), SyncError> {
        self.calls += 1;
        blackboard.for_each_dirty(&mut |_, _| {
            self.dirty_blocks += 1;
            Ok(())
        })?;
        blackboard.clear_dirty();
        Ok(())
    }
}

/// Sync hook that always fails with the same message.
#[derive(Debug)]
pub struct FailingSync {
    message: &'static str,
}

impl FailingSync {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl SyncHook for FailingSync {
    fn sync(&mut self, _blackboard: &mut dyn BlackboardAccess) -> Result<(), SyncError> {
        Err(SyncError::new(self.message))
    }
}

/// In-memory configuration document node.
#[derive(Debug, Default)]
pub struct SettingsElement {
    pub text: String,
    pub space: Option<ValueSpace>,
}

impl SettingsElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: String::from(text),
            space: None,
        }
    }
}

impl SettingsContent for SettingsElement {
    fn text_content(&self) -> &str {
        &self.text
    }

    fn set_text_content(&mut self, text: String) {
        self.text = text;
    }

    fn value_space(&self) -> Option<ValueSpace> {
        self.space
    }

    fn set_value_space(&mut self, space: ValueSpace) {
        self.space = Some(space);
    }
}
