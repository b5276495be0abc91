use crate::parameter::{
    AccessError, BlackboardAccess, Endianness, OutputRawFormat, SyncError, ValueSpace,
    slice::ROSlice,
};

/// Propagates blackboard changes to the live subsystem.
///
/// Called synchronously after a successful write when auto-sync is on.
/// Failures are reported to the caller as-is and never retried.
pub trait SyncHook {
    fn sync(&mut self, blackboard: &mut dyn BlackboardAccess) -> Result<(), SyncError>;
}

/// Hook that accepts every change without doing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSync;

impl SyncHook for NoSync {
    fn sync(&mut self, _blackboard: &mut dyn BlackboardAccess) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Hook that commits each dirty block through a closure.
///
/// Dirty state is cleared only if every block was committed.
pub struct DirtyBlockSync<F>(pub F)
where
    F: FnMut(usize, ROSlice<'_>) -> Result<(), SyncError>;

impl<F> SyncHook for DirtyBlockSync<F>
where
    F: FnMut(usize, ROSlice<'_>) -> Result<(), SyncError>,
{
    fn sync(&mut self, blackboard: &mut dyn BlackboardAccess) -> Result<(), SyncError> {
        if !blackboard.any_dirty() {
            return Ok(());
        }
        blackboard.for_each_dirty(&mut |addr, data| (self.0)(addr, data))?;
        blackboard.clear_dirty();
        Ok(())
    }
}

/// Per-operation access settings and collaborators.
///
/// Created for one request and dropped afterwards.
pub struct AccessContext<'a> {
    blackboard: &'a mut dyn BlackboardAccess,
    sync_hook: &'a mut dyn SyncHook,
    endianness: Endianness,
    auto_sync: bool,
    value_space: ValueSpace,
    output_raw_format: OutputRawFormat,
}

impl<'a> core::fmt::Debug for AccessContext<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessContext")
            .field("endianness", &self.endianness)
            .field("auto_sync", &self.auto_sync)
            .field("value_space", &self.value_space)
            .field("output_raw_format", &self.output_raw_format)
            .finish_non_exhaustive()
    }
}

impl<'a> AccessContext<'a> {
    /// Creates a context with auto-sync on, real value space and decimal raw output.
    pub fn new(
        blackboard: &'a mut dyn BlackboardAccess,
        sync_hook: &'a mut dyn SyncHook,
        endianness: Endianness,
    ) -> Self {
        Self {
            blackboard,
            sync_hook,
            endianness,
            auto_sync: true,
            value_space: ValueSpace::Real,
            output_raw_format: OutputRawFormat::Decimal,
        }
    }

    pub fn with_auto_sync(mut self, auto_sync: bool) -> Self {
        self.auto_sync = auto_sync;
        self
    }

    pub fn with_value_space(mut self, value_space: ValueSpace) -> Self {
        self.value_space = value_space;
        self
    }

    pub fn with_output_raw_format(mut self, format: OutputRawFormat) -> Self {
        self.output_raw_format = format;
        self
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    #[inline]
    pub fn auto_sync(&self) -> bool {
        self.auto_sync
    }

    #[inline]
    pub fn value_space(&self) -> ValueSpace {
        self.value_space
    }

    pub fn set_value_space(&mut self, value_space: ValueSpace) {
        self.value_space = value_space;
    }

    #[inline]
    pub fn output_raw_format(&self) -> OutputRawFormat {
        self.output_raw_format
    }

    pub fn blackboard(&self) -> &dyn BlackboardAccess {
        &*self.blackboard
    }

    pub(crate) fn read_integer(&self, size: usize, offset: usize) -> u32 {
        self.blackboard.read_integer(size, offset, self.endianness)
    }

    pub(crate) fn write_integer(&mut self, value: u32, size: usize, offset: usize) {
        self.blackboard
            .write_integer(value, size, offset, self.endianness);
    }

    pub(crate) fn load_integer(&mut self, value: u32, size: usize, offset: usize) {
        self.blackboard
            .load_integer(value, size, offset, self.endianness);
    }

    /// Runs the sync hook against the blackboard.
    pub fn sync(&mut self) -> Result<(), AccessError> {
        self.sync_hook.sync(&mut *self.blackboard).map_err(|err| {
            log::warn!("parameter sync failed: {}", err);
            AccessError::from(err)
        })
    }

    /// Runs the sync hook only when auto-sync is on.
    pub(crate) fn sync_if_enabled(&mut self) -> Result<(), AccessError> {
        if self.auto_sync { self.sync() } else { Ok(()) }
    }
}
