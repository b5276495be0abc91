use alloc::{format, string::String, vec::Vec};
use core::cell::RefCell;

use crate::parameter::{
    AccessContext, AccessError, Blackboard, Element, Endianness, OutputRawFormat, ParameterTree,
    ParameterValue, PathNavigator, SchemaError, SyncHook, ValueSpace,
};

/// Access settings applied to every operation of a [`ParameterStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Byte order of the subsystem.
    pub endianness: Endianness,
    /// Run the sync hook after each successful write.
    pub auto_sync: bool,
    pub value_space: ValueSpace,
    pub output_raw_format: OutputRawFormat,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            auto_sync: true,
            value_space: ValueSpace::Real,
            output_raw_format: OutputRawFormat::Decimal,
        }
    }
}

struct StoreState<const TS: usize, const BS: usize, const BC: usize, H>
where
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    blackboard: Blackboard<TS, BS, BC>,
    sync_hook: H,
}

/// A parameter tree bound to its blackboard and sync hook.
///
/// Every operation runs inside a critical section, so a store can be
/// shared between an application task and an interrupt handler.
///
/// # Const Generics
/// - `TS`: Blackboard size in bytes
/// - `BS`: Dirty tracking block size
/// - `BC`: Block count (must equal `TS / BS`)
pub struct ParameterStore<const TS: usize, const BS: usize, const BC: usize, H>
where
    H: SyncHook,
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    tree: ParameterTree,
    config: StoreConfig,
    state: critical_section::Mutex<RefCell<StoreState<TS, BS, BC, H>>>,
}

impl<const TS: usize, const BS: usize, const BC: usize, H> ParameterStore<TS, BS, BC, H>
where
    H: SyncHook,
    bitmaps::BitsImpl<BC>: bitmaps::Bits,
{
    /// Binds `tree` to a zeroed blackboard.
    ///
    /// Fails if the tree lays out more bytes than the blackboard holds.
    pub fn new(
        tree: ParameterTree,
        config: StoreConfig,
        sync_hook: H,
    ) -> Result<Self, SchemaError> {
        if tree.footprint() > TS {
            return Err(SchemaError::FootprintTooLarge);
        }

        Ok(Self {
            tree,
            config,
            state: critical_section::Mutex::new(RefCell::new(StoreState {
                blackboard: Blackboard::new(),
                sync_hook,
            })),
        })
    }

    #[inline]
    pub fn tree(&self) -> &ParameterTree {
        &self.tree
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `f` with an access context over the blackboard.
    pub fn with_context<R>(
        &self,
        f: impl FnOnce(&ParameterTree, &mut AccessContext<'_>) -> R,
    ) -> R {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let StoreState {
                blackboard,
                sync_hook,
            } = &mut *state;
            let mut ctx = AccessContext::new(blackboard, sync_hook, self.config.endianness)
                .with_auto_sync(self.config.auto_sync)
                .with_value_space(self.config.value_space)
                .with_output_raw_format(self.config.output_raw_format);
            f(&self.tree, &mut ctx)
        })
    }

    /// Read-only access to the blackboard image.
    pub fn with_blackboard<R>(&self, f: impl FnOnce(&Blackboard<TS, BS, BC>) -> R) -> R {
        critical_section::with(|cs| f(&self.state.borrow_ref(cs).blackboard))
    }

    /// Reads or writes the value at `path` as text.
    pub fn access_value(
        &self,
        path: &str,
        value: &mut String,
        is_set: bool,
    ) -> Result<(), AccessError> {
        self.with_context(|tree, ctx| tree.access_value(path, value, is_set, ctx))
    }

    pub fn set_value(&self, path: &str, value: &str) -> Result<(), AccessError> {
        log::debug!("set {} = {}", path, value);
        let mut value = String::from(value);
        self.access_value(path, &mut value, true)
    }

    pub fn get_value(&self, path: &str) -> Result<String, AccessError> {
        let mut value = String::new();
        self.access_value(path, &mut value, false)?;
        log::debug!("get {} = {}", path, value);
        Ok(value)
    }

    /// Reads a scalar parameter as a typed host value.
    pub fn get_as<T: ParameterValue>(&self, path: &str) -> Result<T, AccessError> {
        self.with_context(|tree, ctx| {
            let Element::Parameter(param) = resolve_exact(tree, path)? else {
                return Err(not_a(path, "scalar parameter"));
            };
            param.read_as(ctx)
        })
    }

    /// Writes a scalar parameter from a typed host value.
    pub fn set_as<T: ParameterValue>(&self, path: &str, value: T) -> Result<(), AccessError> {
        self.with_context(|tree, ctx| {
            let Element::Parameter(param) = resolve_exact(tree, path)? else {
                return Err(not_a(path, "scalar parameter"));
            };
            log::debug!("set {} (typed)", path);
            param.write_as(&value, ctx)
        })
    }

    /// Reads every element of an array parameter.
    pub fn get_values_as<T: ParameterValue>(&self, path: &str) -> Result<Vec<T>, AccessError> {
        self.with_context(|tree, ctx| {
            let Element::Array(array) = resolve_exact(tree, path)? else {
                return Err(not_a(path, "array parameter"));
            };
            let mut values = Vec::new();
            array.access_values(&mut values, false, ctx)?;
            Ok(values)
        })
    }

    /// Writes every element of an array parameter.
    ///
    /// # Panics
    /// If `values` does not hold exactly one value per element.
    pub fn set_values_as<T: ParameterValue>(
        &self,
        path: &str,
        mut values: Vec<T>,
    ) -> Result<(), AccessError> {
        self.with_context(|tree, ctx| {
            let Element::Array(array) = resolve_exact(tree, path)? else {
                return Err(not_a(path, "array parameter"));
            };
            log::debug!("set {} ({} typed values)", path, values.len());
            array.access_values(&mut values, true, ctx)
        })
    }

    /// Loads every parameter's default value without marking dirty.
    pub fn set_default_values(&self) {
        log::debug!("loading default values");
        self.with_context(|tree, ctx| tree.set_default_values(ctx));
    }

    /// Renders every parameter as one `path = value` line.
    pub fn dump(&self) -> String {
        self.with_context(|tree, ctx| tree.dump(ctx))
    }

    /// Runs the sync hook regardless of the auto-sync setting.
    pub fn sync(&self) -> Result<(), AccessError> {
        self.with_context(|_, ctx| ctx.sync())
    }
}

/// Resolves `path` to a parameter with no trailing components.
fn resolve_exact<'t>(tree: &'t ParameterTree, path: &str) -> Result<Element<'t>, AccessError> {
    let mut navigator = PathNavigator::new(path)?;
    let element = tree.resolve(&mut navigator)?;
    if navigator.next().is_some() {
        return Err(AccessError::path_not_found(format!(
            "Path not found: {}",
            navigator.current_path()
        )));
    }
    Ok(element)
}

fn not_a(path: &str, what: &str) -> AccessError {
    AccessError::type_mismatch(format!("{path} is not a {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{string::ToString, vec};
    use crate::parameter::{
        BlackboardAccess, ErrorKind, NoSync, ParameterStoreBuilder,
        test_support::{FailingSync, RecordingSync, SAMPLE_FOOTPRINT, sample_tree},
    };

    type SampleStore<H> = ParameterStore<32, 8, 4, H>;

    fn store() -> SampleStore<RecordingSync> {
        ParameterStoreBuilder::new()
            .image_size::<32>()
            .block_size::<8>()
            .block_count::<4>()
            .tree(sample_tree())
            .sync_hook(RecordingSync::default())
            .build()
            .unwrap()
    }

    fn sync_calls(store: &SampleStore<RecordingSync>) -> usize {
        critical_section::with(|cs| store.state.borrow_ref(cs).sync_hook.calls)
    }

    #[test]
    fn text_access_by_path() {
        let store = store();

        store.set_value("/Audio/volume", "75").unwrap();
        store.set_value("/Audio/mode", "Mono").unwrap();
        store.set_value("/Audio/gains", "1,2,3,4").unwrap();
        store.set_value("/Audio/Mixer/trim", "-1.5").unwrap();

        assert_eq!(store.get_value("/Audio/volume").unwrap(), "75");
        assert_eq!(store.get_value("/Audio/mode").unwrap(), "Mono");
        assert_eq!(store.get_value("/Audio/gains").unwrap(), "1 2 3 4");
        assert_eq!(store.get_value("/Audio/gains/3").unwrap(), "4");
        assert_eq!(store.get_value("/Audio/Mixer/trim").unwrap(), "-1.500");
        assert_eq!(sync_calls(&store), 4);
    }

    #[test]
    fn text_access_errors_carry_paths() {
        let store = store();

        let err = store.set_value("/Audio/gains/4", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.message(), "Provided index out of range (max is 3)");

        let err = store.set_value("/Audio/gains", "1 2 x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(err.trail(), ["/Audio/gains/2"]);
        assert_eq!(store.get_value("/Audio/gains").unwrap(), "1 2 0 0");

        let err = store.set_value("/Audio/volume", "200").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.trail(), ["/Audio/volume"]);

        let err = store.get_value("/Audio/volume/1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert_eq!(sync_calls(&store), 0);
    }

    #[test]
    fn big_endian_layout() {
        let store: SampleStore<NoSync> = ParameterStoreBuilder::new()
            .image_size::<32>()
            .block_size::<8>()
            .block_count::<4>()
            .tree(sample_tree())
            .no_sync()
            .endianness(Endianness::Big)
            .build()
            .unwrap();

        store.set_value("/Audio/Mixer/levels/0", "0x0102").unwrap();
        store.set_value("/Audio/Mixer/coeffs/1", "0x0A0B0C0D").unwrap();
        store.with_blackboard(|bb| {
            assert_eq!(bb.as_bytes()[9..11], [0x01, 0x02]);
            assert_eq!(bb.as_bytes()[23..27], [0x0A, 0x0B, 0x0C, 0x0D]);
        });
        assert_eq!(store.get_value("/Audio/Mixer/levels/0").unwrap(), "258");
    }

    #[test]
    fn typed_access() {
        let store = store();

        store.set_as("/Audio/balance", -42i32).unwrap();
        assert_eq!(store.get_as::<i32>("/Audio/balance").unwrap(), -42);
        assert_eq!(store.get_as::<f64>("/Audio/balance").unwrap(), -42.0);

        store.set_as("/Audio/enabled", true).unwrap();
        assert!(store.get_as::<bool>("/Audio/enabled").unwrap());

        store
            .set_values_as("/Audio/Mixer/levels", vec![-1i32, 0, 1])
            .unwrap();
        assert_eq!(
            store.get_values_as::<i32>("/Audio/Mixer/levels").unwrap(),
            [-1, 0, 1]
        );
        assert_eq!(
            store.get_values_as::<String>("/Audio/Mixer/flags").unwrap(),
            ["0", "0"]
        );

        let err = store.get_as::<u32>("/Audio/gains").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = store.get_values_as::<u32>("/Audio/volume").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = store.get_as::<u32>("/Audio/Mixer").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn defaults_do_not_dirty_or_sync() {
        let store = store();
        store.set_default_values();

        assert_eq!(store.get_value("/Audio/volume").unwrap(), "50");
        assert!(store.with_blackboard(|bb| !bb.any_dirty()));
        assert!(store.dump().starts_with("/Audio/volume = 50\n/Audio/gains = 0 0 0 0\n"));
        assert_eq!(sync_calls(&store), 0);
    }

    #[test]
    fn manual_sync_with_auto_sync_off() {
        let store: SampleStore<RecordingSync> = ParameterStoreBuilder::new()
            .image_size::<32>()
            .block_size::<8>()
            .block_count::<4>()
            .tree(sample_tree())
            .sync_hook(RecordingSync::default())
            .auto_sync(false)
            .build()
            .unwrap();

        store.set_value("/Audio/volume", "1").unwrap();
        store.set_value("/Audio/Mixer/coeffs", "1 2").unwrap();
        assert_eq!(sync_calls(&store), 0);
        assert!(store.with_blackboard(|bb| bb.any_dirty()));

        store.sync().unwrap();
        let dirty_blocks =
            critical_section::with(|cs| store.state.borrow_ref(cs).sync_hook.dirty_blocks);
        assert_eq!(dirty_blocks, 3);
        assert!(store.with_blackboard(|bb| !bb.any_dirty()));
    }

    #[test]
    fn sync_failure_is_reported_after_write() {
        let store: SampleStore<FailingSync> = ParameterStoreBuilder::new()
            .image_size::<32>()
            .block_size::<8>()
            .block_count::<4>()
            .tree(sample_tree())
            .sync_hook(FailingSync::new("device offline"))
            .build()
            .unwrap();

        let err = store.set_value("/Audio/gains/1", "9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyncFailure);
        assert_eq!(err.to_string(), "device offline /Audio/gains");
        assert_eq!(store.get_value("/Audio/gains/1").unwrap(), "9");
    }

    #[test]
    fn raw_value_space_store() {
        let store: SampleStore<NoSync> = ParameterStoreBuilder::new()
            .image_size::<32>()
            .block_size::<8>()
            .block_count::<4>()
            .tree(sample_tree())
            .no_sync()
            .value_space(ValueSpace::Raw)
            .output_raw_format(OutputRawFormat::Hexadecimal)
            .build()
            .unwrap();

        store.set_value("/Audio/mode", "0xFF").unwrap();
        assert_eq!(store.get_value("/Audio/mode").unwrap(), "0xFF");
        assert_eq!(store.get_value("/Audio/balance").unwrap(), "0x0000");
    }

    #[test]
    fn tree_larger_than_blackboard_is_rejected() {
        let result = ParameterStore::<16, 8, 2, NoSync>::new(
            sample_tree(),
            StoreConfig::default(),
            NoSync,
        );
        assert!(SAMPLE_FOOTPRINT > 16);
        assert!(matches!(result, Err(SchemaError::FootprintTooLarge)));
    }
}
