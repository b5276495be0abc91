use bitmaps::{Bits, BitsImpl};

use crate::parameter::{
    Endianness, NoSync, OutputRawFormat, ParameterStore, ParameterTree, SchemaError, StoreConfig,
    SyncHook, ValueSpace,
};

// Builder states
pub struct NeedImageSize;
pub struct NeedBlockSize;
pub struct NeedBlockCount;
pub struct NeedTree;
pub struct NeedSyncHook {
    tree: ParameterTree,
}
pub struct Ready<H> {
    tree: ParameterTree,
    sync_hook: H,
}

/// Typestate builder for [`ParameterStore`].
///
/// The blackboard geometry is fixed at compile time, then the tree and
/// sync hook are supplied; access options may be changed once `Ready`.
pub struct ParameterStoreBuilder<const TS: usize, const BS: usize, const BC: usize, State> {
    state: State,
    config: StoreConfig,
}

// Start the builder
impl ParameterStoreBuilder<0, 0, 0, NeedImageSize> {
    pub fn new() -> Self {
        ParameterStoreBuilder {
            state: NeedImageSize,
            config: StoreConfig::default(),
        }
    }
}

impl Default for ParameterStoreBuilder<0, 0, 0, NeedImageSize> {
    fn default() -> Self {
        Self::new()
    }
}

// Set image size
impl ParameterStoreBuilder<0, 0, 0, NeedImageSize> {
    pub fn image_size<const TS: usize>(self) -> ParameterStoreBuilder<TS, 0, 0, NeedBlockSize> {
        ParameterStoreBuilder {
            state: NeedBlockSize,
            config: self.config,
        }
    }
}

// Set block size
impl<const TS: usize> ParameterStoreBuilder<TS, 0, 0, NeedBlockSize> {
    pub fn block_size<const BS: usize>(self) -> ParameterStoreBuilder<TS, BS, 0, NeedBlockCount> {
        ParameterStoreBuilder {
            state: NeedBlockCount,
            config: self.config,
        }
    }
}

// Set block count
impl<const TS: usize, const BS: usize> ParameterStoreBuilder<TS, BS, 0, NeedBlockCount> {
    /// Set the number of dirty tracking blocks.
    ///
    /// # Panics
    /// Panics at runtime if TS != BS * BC.
    pub fn block_count<const BC: usize>(self) -> ParameterStoreBuilder<TS, BS, BC, NeedTree> {
        assert_eq!(
            TS,
            BS * BC,
            "Image size {} does not match block_size {} * block_count {} = {}",
            TS,
            BS,
            BC,
            BS * BC
        );

        ParameterStoreBuilder {
            state: NeedTree,
            config: self.config,
        }
    }
}

// Set tree
impl<const TS: usize, const BS: usize, const BC: usize>
    ParameterStoreBuilder<TS, BS, BC, NeedTree>
{
    pub fn tree(self, tree: ParameterTree) -> ParameterStoreBuilder<TS, BS, BC, NeedSyncHook> {
        ParameterStoreBuilder {
            state: NeedSyncHook { tree },
            config: self.config,
        }
    }
}

// Set sync hook
impl<const TS: usize, const BS: usize, const BC: usize>
    ParameterStoreBuilder<TS, BS, BC, NeedSyncHook>
{
    pub fn sync_hook<H: SyncHook>(
        self,
        sync_hook: H,
    ) -> ParameterStoreBuilder<TS, BS, BC, Ready<H>> {
        ParameterStoreBuilder {
            state: Ready {
                tree: self.state.tree,
                sync_hook,
            },
            config: self.config,
        }
    }

    /// Changes stay in the blackboard only.
    pub fn no_sync(self) -> ParameterStoreBuilder<TS, BS, BC, Ready<NoSync>> {
        self.sync_hook(NoSync)
    }
}

// Options and build
impl<const TS: usize, const BS: usize, const BC: usize, H>
    ParameterStoreBuilder<TS, BS, BC, Ready<H>>
where
    H: SyncHook,
    BitsImpl<BC>: Bits,
{
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.config.endianness = endianness;
        self
    }

    pub fn big_endian(self) -> Self {
        self.endianness(Endianness::Big)
    }

    pub fn auto_sync(mut self, auto_sync: bool) -> Self {
        self.config.auto_sync = auto_sync;
        self
    }

    pub fn value_space(mut self, value_space: ValueSpace) -> Self {
        self.config.value_space = value_space;
        self
    }

    pub fn output_raw_format(mut self, format: OutputRawFormat) -> Self {
        self.config.output_raw_format = format;
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the final ParameterStore instance.
    ///
    /// Fails if the tree does not fit in the blackboard.
    pub fn build(self) -> Result<ParameterStore<TS, BS, BC, H>, SchemaError> {
        let Ready { tree, sync_hook } = self.state;
        ParameterStore::new(tree, self.config, sync_hook)
    }
}
