pub mod array;
pub mod blackboard;
pub mod builder;
pub mod context;
pub mod error;
pub mod helpers;
pub mod navigator;
pub mod parameter_type;
pub mod scalar;
pub mod settings;
pub mod slice;
pub mod store;
pub mod tree;
pub mod types;
pub mod value;

#[cfg(test)]
mod test_support;

pub use array::ArrayParameter;
pub use blackboard::{Blackboard, BlackboardAccess};
pub use builder::ParameterStoreBuilder;
pub use context::{AccessContext, DirtyBlockSync, NoSync, SyncHook};
pub use error::{AccessError, ErrorKind, RangeError, SchemaError, SyncError};
pub use navigator::{MAX_PATH_DEPTH, PathNavigator};
pub use parameter_type::{EnumLiteral, ParameterType, TypeKind};
pub use scalar::Parameter;
pub use settings::SettingsContent;
pub use slice::{ROSlice, RWSlice};
pub use store::{ParameterStore, StoreConfig};
pub use tree::{Block, Element, NodeId, ParameterTree, ParameterTreeBuilder, TypeId};
pub use types::{Endianness, OutputRawFormat, ValueSpace};
pub use value::ParameterValue;

pub mod prelude {
    pub use super::{
        AccessContext, AccessError, ArrayParameter, Blackboard, BlackboardAccess, DirtyBlockSync,
        Element, Endianness, ErrorKind, NoSync, OutputRawFormat, Parameter, ParameterStore,
        ParameterStoreBuilder, ParameterTree, ParameterType, ParameterValue, ROSlice, RWSlice,
        SchemaError, SettingsContent, StoreConfig, SyncError, SyncHook, ValueSpace,
    };
}
