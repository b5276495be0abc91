//! A `no_std` parameter blackboard: a path-addressable tree of typed
//! parameters backed by a byte-exact image of a subsystem's configuration.
//!
//! The blackboard mirrors the fixed binary layout the subsystem expects,
//! in the subsystem's byte order. Parameters map tree paths such as
//! `/Audio/gains/2` to offsets in that image and convert between text,
//! typed host values and raw integers.
//!
//! # Features
//!
//! - **Typed parameters** - booleans, integers, Qn.m fixed point and enumerations
//! - **Arrays** - whole-array and per-element access by path
//! - **Endianness-aware marshaling** - little or big endian subsystems
//! - **Block-based dirty tracking** - sync hooks only see what changed
//! - **Structured errors** - each node crossed adds its path to the error
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  path   ┌──────────────┐  raw ints  ┌──────────────┐
//! │  ParameterStore  │────────▶│  Parameter / │───────────▶│  Blackboard  │
//! │  set_value()     │         │  Array node  │            │  (dirty bits)│
//! │  get_value()     │◀────────│  + type      │◀───────────│              │
//! └──────────────────┘  text   └──────────────┘            └──────┬───────┘
//!                                                                 │ dirty
//!                                                                 ▼ blocks
//!                                                          ┌──────────────┐
//!                                                          │   SyncHook   │
//!                                                          └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use parameter_blackboard::prelude::*;
//!
//! let mut tree = ParameterTree::builder("Audio").unwrap();
//! let root = tree.root();
//! let gain = tree
//!     .add_type(ParameterType::unsigned_integer("Gain", 1).with_array_length(4))
//!     .unwrap();
//! tree.add_parameter(root, "gains", gain).unwrap();
//!
//! let store = ParameterStoreBuilder::new()
//!     .image_size::<16>()
//!     .block_size::<4>()
//!     .block_count::<4>()
//!     .tree(tree.build())
//!     .no_sync()
//!     .build()
//!     .unwrap();
//!
//! store.set_value("/Audio/gains", "1, 2, 3, 4").unwrap();
//! assert_eq!(store.get_value("/Audio/gains/2").unwrap(), "3");
//! store.with_blackboard(|bb| assert_eq!(bb.as_bytes()[..4], [1, 2, 3, 4]));
//! ```

#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

pub mod parameter;

pub mod prelude {
    pub use crate::parameter::prelude::*;
}
