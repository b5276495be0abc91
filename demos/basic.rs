//! Basic example: parameter blackboard fundamentals
//!
//! This example demonstrates:
//! - Declaring types and parameters with the tree builder
//! - Building a store over a fixed-size blackboard
//! - Text access by path, for scalars, whole arrays and single elements
//! - Typed access through `ParameterValue`
//! - Committing dirty blocks to a (simulated) device with `DirtyBlockSync`

use parameter_blackboard::prelude::*;

// ============ Device Layout ============
// The device expects this packed, big endian layout:
//
//   0  volume   u8 [0, 100]
//   1  gains    u8[4]
//   5  balance  s16 [-100, 100]
//   7  mode     enum8 Stereo=0 Mono=1
//   8  trim     Q7.8 (2 bytes)
fn build_tree() -> Result<ParameterTree, SchemaError> {
    let mut tree = ParameterTree::builder("Amp")?;
    let root = tree.root();

    let percent = tree.add_type(
        ParameterType::unsigned_integer("Percent", 1)
            .with_range(0, 100)
            .with_default_value(40),
    )?;
    let gain = tree.add_type(ParameterType::unsigned_integer("Gain", 1).with_array_length(4))?;
    let balance = tree.add_type(ParameterType::signed_integer("Balance", 2).with_range(-100, 100))?;
    let mode = tree.add_type(ParameterType::enumeration(
        "Mode",
        1,
        [("Stereo", 0), ("Mono", 1)],
    ))?;
    let trim = tree.add_type(ParameterType::fixed_point("Trim", 2, 7, 8))?;

    tree.add_parameter(root, "volume", percent)?;
    tree.add_parameter(root, "gains", gain)?;
    tree.add_parameter(root, "balance", balance)?;
    tree.add_parameter(root, "mode", mode)?;
    let output = tree.add_block(root, "Output")?;
    tree.add_parameter(output, "trim", trim)?;

    Ok(tree.build())
}

pub fn main() {
    let tree = build_tree().unwrap();

    // Each dirty 4-byte block is "sent" to the device
    let device = DirtyBlockSync(|addr: usize, block: ROSlice<'_>| {
        let mut bytes = [0u8; 4];
        block.copy_to_slice(&mut bytes);
        println!("  commit @{addr:02}: {bytes:02X?}");
        Ok(())
    });

    // 16-byte image, 4-byte dirty blocks
    let store = ParameterStoreBuilder::new()
        .image_size::<16>()
        .block_size::<4>()
        .block_count::<4>()
        .tree(tree)
        .sync_hook(device)
        .big_endian()
        .build()
        .unwrap();

    // Defaults are loaded without marking anything dirty
    store.set_default_values();
    print!("{}", store.dump());

    // ========== Text access ==========
    println!("set /Amp/volume = 75");
    store.set_value("/Amp/volume", "75").unwrap();

    println!("set /Amp/gains = 10, 20, 30, 40");
    store.set_value("/Amp/gains", "10, 20, 30, 40").unwrap();

    println!("set /Amp/Output/trim = -1.25");
    store.set_value("/Amp/Output/trim", "-1.25").unwrap();

    assert_eq!(store.get_value("/Amp/gains/2").unwrap(), "30");
    assert_eq!(store.get_value("/Amp/Output/trim").unwrap(), "-1.250");

    // ========== Typed access ==========
    store.set_as("/Amp/balance", -20i32).unwrap();
    store.set_as("/Amp/mode", String::from("Mono")).unwrap();
    let gains: Vec<u32> = store.get_values_as("/Amp/gains").unwrap();
    assert_eq!(gains, [10, 20, 30, 40]);

    // ========== Errors ==========
    let err = store.set_value("/Amp/gains/4", "1").unwrap_err();
    println!("error: {err}");
    assert_eq!(err.kind(), ErrorKind::OutOfRange);

    let err = store.set_value("/Amp/gains", "1 2 300").unwrap_err();
    println!("error: {err}");
    assert_eq!(err.kind(), ErrorKind::OutOfRange);

    print!("{}", store.dump());
    store.with_blackboard(|bb| {
        // balance is big endian two's complement
        assert_eq!(bb.as_bytes()[5..7], [0xFF, 0xEC]);
    });
}
