use std::error::Error;
use crate::config::{AddressParts, CacheConfig, SweepConfig, MAX_LINES};
use crate::error::ConfigurationError;
use crate::SetAssociativeCache;

#[test]
fn capacity_is_whole_sets() -> Result<(), Box<dyn Error>> {
    for capacity in [64u64, 96, 1024, 2048, 16384, 32768] {
        for associativity in [1u64, 2, 3, 4, 8] {
            for block_size in [1u64, 4, 8, 16, 32, 64] {
                if let Ok(geometry) = CacheConfig::new(capacity, associativity, block_size).geometry() {
                    assert!(geometry.num_sets() >= 1);
                    assert_eq!(geometry.num_sets() * associativity * block_size, capacity);
                    assert_eq!(geometry.line_count() as u64, capacity / block_size);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn zero_parameters_are_rejected() {
    assert_eq!(SetAssociativeCache::new(0, 1, 1).err(), Some(ConfigurationError::ZeroCapacity));
    assert_eq!(SetAssociativeCache::new(64, 0, 4).err(), Some(ConfigurationError::ZeroAssociativity));
    assert_eq!(SetAssociativeCache::new(64, 1, 0).err(), Some(ConfigurationError::ZeroBlockSize));
}

#[test]
fn block_size_must_be_power_of_two() {
    assert_eq!(
        CacheConfig::new(60, 1, 12).geometry().err(),
        Some(ConfigurationError::BlockSizeNotPowerOfTwo(12))
    );
}

#[test]
fn partial_sets_are_rejected() {
    // A single 2-way set of 64B blocks needs 128B
    assert_eq!(
        CacheConfig::new(64, 2, 64).geometry().err(),
        Some(ConfigurationError::UnevenCapacity { capacity_bytes: 64, associativity: 2, block_size_bytes: 64 })
    );
    assert!(matches!(
        CacheConfig::new(100, 1, 8).geometry(),
        Err(ConfigurationError::UnevenCapacity { .. })
    ));
}

#[test]
fn oversized_geometries_are_rejected() {
    assert!(matches!(
        CacheConfig::new(u64::MAX, u64::MAX, 2).geometry(),
        Err(ConfigurationError::TooLarge { .. })
    ));
    assert!(matches!(
        CacheConfig::new(MAX_LINES * 2, 1, 1).geometry(),
        Err(ConfigurationError::TooLarge { .. })
    ));
    assert!(CacheConfig::new(MAX_LINES, 1, 1).geometry().is_ok());
}

#[test]
fn decompose_with_power_of_two_sets() -> Result<(), Box<dyn Error>> {
    // 32 sets of 8 ways, 64B blocks
    let geometry = CacheConfig::new(16384, 8, 64).geometry()?;
    assert_eq!(geometry.num_sets(), 32);
    assert_eq!(geometry.decompose(0x12345), AddressParts { tag: 0x24, set_index: 13, offset: 5 });
    assert_eq!(geometry.decompose(0), AddressParts { tag: 0, set_index: 0, offset: 0 });
    assert_eq!(
        geometry.decompose(u64::MAX),
        AddressParts { tag: u64::MAX >> 11, set_index: 31, offset: 63 }
    );
    Ok(())
}

#[test]
fn decompose_with_arbitrary_sets() -> Result<(), Box<dyn Error>> {
    // 3 sets of 1 way, 4B blocks
    let geometry = CacheConfig::new(12, 1, 4).geometry()?;
    assert_eq!(geometry.decompose(31), AddressParts { tag: 2, set_index: 1, offset: 3 });
    for address in (0..1000).step_by(7) {
        let parts = geometry.decompose(address);
        let block = address / 4;
        assert_eq!(parts.set_index, block % 3);
        assert_eq!(parts.tag, block / 3);
        assert_eq!(parts.offset, address % 4);
    }
    Ok(())
}

#[test]
fn config_accepts_short_field_names() -> Result<(), Box<dyn Error>> {
    let config: CacheConfig = serde_json::from_str(r#"{"size": 1024, "ways": 2, "line_size": 32}"#)?;
    assert_eq!(config, CacheConfig::new(1024, 2, 32));
    let config: CacheConfig = serde_json::from_str(r#"{"capacity_bytes": 64, "associativity": 1, "block_size_bytes": 4}"#)?;
    assert_eq!(config.geometry()?.num_sets(), 16);
    Ok(())
}

#[test]
fn sweep_config_defaults() -> Result<(), Box<dyn Error>> {
    let config: SweepConfig = serde_json::from_str("{}")?;
    assert_eq!(config, SweepConfig::default());
    assert_eq!(config.sizes, vec![2048, 4096, 8192, 16384, 32768]);
    assert_eq!(config.default_block_size, 64);
    assert_eq!(config.passes, 2);
    let config: SweepConfig = serde_json::from_str(r#"{"sizes": [4096], "passes": 1, "reset_between_passes": true}"#)?;
    assert_eq!(config.sizes, vec![4096]);
    assert_eq!(config.associativities, vec![1, 2, 4, 8]);
    assert!(config.reset_between_passes);
    Ok(())
}

#[test]
fn errors_describe_the_problem() {
    let message = ConfigurationError::UnevenCapacity { capacity_bytes: 100, associativity: 1, block_size_bytes: 8 }.to_string();
    assert!(message.contains("100B"), "{message}");
    assert!(ConfigurationError::BlockSizeNotPowerOfTwo(12).to_string().contains("12"));
}
