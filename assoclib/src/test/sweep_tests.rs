use std::error::Error;
use crate::cache::SetAssociativeCache;
use crate::config::{CacheConfig, SweepConfig, MAX_LINES, MAX_SIEVE_LIMIT};
use crate::error::ConfigurationError;
use crate::sweep::{Sweep, SweepParameter, SweepRow, SweepTable};
use crate::workload::{addresses, SieveWorkload};

fn small_sweep() -> SweepConfig {
    SweepConfig {
        sizes: vec![64, 128, 256],
        block_sizes: vec![4, 8],
        associativities: vec![1, 2],
        default_block_size: 8,
        ..SweepConfig::default()
    }
}

#[test]
fn sweep_produces_both_tables() -> Result<(), Box<dyn Error>> {
    let tables = Sweep::new(small_sweep())?.run();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].parameter, SweepParameter::BlockSize);
    assert_eq!(tables[0].columns, vec![4, 8]);
    assert_eq!(tables[1].parameter, SweepParameter::Associativity);
    for table in &tables {
        assert_eq!(table.rows.iter().map(|r| r.size).collect::<Vec<_>>(), vec![64, 128, 256]);
        for row in &table.rows {
            assert_eq!(row.cells.len(), 2);
            for cell in &row.cells {
                assert_eq!(cell.len(), 2);
                assert!(cell.iter().all(|rate| (0.0..=1.0).contains(rate)));
            }
        }
    }
    Ok(())
}

#[test]
fn cells_match_a_direct_replay() -> Result<(), Box<dyn Error>> {
    let sweep = Sweep::new(small_sweep())?;
    let table = sweep.run_table(SweepParameter::Associativity);
    // Row 128B, column 2-way with 8B blocks
    let mut cache = SetAssociativeCache::new(128, 2, 8)?;
    let trace: Vec<u64> = addresses(SieveWorkload::new(128, 0, 1)).collect();
    let mut expected = Vec::new();
    for _ in 0..2 {
        let (hits_before, accesses_before) = (cache.hits(), cache.accesses());
        for &address in &trace {
            cache.access(address);
        }
        expected.push((cache.hits() - hits_before) as f64 / (cache.accesses() - accesses_before) as f64);
    }
    assert_eq!(table.rows[1].cells[1], expected);
    Ok(())
}

#[test]
fn cold_passes_are_identical() -> Result<(), Box<dyn Error>> {
    let sweep = Sweep::new(SweepConfig { passes: 3, reset_between_passes: true, ..small_sweep() })?;
    for table in sweep.run() {
        for cell in table.rows.iter().flat_map(|r| r.cells.iter()) {
            assert_eq!(cell.len(), 3);
            assert!(cell.iter().all(|rate| *rate == cell[0]));
        }
    }
    Ok(())
}

#[test]
fn invalid_configurations_fail_before_running() {
    // 100B can't hold whole 8B blocks
    let config = SweepConfig { sizes: vec![64, 100], ..small_sweep() };
    assert!(matches!(Sweep::new(config), Err(ConfigurationError::UnevenCapacity { .. })));
    let config = SweepConfig { associativities: vec![0], ..small_sweep() };
    assert_eq!(Sweep::new(config).err().map(|e| e.to_string()), Some(ConfigurationError::ZeroAssociativity.to_string()));
}

#[test]
fn sweep_geometry_matches_config() -> Result<(), Box<dyn Error>> {
    let sweep = Sweep::new(small_sweep())?;
    let geometry = CacheConfig::new(256, 1, 4).geometry()?;
    let rates = sweep.simulate_cell(256, geometry);
    assert_eq!(rates.len(), sweep.config().passes as usize);
    Ok(())
}

#[test]
fn table_renders_as_csv() {
    let table = SweepTable {
        parameter: SweepParameter::Associativity,
        columns: vec![1, 2],
        passes: 1,
        rows: vec![
            SweepRow { size: 64, cells: vec![vec![0.5], vec![0.25]] },
            SweepRow { size: 128, cells: vec![vec![1.0], vec![0.75]] },
        ],
    };
    assert_eq!(
        table.to_csv(),
        "size (bytes),1-way pass 1,2-way pass 1\n64,0.5,0.25\n128,1,0.75\n"
    );
    let table = SweepTable {
        parameter: SweepParameter::BlockSize,
        columns: vec![4],
        passes: 2,
        rows: Vec::new(),
    };
    assert_eq!(table.to_csv(), "size (bytes),4B pass 1,4B pass 2\n");
}

#[test]
fn oversized_sieves_fail_before_running() -> Result<(), Box<dyn Error>> {
    // 2^28 lines of 4KiB is a buildable cache, but sieving 2^40 elements isn't
    let size = 1u64 << 40;
    let block_size = 4096;
    assert_eq!(CacheConfig::new(size, 1, block_size).geometry()?.line_count() as u64, MAX_LINES);
    let config = SweepConfig {
        sizes: vec![64, size],
        block_sizes: vec![block_size],
        associativities: vec![1],
        default_block_size: block_size,
        ..SweepConfig::default()
    };
    assert_eq!(
        Sweep::new(config).err(),
        Some(ConfigurationError::SieveTooLarge { limit: size, max: MAX_SIEVE_LIMIT })
    );
    Ok(())
}
