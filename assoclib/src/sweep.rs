use std::thread;
use log::debug;
use serde::Serialize;
use crate::cache::SetAssociativeCache;
use crate::config::{CacheConfig, CacheGeometry, SweepConfig, MAX_SIEVE_LIMIT};
use crate::error::ConfigurationError;
use crate::simulator::Simulator;
use crate::workload::{addresses, SieveWorkload};

/// The cache parameter varied across the columns of a table
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum SweepParameter {
    BlockSize,
    Associativity,
}

impl SweepParameter {
    fn column_label(&self, value: u64) -> String {
        match self {
            SweepParameter::BlockSize => format!("{value}B"),
            SweepParameter::Associativity => format!("{value}-way"),
        }
    }
}

/// Hit rates for one cache size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub size: u64,
    /// One entry per column, each holding the hit rate of every pass
    pub cells: Vec<Vec<f64>>,
}

/// Hit rates of the sieve workload, one row per cache size and one column per parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepTable {
    pub parameter: SweepParameter,
    pub columns: Vec<u64>,
    pub passes: u32,
    pub rows: Vec<SweepRow>,
}

impl SweepTable {
    /// Formats the table as CSV, with a header naming the column value and pass of every cell
    pub fn to_csv(&self) -> String {
        let header = self.columns
            .iter()
            .flat_map(|column| {
                let label = self.parameter.column_label(*column);
                (1..=self.passes).map(move |pass| format!(",{label} pass {pass}"))
            })
            .collect::<String>();
        let mut out = format!("size (bytes){header}\n");
        for row in &self.rows {
            let cells = row.cells.iter().flatten().map(|rate| format!(",{rate}")).collect::<String>();
            out.push_str(&format!("{}{cells}\n", row.size));
        }
        out
    }
}

/// A validated sweep. Every configuration in it is known to be buildable
pub struct Sweep {
    config: SweepConfig,
    block_size_rows: Vec<(u64, Vec<CacheGeometry>)>,
    associativity_rows: Vec<(u64, Vec<CacheGeometry>)>,
}

impl Sweep {
    /// Validates every cache configuration the sweep would build, before anything is simulated
    pub fn new(config: SweepConfig) -> Result<Self, ConfigurationError> {
        // Each row sieves an array with one element per byte of cache
        if let Some(&limit) = config.sizes.iter().find(|&&size| size > MAX_SIEVE_LIMIT) {
            return Err(ConfigurationError::SieveTooLarge { limit, max: MAX_SIEVE_LIMIT });
        }
        let block_size_rows = Self::geometries(&config, &config.block_sizes, |size, block_size| {
            CacheConfig::new(size, config.default_associativity, block_size)
        })?;
        let associativity_rows = Self::geometries(&config, &config.associativities, |size, associativity| {
            CacheConfig::new(size, associativity, config.default_block_size)
        })?;
        Ok(Self {
            config,
            block_size_rows,
            associativity_rows,
        })
    }

    fn geometries<F>(config: &SweepConfig, columns: &[u64], make: F) -> Result<Vec<(u64, Vec<CacheGeometry>)>, ConfigurationError>
    where
        F: Fn(u64, u64) -> CacheConfig,
    {
        config.sizes
            .iter()
            .map(|&size| {
                let row = columns.iter().map(|&value| make(size, value).geometry()).collect::<Result<Vec<_>, _>>()?;
                Ok((size, row))
            })
            .collect()
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs both tables, block size first
    pub fn run(&self) -> Vec<SweepTable> {
        vec![
            self.run_table(SweepParameter::BlockSize),
            self.run_table(SweepParameter::Associativity),
        ]
    }

    /// Runs one table. Rows are independent, so each runs on its own thread with its own caches
    pub fn run_table(&self, parameter: SweepParameter) -> SweepTable {
        let (columns, geometry_rows) = match parameter {
            SweepParameter::BlockSize => (&self.config.block_sizes, &self.block_size_rows),
            SweepParameter::Associativity => (&self.config.associativities, &self.associativity_rows),
        };
        debug!("Sweeping {parameter:?} over {} sizes and {} columns", geometry_rows.len(), columns.len());
        let rows: Vec<SweepRow> = thread::scope(|scope| {
            let handles = geometry_rows
                .iter()
                .map(|(size, geometries)| {
                    scope.spawn(move || SweepRow {
                        size: *size,
                        cells: geometries.iter().map(|g| self.simulate_cell(*size, *g)).collect(),
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });
        SweepTable {
            parameter,
            columns: columns.clone(),
            passes: self.config.passes,
            rows,
        }
    }

    /// Runs the sieve over `limit` elements through one cache, returning each pass's hit rate
    pub fn simulate_cell(&self, limit: u64, geometry: CacheGeometry) -> Vec<f64> {
        let mut simulator = Simulator::with_cache(SetAssociativeCache::with_geometry(geometry));
        let config = &self.config;
        (0..config.passes)
            .map(|pass| {
                if config.reset_between_passes && pass > 0 {
                    simulator.reset();
                }
                let workload = SieveWorkload::new(limit, config.base_address, config.element_size);
                simulator.run_pass(addresses(workload)).hit_rate
            })
            .collect()
    }
}
