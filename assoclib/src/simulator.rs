use std::time::{Duration, Instant};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::cache::{CacheStats, SetAssociativeCache};
use crate::config::{CacheConfig, CacheGeometry};
use crate::error::ConfigurationError;

/// The simulator replays address sequences through one cache and collects per pass results.
///
/// It supports calling `run_pass` multiple times. Whether a pass sees the state left behind by the
/// previous one is up to the caller, who can `reset` in between
pub struct Simulator {
    cache: SetAssociativeCache,
    passes: Vec<PassResult>,
    simulation_time: Duration,
}

/// The result of a single replay of an address sequence
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    pub hits: u64,
    pub accesses: u64,
    pub hit_rate: f64,
}

impl PassResult {
    pub fn new(hits: u64, accesses: u64) -> Self {
        Self {
            hits,
            accesses,
            hit_rate: if accesses == 0 { 0.0 } else { hits as f64 / accesses as f64 },
        }
    }
}

/// The result of a simulation. Can be serialised to JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub config: CacheConfig,
    pub geometry: CacheGeometry,
    pub passes: Vec<PassResult>,
    /// Counters of the cache as it stands, accumulated since it was last reset
    pub cache: CacheStats,
}

impl Simulator {
    /// Creates a new simulator with an empty cache for a given configuration
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::with_cache(SetAssociativeCache::from_config(config)?))
    }

    pub fn with_cache(cache: SetAssociativeCache) -> Self {
        Self {
            cache,
            passes: Vec::new(),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Replays a sequence of addresses once, in order
    ///
    /// # Arguments
    ///
    /// * `addresses`: The addresses to access
    ///
    /// returns: the hits and accesses of this pass alone
    pub fn run_pass<I: IntoIterator<Item = u64>>(&mut self, addresses: I) -> PassResult {
        let start = Instant::now();
        let mut hits = 0;
        let mut accesses = 0;
        for address in addresses {
            if self.cache.access(address) {
                hits += 1;
            }
            accesses += 1;
        }
        self.simulation_time += start.elapsed();
        let result = PassResult::new(hits, accesses);
        debug!("Pass {}: {hits}/{accesses} hits ({:.4})", self.passes.len() + 1, result.hit_rate);
        self.passes.push(result);
        result
    }

    /// Replays the same sequence `passes` times, optionally starting each pass from a cold cache
    pub fn run(&mut self, addresses: &[u64], passes: u32, reset_between_passes: bool) -> &[PassResult] {
        for pass in 0..passes {
            if reset_between_passes && pass > 0 {
                self.cache.reset();
            }
            self.run_pass(addresses.iter().copied());
        }
        &self.passes
    }

    /// Clears the cache and any recorded passes
    pub fn reset(&mut self) {
        self.cache.reset();
        self.passes.clear();
    }

    pub fn passes(&self) -> &[PassResult] {
        &self.passes
    }

    pub fn cache(&self) -> &SetAssociativeCache {
        &self.cache
    }

    pub fn geometry(&self) -> &CacheGeometry {
        self.cache.geometry()
    }

    pub fn result(&self) -> SimulationResult {
        SimulationResult {
            config: self.geometry().config(),
            geometry: *self.geometry(),
            passes: self.passes.clone(),
            cache: self.cache.stats(),
        }
    }

    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }
}
