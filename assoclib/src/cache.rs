use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::config::{CacheConfig, CacheGeometry};
use crate::error::ConfigurationError;
use crate::recency::RecencyOrder;

/// A single line slot. The tag is meaningless while the line is invalid
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub valid: bool,
    pub tag: u64,
}

/// Snapshot of the cache counters. Can be serialised alongside simulation results
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub accesses: u64,
    /// Misses which displaced a valid line
    pub evictions: u64,
    pub hit_rate: f64,
}

/// A set-associative cache with least recently used replacement within each set
///
/// Lines are stored in one flat vector, with the ways of set `s` occupying
/// `s * ways..(s + 1) * ways`. Each set additionally keeps a recency order over its valid ways.
///
/// On a miss the lowest numbered invalid way is filled first, and only once a set is full does
/// the back of its recency order get evicted. This makes replacement deterministic for any trace.
///
/// The cache only models block residency. Reads and writes behave identically, and there is no
/// backing store, so every `u64` is a legal address
pub struct SetAssociativeCache {
    geometry: CacheGeometry,
    lines: Vec<Line>,
    recency: Vec<RecencyOrder>,
    hits: u64,
    accesses: u64,
    evictions: u64,
}

impl SetAssociativeCache {
    /// Creates an empty cache, failing if the parameters don't form whole sets
    ///
    /// # Arguments
    ///
    /// * `capacity_bytes`: Total data capacity of the cache
    /// * `associativity`: Number of ways per set
    /// * `block_size_bytes`: Size of each line, must be a power of two
    ///
    /// returns: Result<SetAssociativeCache, ConfigurationError>
    pub fn new(capacity_bytes: u64, associativity: u64, block_size_bytes: u64) -> Result<Self, ConfigurationError> {
        Self::from_config(&CacheConfig::new(capacity_bytes, associativity, block_size_bytes))
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::with_geometry(config.geometry()?))
    }

    pub fn with_geometry(geometry: CacheGeometry) -> Self {
        debug!(
            "Building {}B cache: {} sets of {} ways, {}B blocks",
            geometry.capacity_bytes(),
            geometry.num_sets(),
            geometry.associativity(),
            geometry.block_size_bytes()
        );
        Self {
            lines: vec![Line::default(); geometry.line_count()],
            recency: vec![RecencyOrder::with_capacity(geometry.ways()); geometry.num_sets() as usize],
            geometry,
            hits: 0,
            accesses: 0,
            evictions: 0,
        }
    }

    /// Accesses the block containing `address`, returning true on a hit and false on a miss
    ///
    /// On a hit the line becomes the most recently used in its set. On a miss the block is brought
    /// in, replacing the first invalid way or, if the set is full, the least recently used one
    pub fn access(&mut self, address: u64) -> bool {
        self.accesses += 1;
        let parts = self.geometry.decompose(address);
        let ways = self.geometry.ways();
        let set = parts.set_index as usize;
        let lower_bound = set * ways;
        let set_lines = &mut self.lines[lower_bound..lower_bound + ways];
        let order = &mut self.recency[set];

        if let Some(way) = set_lines.iter().position(|line| line.valid && line.tag == parts.tag) {
            order.touch(way);
            self.hits += 1;
            return true;
        }

        let victim = match set_lines.iter().position(|line| !line.valid) {
            Some(way) => way,
            // Full set, so every way is in the recency order
            None => {
                let way = order.least_recent().unwrap_or(0);
                trace!("Set {set}: evicting tag {:#x} for {:#x}", set_lines[way].tag, parts.tag);
                self.evictions += 1;
                way
            }
        };
        set_lines[victim] = Line { valid: true, tag: parts.tag };
        order.touch(victim);
        false
    }

    /// Fraction of accesses which hit, or 0.0 before any access
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    /// Invalidates every line and zeroes the counters. The geometry and allocations are kept
    pub fn reset(&mut self) {
        self.lines.fill(Line::default());
        self.recency.iter_mut().for_each(RecencyOrder::clear);
        self.hits = 0;
        self.accesses = 0;
        self.evictions = 0;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.accesses - self.hits
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses(),
            accesses: self.accesses,
            evictions: self.evictions,
            hit_rate: self.hit_rate(),
        }
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Number of valid lines across all sets. Useful for analysing cache performance or debugging
    pub fn valid_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    /// The ways of a set, in slot order
    ///
    /// # Panics
    ///
    /// If `set` is not below `geometry().num_sets()`
    pub fn set_lines(&self, set: usize) -> &[Line] {
        let ways = self.geometry.ways();
        &self.lines[set * ways..(set + 1) * ways]
    }

    /// The recency order of a set, most recently used way first
    ///
    /// # Panics
    ///
    /// If `set` is not below `geometry().num_sets()`
    pub fn recency_order(&self, set: usize) -> &[usize] {
        self.recency[set].as_slice()
    }
}
