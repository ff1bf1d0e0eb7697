//! # AssocLib
//!
//! Assoclib is a library for studying locality of reference with a simulated set-associative
//! cache
//!
//! It provides a single level cache with per-set least recently used replacement, a simulator for
//! replaying address traces through it, and a sweep over cache geometries driven by a Sieve of
//! Eratosthenes workload
//!
//! The cache itself performs no I/O and never fails once constructed; every other module is glue
//! around `SetAssociativeCache::access`

/// Contains the cache implementation
pub mod cache;

/// Contains definitions for the JSON input formats, and the validated cache geometry they produce
pub mod config;

/// Configuration errors raised when constructing a cache
pub mod error;

/// Trace file access
pub mod io;

/// Per-set recency tracking for LRU replacement
pub mod recency;

/// Contains the simulator used to replay addresses through a cache over multiple passes
pub mod simulator;

/// Runs the sieve workload over a grid of cache configurations
pub mod sweep;

/// Parsing for textual hex address traces
pub mod trace;

/// Address generators which exercise the cache
pub mod workload;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}

#[cfg(test)]
mod test;

pub use cache::{CacheStats, SetAssociativeCache};
pub use config::{CacheConfig, CacheGeometry, SweepConfig};
pub use error::ConfigurationError;
