use serde::{Deserialize, Serialize};
use crate::error::ConfigurationError;

/// Upper bound on the number of lines a simulated cache may hold. Anything larger is rejected
/// rather than attempting the allocation
pub const MAX_LINES: u64 = 1 << 28;

/// Largest sieve a sweep will run. The sieve holds one flag per element in memory
pub const MAX_SIEVE_LIMIT: u64 = 1 << 28;

/// A configuration for a single cache, as given by the user
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(alias = "size")]
    pub capacity_bytes: u64,
    #[serde(alias = "ways")]
    pub associativity: u64,
    #[serde(alias = "line_size")]
    pub block_size_bytes: u64,
}

impl CacheConfig {
    pub fn new(capacity_bytes: u64, associativity: u64, block_size_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            associativity,
            block_size_bytes,
        }
    }

    /// Validates the configuration, producing the geometry used to decompose addresses
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigurationError> {
        CacheGeometry::try_from(self)
    }
}

/// An address split into the fields the cache cares about
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressParts {
    pub tag: u64,
    pub set_index: u64,
    /// Offset within the block. Has no effect on hits, the cache only tracks block residency
    pub offset: u64,
}

/// The validated shape of a cache
///
/// Block offsets are always extracted with a mask, as the block size must be a power of two. When
/// the number of sets is also a power of two the set index and tag are masked and shifted out of
/// the block number, otherwise they fall back to modulo and division, which gives the same answer
/// for any set count
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    capacity_bytes: u64,
    associativity: u64,
    block_size_bytes: u64,
    num_sets: u64,
    #[serde(skip)]
    offset_bits: u32,
    #[serde(skip)]
    set_index_bits: Option<u32>,
}

impl TryFrom<&CacheConfig> for CacheGeometry {
    type Error = ConfigurationError;

    fn try_from(config: &CacheConfig) -> Result<Self, Self::Error> {
        let CacheConfig { capacity_bytes, associativity, block_size_bytes } = *config;
        // Zero checks come first, everything below divides by these
        if capacity_bytes == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if associativity == 0 {
            return Err(ConfigurationError::ZeroAssociativity);
        }
        if block_size_bytes == 0 {
            return Err(ConfigurationError::ZeroBlockSize);
        }
        if !block_size_bytes.is_power_of_two() {
            return Err(ConfigurationError::BlockSizeNotPowerOfTwo(block_size_bytes));
        }
        let too_large = ConfigurationError::TooLarge { capacity_bytes, associativity, block_size_bytes };
        let set_bytes = associativity.checked_mul(block_size_bytes).ok_or(too_large)?;
        if capacity_bytes % set_bytes != 0 {
            return Err(ConfigurationError::UnevenCapacity { capacity_bytes, associativity, block_size_bytes });
        }
        let num_sets = capacity_bytes / set_bytes;
        if capacity_bytes / block_size_bytes > MAX_LINES {
            return Err(too_large);
        }
        Ok(Self {
            capacity_bytes,
            associativity,
            block_size_bytes,
            num_sets,
            offset_bits: block_size_bytes.trailing_zeros(),
            set_index_bits: num_sets.is_power_of_two().then(|| num_sets.trailing_zeros()),
        })
    }
}

impl CacheGeometry {
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn associativity(&self) -> u64 {
        self.associativity
    }

    /// Associativity as an index type, bounded by `MAX_LINES`
    pub fn ways(&self) -> usize {
        self.associativity as usize
    }

    pub fn block_size_bytes(&self) -> u64 {
        self.block_size_bytes
    }

    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }

    /// Total number of line slots across all sets
    pub fn line_count(&self) -> usize {
        (self.num_sets * self.associativity) as usize
    }

    pub fn config(&self) -> CacheConfig {
        CacheConfig::new(self.capacity_bytes, self.associativity, self.block_size_bytes)
    }

    /// Splits an address into tag, set index and block offset
    #[inline(always)]
    pub fn decompose(&self, address: u64) -> AddressParts {
        let offset = address & (self.block_size_bytes - 1);
        let block = address >> self.offset_bits;
        let (set_index, tag) = match self.set_index_bits {
            Some(bits) => (block & (self.num_sets - 1), block >> bits),
            None => (block % self.num_sets, block / self.num_sets),
        };
        AddressParts { tag, set_index, offset }
    }
}

/// A sweep of the sieve workload over cache sizes, block sizes, and associativities
///
/// Produces two tables. One varies the block size with `default_associativity`, the other varies
/// the associativity with `default_block_size`. Every row is a cache size, and the sieve runs over
/// an array with as many elements as the cache has bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "SweepConfig::default_sizes")]
    pub sizes: Vec<u64>,
    #[serde(default = "SweepConfig::default_block_sizes")]
    pub block_sizes: Vec<u64>,
    #[serde(default = "SweepConfig::default_associativities")]
    pub associativities: Vec<u64>,
    #[serde(default = "SweepConfig::default_block_size")]
    pub default_block_size: u64,
    #[serde(default = "SweepConfig::default_associativity")]
    pub default_associativity: u64,
    #[serde(default = "SweepConfig::default_passes")]
    pub passes: u32,
    /// Passes after the first see a warm cache unless this is set
    #[serde(default)]
    pub reset_between_passes: bool,
    #[serde(default = "SweepConfig::default_element_size")]
    pub element_size: u64,
    #[serde(default)]
    pub base_address: u64,
}

impl SweepConfig {
    fn default_sizes() -> Vec<u64> {
        vec![2048, 4096, 8192, 16384, 32768]
    }

    fn default_block_sizes() -> Vec<u64> {
        vec![4, 8, 16, 32, 64]
    }

    fn default_associativities() -> Vec<u64> {
        vec![1, 2, 4, 8]
    }

    fn default_block_size() -> u64 {
        64
    }

    fn default_associativity() -> u64 {
        1
    }

    fn default_passes() -> u32 {
        2
    }

    fn default_element_size() -> u64 {
        1
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sizes: Self::default_sizes(),
            block_sizes: Self::default_block_sizes(),
            associativities: Self::default_associativities(),
            default_block_size: Self::default_block_size(),
            default_associativity: Self::default_associativity(),
            passes: Self::default_passes(),
            reset_between_passes: false,
            element_size: Self::default_element_size(),
            base_address: 0,
        }
    }
}
