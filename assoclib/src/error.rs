use std::fmt;

/// Raised when a cache configuration can't describe a whole number of sets
///
/// Only ever produced at construction time. A cache which was built successfully never fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    ZeroCapacity,
    ZeroAssociativity,
    ZeroBlockSize,
    BlockSizeNotPowerOfTwo(u64),
    /// The capacity doesn't divide into sets of `associativity * block_size` bytes. This also
    /// covers a capacity smaller than a single set
    UnevenCapacity {
        capacity_bytes: u64,
        associativity: u64,
        block_size_bytes: u64,
    },
    /// The geometry overflows the integer types used to index it
    TooLarge {
        capacity_bytes: u64,
        associativity: u64,
        block_size_bytes: u64,
    },
    /// A sweep row would sieve more elements than can be held in memory
    SieveTooLarge {
        limit: u64,
        max: u64,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "cache capacity must be greater than zero"),
            Self::ZeroAssociativity => write!(f, "associativity must be at least one way"),
            Self::ZeroBlockSize => write!(f, "block size must be greater than zero"),
            Self::BlockSizeNotPowerOfTwo(size) => {
                write!(f, "block size must be a power of two, got {size}")
            }
            Self::UnevenCapacity { capacity_bytes, associativity, block_size_bytes } => write!(
                f,
                "capacity {capacity_bytes}B is not a whole number of {associativity}-way sets of {block_size_bytes}B blocks"
            ),
            Self::TooLarge { capacity_bytes, associativity, block_size_bytes } => write!(
                f,
                "cache of {capacity_bytes}B with {associativity} ways of {block_size_bytes}B blocks is too large to simulate"
            ),
            Self::SieveTooLarge { limit, max } => {
                write!(f, "sieve over {limit} elements exceeds the limit of {max}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
