mod config_tests;
mod sweep_tests;

/// Runs every address through the cache, collecting the hit/miss outcomes
pub(crate) fn replay(cache: &mut crate::SetAssociativeCache, addresses: &[u64]) -> Vec<bool> {
    addresses.iter().map(|&a| cache.access(a)).collect()
}
