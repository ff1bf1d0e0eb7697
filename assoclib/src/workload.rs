use serde::Serialize;

/// Whether an access reads or writes. The cache treats both identically
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum AccessKind {
    Read,
    Write,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryAccess {
    pub address: u64,
    pub kind: AccessKind,
}

#[derive(Debug, Copy, Clone)]
enum Phase {
    /// Reading `is_composite[m]`
    Sweep,
    /// Marking the multiples of the current prime, `k` is the next multiple
    Mark { k: u64, write_pending: bool },
    Done,
}

/// The memory accesses of a Sieve of Eratosthenes over `is_composite[0..=limit]`
///
/// For every `m` in `2..=limit` the sieve reads `is_composite[m]`. When `m` is prime, each multiple
/// `k` from `m * m` up to `limit` is read, marked, and written back, giving two accesses per
/// multiple.
///
/// Element `i` of the array lives at `base_address + i * element_size`. The addresses are abstract
/// integers, the array only exists as the marking state needed to reproduce the access pattern
pub struct SieveWorkload {
    is_composite: Vec<bool>,
    limit: u64,
    base_address: u64,
    element_size: u64,
    m: u64,
    phase: Phase,
}

impl SieveWorkload {
    pub fn new(limit: u64, base_address: u64, element_size: u64) -> Self {
        Self {
            is_composite: vec![false; limit as usize + 1],
            limit,
            base_address,
            element_size,
            m: 2,
            phase: Phase::Sweep,
        }
    }

    fn address_of(&self, index: u64) -> u64 {
        self.base_address.wrapping_add(index.wrapping_mul(self.element_size))
    }

    fn read(&self, index: u64) -> MemoryAccess {
        MemoryAccess { address: self.address_of(index), kind: AccessKind::Read }
    }

    /// Moves on to the next `m` once marking is over
    fn finish_marking(&mut self) {
        self.m += 1;
        self.phase = Phase::Sweep;
    }
}

impl Iterator for SieveWorkload {
    type Item = MemoryAccess;

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Sweep => {
                if self.m > self.limit {
                    self.phase = Phase::Done;
                    return None;
                }
                let m = self.m;
                let access = self.read(m);
                let first_multiple = m.checked_mul(m).filter(|&k| k <= self.limit);
                match first_multiple {
                    Some(k) if !self.is_composite[m as usize] => {
                        self.phase = Phase::Mark { k, write_pending: false };
                    }
                    _ => self.m += 1,
                }
                Some(access)
            }
            Phase::Mark { k, write_pending: false } => {
                self.is_composite[k as usize] = true;
                self.phase = Phase::Mark { k, write_pending: true };
                Some(self.read(k))
            }
            Phase::Mark { k, write_pending: true } => {
                let access = MemoryAccess { address: self.address_of(k), kind: AccessKind::Write };
                match k.checked_add(self.m).filter(|&next| next <= self.limit) {
                    Some(next) => self.phase = Phase::Mark { k: next, write_pending: false },
                    None => self.finish_marking(),
                }
                Some(access)
            }
            Phase::Done => None,
        }
    }
}

/// Just the addresses of a workload, which is all the cache needs
pub fn addresses<I: IntoIterator<Item = MemoryAccess>>(accesses: I) -> impl Iterator<Item = u64> {
    accesses.into_iter().map(|access| access.address)
}
