/// The recency order of one set, most recently used way first
///
/// Only valid ways appear in the order, so a freshly built or reset set has an empty order and
/// the order is full exactly when every way of the set is valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyOrder {
    ways: Vec<usize>,
}

impl RecencyOrder {
    pub fn with_capacity(ways: usize) -> Self {
        Self {
            ways: Vec::with_capacity(ways),
        }
    }

    /// Marks a way as the most recently used, inserting it if it wasn't tracked yet
    pub fn touch(&mut self, way: usize) {
        match self.ways.iter().position(|&w| w == way) {
            Some(0) => {}
            Some(pos) => self.ways[..=pos].rotate_right(1),
            None => self.ways.insert(0, way),
        }
    }

    /// The way untouched for the longest time, if any way is tracked
    pub fn least_recent(&self) -> Option<usize> {
        self.ways.last().copied()
    }

    pub fn clear(&mut self) {
        self.ways.clear();
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.ways
    }
}
