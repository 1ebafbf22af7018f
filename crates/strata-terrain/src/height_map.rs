//! Dense per-column scalar map.

/// One `f64` per `(x, z)` column of a chunk, stored row-major by `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    size: usize,
    values: Vec<f64>,
}

impl HeightMap {
    /// Creates a zeroed `size × size` map.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Creates a map by evaluating `f(x, z)` for every column.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(size * size);
        for x in 0..size {
            for z in 0..size {
                values.push(f(x, z));
            }
        }
        Self { size, values }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at column `(x, z)`.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f64 {
        self.values[x * self.size + z]
    }

    /// First column holding a NaN or infinite value.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.values
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i / self.size, i % self.size))
    }

    /// Overwrites the value at column `(x, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: f64) {
        self.values[x * self.size + z] = value;
    }

    /// All values in storage order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(min, max)` over all columns, or `None` for an empty map.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_layout() {
        let map = HeightMap::from_fn(3, |x, z| (x * 10 + z) as f64);
        assert_eq!(map.get(2, 1), 21.0);
        assert_eq!(map.values()[2 * 3 + 1], 21.0);
    }

    #[test]
    fn test_range() {
        let mut map = HeightMap::new(2);
        assert_eq!(map.range(), Some((0.0, 0.0)));
        map.set(1, 0, -2.0);
        map.set(0, 1, 5.0);
        assert_eq!(map.range(), Some((-2.0, 5.0)));
        assert_eq!(HeightMap::new(0).range(), None);
    }

    #[test]
    fn test_first_non_finite() {
        let mut map = HeightMap::new(3);
        assert_eq!(map.first_non_finite(), None);
        map.set(2, 1, f64::INFINITY);
        map.set(2, 2, f64::NAN);
        assert_eq!(map.first_non_finite(), Some((2, 1)));
    }
}
