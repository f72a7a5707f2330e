//! Bit-packed row mask (1 bit per row)
//!
//! Predicates report the rows they flag as a bitmap, and the join keeps the
//! matched rows through one. 1 = row selected, 0 = row not selected.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Each u64 holds 64 row bits (LSB = bit 0)
    bits: Vec<u64>,
    /// Total number of rows (not bits)
    len: usize,
}

impl Bitmap {
    /// Create bitmap with all bits set to 0 (no row selected)
    pub fn new_all_clear(len: usize) -> Self {
        let words = (len + 63) / 64;
        Self {
            bits: vec![0u64; words],
            len,
        }
    }

    /// Build a bitmap by evaluating `f` for every row index.
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let mut bm = Self::new_all_clear(len);
        for i in 0..len {
            if f(i) {
                bm.set(i, true);
            }
        }
        bm
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn set(&mut self, i: usize, v: bool) {
        debug_assert!(i < self.len);
        let w = i >> 6;
        let b = i & 63;
        let mask = 1u64 << b;
        if v {
            self.bits[w] |= mask;
        } else {
            self.bits[w] &= !mask;
        }
    }

    /// Number of selected rows
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True if any row is selected
    pub fn any(&self) -> bool {
        self.bits.iter().any(|&w| w != 0)
    }

    /// Indices of the selected rows, ascending
    pub fn ones(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.count_ones());
        for (w, &word) in self.bits.iter().enumerate() {
            let mut word = word;
            while word != 0 {
                let b = word.trailing_zeros() as usize;
                out.push((w << 6) + b);
                word &= word - 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_all_rows() {
        let bm = Bitmap::from_fn(100, |_| true);
        assert_eq!(bm.len(), 100);
        assert_eq!(bm.count_ones(), 100);
        assert_eq!(bm.ones(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_clear() {
        let bm = Bitmap::new_all_clear(100);
        assert_eq!(bm.len(), 100);
        assert!(!bm.any());
    }

    #[test]
    fn test_set_clears_one_bit() {
        let mut bm = Bitmap::from_fn(100, |_| true);
        bm.set(50, false);
        let ones = bm.ones();
        assert!(!ones.contains(&50));
        assert!(ones.contains(&49));
        assert!(ones.contains(&51));
        assert_eq!(bm.count_ones(), 99);
    }

    #[test]
    fn test_ones_across_words() {
        let bm = Bitmap::from_fn(130, |i| i == 3 || i == 64 || i == 129);
        assert_eq!(bm.ones(), vec![3, 64, 129]);
    }

    #[test]
    fn test_empty() {
        let bm = Bitmap::new_all_clear(0);
        assert!(bm.is_empty());
        assert!(!bm.any());
        assert!(bm.ones().is_empty());
    }
}
