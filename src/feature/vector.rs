//! Fixed-length boolean page vectors.

use std::fmt;

use bit_vec::BitVec;

use crate::error::{MinerError, Result};

/// One flag per page of a fixed page ordering.
///
/// Positions come from a [`PopularitySchema`](crate::popularity::PopularitySchema)
/// or from the row order of a [`ClusterMatrix`](crate::cluster::ClusterMatrix).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PageVector {
    bits: BitVec,
}

impl PageVector {
    /// Create an all-false vector of `len` pages.
    pub fn new(len: usize) -> Self {
        PageVector {
            bits: BitVec::from_elem(len, false),
        }
    }

    /// Create a vector from explicit flags.
    pub fn from_bools(flags: &[bool]) -> Self {
        PageVector {
            bits: flags.iter().copied().collect(),
        }
    }

    /// Number of pages covered.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Flag at `index`; out-of-range positions read as false.
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).unwrap_or(false)
    }

    /// Set the flag at `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.bits.len() {
            return Err(MinerError::invalid_argument(format!(
                "Page index {index} out of range for vector of {} pages",
                self.bits.len()
            )));
        }
        self.bits.set(index, value);
        Ok(())
    }

    /// Reset every flag to false, keeping the length.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Number of true flags.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| *b).count()
    }

    /// Whether no flag is set.
    pub fn is_all_false(&self) -> bool {
        self.bits.none()
    }

    /// Positions of the true flags, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
    }

    /// Iterate all flags in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter()
    }

    /// Flags as a plain vector.
    pub fn to_bools(&self) -> Vec<bool> {
        self.bits.iter().collect()
    }

    /// OR `other` into `self`. Lengths must match.
    pub fn union_with(&mut self, other: &PageVector) -> Result<()> {
        self.check_len(other)?;
        self.bits.or(&other.bits);
        Ok(())
    }

    /// Sizes of the intersection and union of the true positions.
    pub fn overlap(&self, other: &PageVector) -> Result<(usize, usize)> {
        self.check_len(other)?;
        let mut intersection = 0;
        let mut union = 0;
        for (a, b) in self.bits.iter().zip(other.bits.iter()) {
            if a && b {
                intersection += 1;
            }
            if a || b {
                union += 1;
            }
        }
        Ok((intersection, union))
    }

    fn check_len(&self, other: &PageVector) -> Result<()> {
        if self.len() != other.len() {
            return Err(MinerError::invalid_argument(format!(
                "Page vectors differ in length: {} vs {}",
                self.len(),
                other.len()
            )));
        }
        Ok(())
    }
}

/// Parse a single page flag: `1/0`, `true/false`, `t/f` or `yes/no`, any case.
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Some(true),
        "0" | "false" | "f" | "no" => Some(false),
        _ => None,
    }
}

impl FromIterator<bool> for PageVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        PageVector {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for PageVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageVector({:?})", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_false() {
        let v = PageVector::new(5);
        assert_eq!(v.len(), 5);
        assert!(v.is_all_false());
        assert_eq!(v.count_ones(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut v = PageVector::new(3);
        v.set(1, true).unwrap();
        assert!(!v.get(0));
        assert!(v.get(1));
        assert!(!v.get(7));
        assert!(v.set(3, true).is_err());
        assert_eq!(v.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_clear_keeps_length() {
        let mut v = PageVector::from_bools(&[true, true, false]);
        v.clear();
        assert_eq!(v.len(), 3);
        assert!(v.is_all_false());
    }

    #[test]
    fn test_union_and_overlap() {
        let mut a = PageVector::from_bools(&[true, false, true, false]);
        let b = PageVector::from_bools(&[true, true, true, false]);

        assert_eq!(a.overlap(&b).unwrap(), (2, 3));

        a.union_with(&b).unwrap();
        assert_eq!(a.to_bools(), vec![true, true, true, false]);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn test_length_mismatch() {
        let a = PageVector::new(2);
        let b = PageVector::new(3);
        assert!(a.overlap(&b).is_err());
    }
}
