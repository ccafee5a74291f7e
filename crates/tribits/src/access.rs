use std::fmt;

use crate::BitsError;

/// Inclusive bit range `[msb:lsb]` of a vector.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct BitAccess {
    pub lsb: usize,
    pub msb: usize,
}

impl BitAccess {
    pub fn new(lsb: usize, msb: usize) -> Self {
        debug_assert!(lsb <= msb, "lsb must be less than or equal to msb");
        Self { lsb, msb }
    }

    /// Resolve a descending `[hi:lo]` slice of a `width`-bit vector.
    ///
    /// `hi` is exclusive and defaults to `width`, `lo` is inclusive and
    /// defaults to 0, so `[8:0]` of an 8-bit vector selects every bit.
    pub fn from_slice(hi: Option<usize>, lo: Option<usize>, width: usize) -> Result<Self, BitsError> {
        let hi = hi.unwrap_or(width);
        let lo = lo.unwrap_or(0);
        if hi <= lo || hi > width {
            return Err(BitsError::SliceOutOfRange { hi, lo, width });
        }
        Ok(Self::new(lo, hi - 1))
    }

    pub fn width(&self) -> usize {
        self.msb - self.lsb + 1
    }
}

impl fmt::Display for BitAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lsb == self.msb {
            write!(f, "[{}]", self.lsb)
        } else {
            write!(f, "[{}:{}]", self.msb, self.lsb)
        }
    }
}
