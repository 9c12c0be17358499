use core::{cmp, mem::size_of};

use num_traits::{PrimInt, Unsigned};
use thiserror::Error;

use crate::num::double_until;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("requested capacity exceeds the representable maximum")]
pub struct CapacityOverflow;

/// The largest element count of `T` that can be described by a single allocation.
pub const fn capacity_max<T>() -> usize {
  match size_of::<T>() {
    0 => usize::MAX,
    size => isize::MAX as usize / size,
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStrategy {
  /// Grow the capacity by exactly the amount that is needed
  Exact,
  /// Double the capacity until the requirement fits, saturating at the maximum instead of failing
  #[default]
  Exponential,
}

impl GrowthStrategy {
  /// Picks the capacity to grow to so that at least `required` elements fit.
  ///
  /// `current` is returned unchanged when it already satisfies `required`.
  pub fn plan<N: PrimInt + Unsigned>(&self, current: N, required: N, max: N) -> Result<N, CapacityOverflow> {
    if required <= current {
      return Ok(current);
    }
    if required > max {
      return Err(CapacityOverflow);
    }

    match self {
      GrowthStrategy::Exact => Ok(required),
      GrowthStrategy::Exponential => {
        let two = N::one() + N::one();
        if required > max / two {
          return Ok(max);
        }
        Ok(double_until(cmp::max(current, N::one()), required, max).unwrap_or(max))
      }
    }
  }
}
