use num_traits::{PrimInt, Unsigned};

pub fn align_up<T: PrimInt + Unsigned>(val: T, align: T) -> Option<T> {
  debug_assert!(align.count_ones() == 1, "align must be a power of two");

  let val = val.checked_add(&align)?.checked_sub(&T::one())?;
  let mask = !(align.checked_sub(&T::one())?);

  Some(val & mask)
}

/// Doubles `val`, or returns [None] if the result would not fit in `T`.
pub fn checked_double<T: PrimInt + Unsigned>(val: T) -> Option<T> {
  val.checked_add(&val)
}

/// Doubles `start` (treating zero as one) until it is at least `target`.
///
/// Returns [None] if doubling would pass `max` before reaching `target`.
pub fn double_until<T: PrimInt + Unsigned>(start: T, target: T, max: T) -> Option<T> {
  let mut val = if start.is_zero() { T::one() } else { start };
  while val < target {
    val = checked_double(val).filter(|doubled| *doubled <= max)?;
  }
  Some(val)
}

#[cfg(test)]
mod tests {
  use super::{align_up, checked_double, double_until};

  #[test]
  fn align_up_rounds_to_power_of_two() {
    assert_eq!(align_up(0usize, 8), Some(0));
    assert_eq!(align_up(1usize, 8), Some(8));
    assert_eq!(align_up(8usize, 8), Some(8));
    assert_eq!(align_up(9usize, 16), Some(16));
    assert_eq!(align_up(250u8, 8), None);
  }

  #[test]
  fn checked_double_detects_overflow() {
    assert_eq!(checked_double(64u8), Some(128));
    assert_eq!(checked_double(128u8), None);
  }

  #[test]
  fn double_until_starts_from_one() {
    assert_eq!(double_until(0u32, 5, u32::MAX), Some(8));
    assert_eq!(double_until(3u32, 5, u32::MAX), Some(6));
    assert_eq!(double_until(4u32, 4, u32::MAX), Some(4));
  }

  #[test]
  fn double_until_respects_max() {
    assert_eq!(double_until(1u8, 100, 127), None);
    assert_eq!(double_until(1u8, 100, 128), Some(128));
  }
}
