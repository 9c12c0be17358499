use core::{alloc::Layout, marker::PhantomData, ptr::{self, NonNull}};

use super::{
  CStyleAllocator, OutOfMemory,
  planner::{GrowthStrategy, capacity_max},
};

/// Storage for up to `capacity` values of `T`, owned together with the allocator that produced it.
///
/// This type only manages memory. It never reads, writes or drops the values in its slots; tracking which slots
/// are initialized is up to the container built on top of it.
pub struct RawBuffer<T, A: CStyleAllocator> {
  ptr: Option<NonNull<T>>,
  capacity: usize,
  allocator: A,
  growth_strategy: GrowthStrategy,
  phantom: PhantomData<T>,
}

// Safety: RawBuffer exclusively owns its allocation, like a Box<[T]>.
unsafe impl<T: Send, A: CStyleAllocator + Send> Send for RawBuffer<T, A> {}
unsafe impl<T: Sync, A: CStyleAllocator + Sync> Sync for RawBuffer<T, A> {}

impl<T, A: CStyleAllocator> RawBuffer<T, A> {
  pub const MAX_CAPACITY: usize = capacity_max::<T>();

  pub const fn new(allocator: A) -> Self {
    Self {
      ptr: None,
      capacity: 0,
      allocator,
      growth_strategy: GrowthStrategy::Exponential,
      phantom: PhantomData,
    }
  }

  /// Allocates exactly `capacity` slots up front.
  pub fn with_capacity(allocator: A, capacity: usize) -> Result<Self, OutOfMemory> {
    let mut buffer = Self::new(allocator);
    buffer.grow_to(capacity)?;
    Ok(buffer)
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn allocator(&self) -> &A {
    &self.allocator
  }

  pub fn growth_strategy(&self) -> GrowthStrategy {
    self.growth_strategy
  }

  pub fn set_growth_strategy(&mut self, growth_strategy: GrowthStrategy) {
    self.growth_strategy = growth_strategy;
  }

  pub fn ptr(&self) -> Option<NonNull<T>> {
    self.ptr
  }

  /// Null while nothing has been allocated.
  pub fn as_ptr(&self) -> *const T {
    self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr().cast_const())
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  /// Ensures there are at least `required` slots, growing according to the [GrowthStrategy].
  ///
  /// On success any pointer previously obtained from this buffer may dangle. On failure nothing changes.
  pub fn reserve(&mut self, required: usize) -> Result<(), OutOfMemory> {
    if required <= self.capacity {
      return Ok(());
    }

    let capacity = self.growth_strategy.plan(self.capacity, required, Self::MAX_CAPACITY)?;
    self.grow_to(capacity)
  }

  /// Ensures there are at least `current + additional` slots, failing if that count is not representable.
  pub fn reserve_additional(&mut self, current: usize, additional: usize) -> Result<(), OutOfMemory> {
    let required = current.checked_add(additional).ok_or(OutOfMemory)?;
    self.reserve(required)
  }

  fn grow_to(&mut self, capacity: usize) -> Result<(), OutOfMemory> {
    if capacity <= self.capacity {
      return Ok(());
    }
    if capacity > Self::MAX_CAPACITY {
      return Err(OutOfMemory);
    }

    let new_layout = Layout::array::<T>(capacity).map_err(|_| OutOfMemory)?;
    let ptr = if new_layout.size() == 0 {
      NonNull::dangling()
    } else {
      match self.current_allocation() {
        // Safety: the block was allocated by this allocator with exactly this layout
        Some((ptr, old_layout)) => unsafe { self.allocator.realloc(ptr.cast(), old_layout, new_layout.size())? }.cast(),
        None => self.allocator.alloc(new_layout)?.cast(),
      }
    };

    self.ptr = Some(ptr);
    self.capacity = capacity;
    Ok(())
  }

  fn current_allocation(&self) -> Option<(NonNull<T>, Layout)> {
    let ptr = self.ptr?;
    let layout = Layout::array::<T>(self.capacity).ok()?;
    (layout.size() != 0).then_some((ptr, layout))
  }
}

impl<T, A: CStyleAllocator> Drop for RawBuffer<T, A> {
  fn drop(&mut self) {
    if let Some((ptr, layout)) = self.current_allocation() {
      // Safety: the block is owned by this buffer and nothing can reference it past this point
      unsafe { self.allocator.free(ptr.cast(), layout) };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::RawBuffer;
  use crate::alloc::{GrowthStrategy, OutOfMemory, StdAlloc, testing::Tracking};

  #[test]
  fn empty_buffer_does_not_allocate() {
    let allocator = Tracking::new(StdAlloc);
    let buffer = RawBuffer::<u64, _>::new(&allocator);
    assert!(buffer.as_ptr().is_null());
    assert_eq!(buffer.capacity(), 0);
    drop(buffer);
    assert_eq!(allocator.allocations(), 0);
    assert_eq!(allocator.frees(), 0);
  }

  #[test]
  fn with_capacity_is_exact() {
    let allocator = Tracking::new(StdAlloc);
    let buffer = RawBuffer::<u32, _>::with_capacity(&allocator, 5).unwrap();
    assert_eq!(buffer.capacity(), 5);
    assert_eq!(allocator.allocations(), 1);
    drop(buffer);
    assert_eq!(allocator.outstanding(), 0);
  }

  #[test]
  fn reserve_grows_by_doubling() {
    let allocator = Tracking::new(StdAlloc);
    let mut buffer = RawBuffer::<u32, _>::with_capacity(&allocator, 4).unwrap();
    buffer.reserve(5).unwrap();
    assert_eq!(buffer.capacity(), 8);
    buffer.reserve(8).unwrap();
    assert_eq!(buffer.capacity(), 8);
    assert_eq!(allocator.reallocations(), 1);
  }

  #[test]
  fn exact_growth_strategy() {
    let mut buffer = RawBuffer::<u32, _>::new(StdAlloc);
    buffer.set_growth_strategy(GrowthStrategy::Exact);
    buffer.reserve(3).unwrap();
    buffer.reserve(5).unwrap();
    assert_eq!(buffer.capacity(), 5);
  }

  #[test]
  fn failed_reserve_leaves_buffer_unchanged() {
    let allocator = Tracking::new(StdAlloc);
    let mut buffer = RawBuffer::<u32, _>::with_capacity(&allocator, 2).unwrap();
    let ptr = buffer.as_ptr();

    allocator.set_failing(true);
    assert_eq!(buffer.reserve(3), Err(OutOfMemory));
    assert_eq!(buffer.capacity(), 2);
    assert_eq!(buffer.as_ptr(), ptr);

    allocator.set_failing(false);
    buffer.reserve(3).unwrap();
    assert_eq!(buffer.capacity(), 4);
  }

  #[test]
  fn oversized_requests_never_reach_the_allocator() {
    let allocator = Tracking::new(StdAlloc);
    let mut buffer = RawBuffer::<u32, _>::new(&allocator);
    let max = RawBuffer::<u32, &Tracking<StdAlloc>>::MAX_CAPACITY;

    assert_eq!(buffer.reserve(max + 1), Err(OutOfMemory));
    assert_eq!(buffer.reserve_additional(usize::MAX, 1), Err(OutOfMemory));
    assert!(RawBuffer::<u32, _>::with_capacity(&allocator, max + 1).is_err());
    assert_eq!(allocator.allocations(), 0);
  }

  #[test]
  fn zero_sized_elements_never_allocate() {
    let allocator = Tracking::new(StdAlloc);
    let mut buffer = RawBuffer::<(), _>::new(&allocator);
    buffer.reserve(1_000_000).unwrap();
    assert!(buffer.capacity() >= 1_000_000);
    assert!(!buffer.as_ptr().is_null());
    drop(buffer);
    assert_eq!(allocator.allocations(), 0);
    assert_eq!(allocator.frees(), 0);
  }
}
