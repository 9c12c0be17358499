use core::{
  fmt::{self, Debug},
  ops::{Deref, DerefMut},
  slice,
};

use zerocopy::{FromZeros, Immutable, IntoBytes};

use crate::alloc::{
  CStyleAllocator, CloneError, ElementHooks, Empty, GrowthStrategy, OutOfMemory, Trivial, raw::RawBuffer,
};

/// A contiguous, growable sequence of `T` in memory from `A`.
///
/// How elements are copied and released is decided by the [ElementHooks] `H`. Any operation that may grow the
/// sequence takes `&mut self`, so no reference into the old storage can outlive a reallocation.
pub struct GrowableSequence<T, H: ElementHooks<T>, A: CStyleAllocator> {
  buffer: RawBuffer<T, A>,
  length: usize,
  hooks: H,
}

impl<T: Copy, A: CStyleAllocator> GrowableSequence<T, Trivial, A> {
  pub const fn new(allocator: A) -> Self {
    Self::with_hooks(allocator, Trivial)
  }

  pub fn with_capacity(allocator: A, capacity: usize) -> Result<Self, OutOfMemory> {
    Self::with_capacity_and_hooks(allocator, Trivial, capacity)
  }
}

impl<T, H: ElementHooks<T>, A: CStyleAllocator> GrowableSequence<T, H, A> {
  pub const fn with_hooks(allocator: A, hooks: H) -> Self {
    Self {
      buffer: RawBuffer::new(allocator),
      length: 0,
      hooks,
    }
  }

  /// Allocates room for exactly `capacity` elements.
  pub fn with_capacity_and_hooks(allocator: A, hooks: H, capacity: usize) -> Result<Self, OutOfMemory> {
    Ok(Self {
      buffer: RawBuffer::with_capacity(allocator, capacity)?,
      length: 0,
      hooks,
    })
  }

  pub fn len(&self) -> usize {
    self.length
  }

  pub fn capacity(&self) -> usize {
    self.buffer.capacity()
  }

  pub fn is_empty(&self) -> bool {
    self.length == 0
  }

  pub fn is_full(&self) -> bool {
    self.length == self.capacity()
  }

  pub fn allocator(&self) -> &A {
    self.buffer.allocator()
  }

  pub fn hooks(&self) -> &H {
    &self.hooks
  }

  pub fn growth_strategy(&self) -> GrowthStrategy {
    self.buffer.growth_strategy()
  }

  pub fn set_growth_strategy(&mut self, growth_strategy: GrowthStrategy) {
    self.buffer.set_growth_strategy(growth_strategy);
  }

  /// Null until the first allocation.
  pub fn as_ptr(&self) -> *const T {
    self.buffer.as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.buffer.as_mut_ptr()
  }

  pub fn as_slice(&self) -> &[T] {
    match self.buffer.ptr() {
      // Safety: the first `length` slots are initialized
      Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.length) },
      None => &[],
    }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    match self.buffer.ptr() {
      // Safety: the first `length` slots are initialized, and we hold the only reference
      Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.length) },
      None => &mut [],
    }
  }

  /// Ensures room for at least `min_capacity` elements in total.
  pub fn reserve(&mut self, min_capacity: usize) -> Result<(), OutOfMemory> {
    self.buffer.reserve(min_capacity)
  }

  /// Appends `value`, growing the storage if needed.
  ///
  /// If the storage cannot grow, `value` is handed to [ElementHooks::destroy_element] and the sequence is left as
  /// it was.
  pub fn push(&mut self, value: T) -> Result<(), OutOfMemory> {
    if let Err(error) = self.buffer.reserve_additional(self.length, 1) {
      self.hooks.destroy_element(value);
      return Err(error);
    }

    // Safety: capacity > length after the reservation above
    unsafe { self.write_unchecked(value) };
    Ok(())
  }

  /// Appends `value` only if it fits in the current capacity, handing it back otherwise.
  pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
    if self.is_full() {
      return Err(value);
    }

    // Safety: checked above
    unsafe { self.write_unchecked(value) };
    Ok(())
  }

  /// Safety: `length < capacity`
  unsafe fn write_unchecked(&mut self, value: T) {
    unsafe { self.buffer.as_mut_ptr().add(self.length).write(value) };
    self.length += 1;
  }

  /// Removes the last element and hands ownership of it to the caller.
  pub fn pop(&mut self) -> Result<T, Empty> {
    if self.length == 0 {
      return Err(Empty);
    }

    self.length -= 1;
    // Safety: the slot was initialized, and is now outside the live range so it won't be read again
    Ok(unsafe { self.buffer.as_ptr().add(self.length).read() })
  }

  /// Appends copies of every element in `source`.
  ///
  /// Either every element is appended, or none are: if a clone fails part way through, the clones made so far
  /// are destroyed before the error is returned.
  pub fn extend_from_slice(&mut self, source: &[T]) -> Result<(), CloneError<H::CloneError>> {
    if source.is_empty() {
      return Ok(());
    }
    self.buffer.reserve_additional(self.length, source.len())?;

    if H::BITWISE {
      unsafe {
        // Safety: reserved above, and `source` cannot borrow from `self`
        self.buffer.as_mut_ptr().add(self.length).copy_from_nonoverlapping(source.as_ptr(), source.len());
      }
      self.length += source.len();
      return Ok(());
    }

    let start = self.length;
    for element in source {
      match self.hooks.clone_element(element) {
        // Safety: reserved above
        Ok(clone) => unsafe { self.write_unchecked(clone) },
        Err(error) => {
          self.destroy_from(start);
          return Err(CloneError::ElementCloneFailed(error));
        }
      }
    }
    Ok(())
  }

  /// Appends copies of the `length` elements at `source`.
  ///
  /// Storage is grown before anything is read from `source`.
  ///
  /// Safety:
  /// - `source` must be valid for reads of `length` initialized elements
  /// - `source` must not point into this sequence's storage, since growing may release it
  pub unsafe fn extend_from_parts(&mut self, source: *const T, length: usize) -> Result<(), CloneError<H::CloneError>> {
    if length == 0 {
      return Ok(());
    }
    self.extend_from_slice(unsafe { slice::from_raw_parts(source, length) })
  }

  pub fn extend<H2: ElementHooks<T>, A2: CStyleAllocator>(
    &mut self,
    other: &GrowableSequence<T, H2, A2>,
  ) -> Result<(), CloneError<H::CloneError>> {
    self.extend_from_slice(other.as_slice())
  }

  /// Appends `count` zeroed elements.
  pub fn extend_zeroed(&mut self, count: usize) -> Result<(), OutOfMemory>
  where
    T: FromZeros,
  {
    if count == 0 {
      return Ok(());
    }
    self.buffer.reserve_additional(self.length, count)?;
    // Safety: reserved above, and an all-zero bit pattern is a valid T
    unsafe { self.buffer.as_mut_ptr().add(self.length).write_bytes(0, count) };
    self.length += count;
    Ok(())
  }

  /// Returns an independent copy with the same capacity, allocator, hooks and contents.
  pub fn try_clone(&self) -> Result<Self, CloneError<H::CloneError>>
  where
    H: Clone,
    A: Clone,
  {
    let mut clone = Self::with_capacity_and_hooks(self.allocator().clone(), self.hooks.clone(), self.capacity())?;
    clone.set_growth_strategy(self.growth_strategy());
    // dropping `clone` on failure destroys whatever was cloned into it
    clone.extend_from_slice(self.as_slice())?;
    Ok(clone)
  }

  /// Destroys every element, in index order, and releases the storage.
  pub fn free(self) {
    drop(self);
  }

  /// Destroys the elements at `start..length` in index order and shortens the sequence to `start`.
  fn destroy_from(&mut self, start: usize) {
    let end = self.length;
    self.length = start;

    if H::BITWISE {
      return;
    }

    for index in start..end {
      // Safety: the slot was initialized, and is outside the live range so it is read exactly once
      let element = unsafe { self.buffer.as_ptr().add(index).read() };
      self.hooks.destroy_element(element);
    }
  }
}

impl<T: IntoBytes + Immutable, H: ElementHooks<T>, A: CStyleAllocator> GrowableSequence<T, H, A> {
  /// The live elements as raw bytes.
  pub fn as_bytes(&self) -> &[u8] {
    self.as_slice().as_bytes()
  }
}

impl<T, H: ElementHooks<T>, A: CStyleAllocator> Drop for GrowableSequence<T, H, A> {
  fn drop(&mut self) {
    self.destroy_from(0);
  }
}

impl<T, H: ElementHooks<T>, A: CStyleAllocator> Deref for GrowableSequence<T, H, A> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T, H: ElementHooks<T>, A: CStyleAllocator> DerefMut for GrowableSequence<T, H, A> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T, H: ElementHooks<T>, A: CStyleAllocator> AsRef<[T]> for GrowableSequence<T, H, A> {
  fn as_ref(&self) -> &[T] {
    self
  }
}

impl<T: Debug, H: ElementHooks<T>, A: CStyleAllocator> Debug for GrowableSequence<T, H, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.as_slice().fmt(f)
  }
}
