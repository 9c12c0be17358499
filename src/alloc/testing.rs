use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use crate::alloc::{CStyleAllocator, OutOfMemory};

/// Wraps an allocator, counting calls and optionally refusing every request.
pub struct Tracking<C: CStyleAllocator> {
  inner: C,
  allocations: Cell<usize>,
  reallocations: Cell<usize>,
  frees: Cell<usize>,
  failing: Cell<bool>,
}

impl<C: CStyleAllocator> Tracking<C> {
  pub fn new(inner: C) -> Self {
    Self {
      inner,
      allocations: 0.into(),
      reallocations: 0.into(),
      frees: 0.into(),
      failing: false.into(),
    }
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.set(failing);
  }

  pub fn allocations(&self) -> usize {
    self.allocations.get()
  }

  pub fn reallocations(&self) -> usize {
    self.reallocations.get()
  }

  pub fn frees(&self) -> usize {
    self.frees.get()
  }

  /// Blocks handed out and not yet freed.
  pub fn outstanding(&self) -> usize {
    self.allocations() - self.frees()
  }
}

unsafe impl<C: CStyleAllocator> CStyleAllocator for Tracking<C> {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    if self.failing.get() {
      return Err(OutOfMemory);
    }
    let ptr = self.inner.alloc(layout)?;
    self.allocations.set(self.allocations.get() + 1);
    Ok(ptr)
  }

  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    if self.failing.get() {
      return Err(OutOfMemory);
    }
    let ptr = unsafe { self.inner.realloc(ptr, old_layout, new_size)? };
    self.reallocations.set(self.reallocations.get() + 1);
    Ok(ptr)
  }

  unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
    self.frees.set(self.frees.get() + 1);
    unsafe { self.inner.free(ptr, layout) };
  }
}
