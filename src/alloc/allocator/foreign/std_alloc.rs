use core::{alloc::Layout, ptr::NonNull};

use crate::alloc::{CStyleAllocator, OutOfMemory};

extern crate alloc as rust_alloc;

/// The Rust global allocator.
#[derive(Default, Debug, Clone, Copy)]
pub struct StdAlloc;

unsafe impl CStyleAllocator for StdAlloc {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    let ptr = unsafe { rust_alloc::alloc::alloc(layout) };
    NonNull::new(ptr).ok_or(OutOfMemory)
  }

  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    // Safety: upheld by the caller, see CStyleAllocator::realloc
    let ptr = unsafe { rust_alloc::alloc::realloc(ptr.as_ptr(), old_layout, new_size) };
    NonNull::new(ptr).ok_or(OutOfMemory)
  }

  unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
    unsafe {
      rust_alloc::alloc::dealloc(ptr.as_ptr(), layout);
    };
  }
}
