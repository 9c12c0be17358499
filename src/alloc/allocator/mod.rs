pub mod arena;
pub mod foreign;

use core::{alloc::Layout, cmp, ptr::NonNull};

#[doc(inline)]
pub use arena::*;
#[doc(inline)]
pub use foreign::*;

use super::OutOfMemory;

/// A memory allocator with the shape of C's `malloc`, `realloc` and `free`.
///
/// Safety:
/// - Blocks returned by [alloc](CStyleAllocator::alloc) and [realloc](CStyleAllocator::realloc) must be valid for
///   reads and writes of the requested size, aligned to the requested alignment, and remain valid until they are
///   passed to [free](CStyleAllocator::free) or a successful [realloc](CStyleAllocator::realloc).
/// - A failed [realloc](CStyleAllocator::realloc) must leave the original block untouched and owned by the caller.
///
/// Callers never pass zero-sized layouts.
pub unsafe trait CStyleAllocator {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory>;

  /// Resizes the block at `ptr` to `new_size` bytes, keeping the first `min(old_layout.size(), new_size)` bytes.
  ///
  /// Safety:
  /// - `ptr` must point to a block allocated by this allocator with `old_layout`
  /// - `new_size` must be non-zero and must not overflow `isize` when rounded up to `old_layout.align()`
  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    let new_layout = Layout::from_size_align(new_size, old_layout.align()).map_err(|_| OutOfMemory)?;
    let new = self.alloc(new_layout)?;
    unsafe {
      // Safety: both blocks are valid for at least this many bytes and are distinct allocations
      new.copy_from_nonoverlapping(ptr, cmp::min(old_layout.size(), new_size));
      self.free(ptr, old_layout);
    }
    Ok(new)
  }

  /// Safety:
  /// - `ptr` must point to a valid memory block allocated by this allocator
  /// - `layout` must be the layout of the memory block
  unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

unsafe impl<C: CStyleAllocator + ?Sized> CStyleAllocator for &C {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    C::alloc(self, layout)
  }

  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    unsafe { C::realloc(self, ptr, old_layout, new_size) }
  }

  unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
    unsafe { C::free(self, ptr, layout) }
  }
}
