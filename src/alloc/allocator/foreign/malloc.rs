use core::{alloc::Layout, ptr::NonNull};

use crate::alloc::{CStyleAllocator, OutOfMemory};

/// The largest alignment `malloc` and `realloc` are guaranteed to honour.
const MALLOC_ALIGN: usize = 2 * size_of::<usize>();

/// The C library allocator.
#[derive(Default, Debug, Clone, Copy)]
pub struct Malloc;

unsafe impl CStyleAllocator for Malloc {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    let ptr = if layout.align() <= MALLOC_ALIGN {
      unsafe { libc::malloc(layout.size()) }
    } else {
      // aligned_alloc wants the size to be a multiple of the alignment
      let size = layout.pad_to_align().size();
      unsafe { libc::aligned_alloc(layout.align(), size) }
    };
    NonNull::new(ptr.cast::<u8>()).ok_or(OutOfMemory)
  }

  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    if old_layout.align() > MALLOC_ALIGN {
      let new_layout = Layout::from_size_align(new_size, old_layout.align()).map_err(|_| OutOfMemory)?;
      let new = self.alloc(new_layout)?;
      unsafe {
        new.copy_from_nonoverlapping(ptr, old_layout.size().min(new_size));
        self.free(ptr, old_layout);
      }
      return Ok(new);
    }

    // Safety: ptr came from malloc, and realloc leaves it untouched on failure
    let new = unsafe { libc::realloc(ptr.as_ptr().cast(), new_size) };
    NonNull::new(new.cast::<u8>()).ok_or(OutOfMemory)
  }

  unsafe fn free(&self, ptr: NonNull<u8>, _layout: Layout) {
    unsafe { libc::free(ptr.as_ptr().cast()) };
  }
}
