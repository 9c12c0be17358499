use core::{alloc::Layout, cell::Cell, marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

use crate::{
  alloc::{CStyleAllocator, OutOfMemory},
  num::align_up,
};

/// A bump allocator over a borrowed buffer.
///
/// Freeing only reclaims memory when the freed block is the most recent one, and the most recent block can be
/// resized in place. Every other free is a no-op until the arena itself goes away.
pub struct ArenaAllocator<'buffer> {
  head: Cell<usize>,
  data: NonNull<[MaybeUninit<u8>]>,
  lifetime: PhantomData<&'buffer mut [MaybeUninit<u8>]>,
}

impl<'buffer> ArenaAllocator<'buffer> {
  pub fn new(buffer: &'buffer mut [MaybeUninit<u8>]) -> Self {
    Self {
      head: 0.into(),
      data: NonNull::from(buffer),
      lifetime: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn remaining(&self) -> usize {
    self.len() - self.head.get()
  }

  fn base(&self) -> NonNull<u8> {
    self.data.cast()
  }

  fn offset_of(&self, ptr: NonNull<u8>) -> usize {
    ptr.as_ptr().addr() - self.base().as_ptr().addr()
  }

  fn is_last(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
    self.offset_of(ptr) + layout.size() == self.head.get()
  }

  fn fetch_head_ptr(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    let base = self.base().as_ptr().addr();
    let aligned = align_up(base + self.head.get(), layout.align()).ok_or(OutOfMemory)?;
    let offset = aligned - base;

    let new_head = offset.checked_add(layout.size()).ok_or(OutOfMemory)?;
    if new_head > self.len() {
      return Err(OutOfMemory);
    }

    self.head.set(new_head);

    // Safety: offset is within the buffer, so the resulting pointer is in bounds and non-null
    Ok(unsafe { self.base().add(offset) })
  }
}

unsafe impl CStyleAllocator for ArenaAllocator<'_> {
  fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
    self.fetch_head_ptr(layout)
  }

  unsafe fn realloc(&self, ptr: NonNull<u8>, old_layout: Layout, new_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
    if self.is_last(ptr, old_layout) {
      let new_head = self.offset_of(ptr).checked_add(new_size).ok_or(OutOfMemory)?;
      if new_head > self.len() {
        return Err(OutOfMemory);
      }
      self.head.set(new_head);
      return Ok(ptr);
    }

    let new = self.alloc(Layout::from_size_align(new_size, old_layout.align()).map_err(|_| OutOfMemory)?)?;
    // Safety: the new block was bumped past the old one, so they cannot overlap
    unsafe { new.copy_from_nonoverlapping(ptr, old_layout.size().min(new_size)) };
    Ok(new)
  }

  unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
    if self.is_last(ptr, layout) {
      self.head.set(self.offset_of(ptr));
    }
  }
}
