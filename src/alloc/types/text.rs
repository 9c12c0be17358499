use core::{
  ffi::CStr,
  fmt::{self, Debug, Display, Write},
  ops::Deref,
  slice,
  str::Utf8Error,
};

use crate::alloc::{CStyleAllocator, Empty, GrowthStrategy, InsertError, OutOfBounds, OutOfMemory, raw::RawBuffer};

/// A growable byte string that always keeps a NUL byte right after its contents.
///
/// Whenever storage has been allocated, `capacity > len` and the byte at `len` is zero, so [as_ptr](Self::as_ptr)
/// can be handed to C as a string. The contents themselves are arbitrary bytes and may contain NULs.
pub struct GrowableText<A: CStyleAllocator> {
  buffer: RawBuffer<u8, A>,
  length: usize,
}

impl<A: CStyleAllocator> GrowableText<A> {
  pub const fn new(allocator: A) -> Self {
    Self {
      buffer: RawBuffer::new(allocator),
      length: 0,
    }
  }

  /// Allocates exactly `capacity` bytes, one of which holds the terminator.
  pub fn with_capacity(allocator: A, capacity: usize) -> Result<Self, OutOfMemory> {
    let mut text = Self {
      buffer: RawBuffer::with_capacity(allocator, capacity)?,
      length: 0,
    };
    text.terminate();
    Ok(text)
  }

  /// Copies `bytes` into a new allocation of exactly `bytes.len() + 1` bytes.
  pub fn from_bytes(allocator: A, bytes: &[u8]) -> Result<Self, OutOfMemory> {
    let capacity = bytes.len().checked_add(1).ok_or(OutOfMemory)?;
    let mut text = Self::with_capacity(allocator, capacity)?;
    text.push_bytes(bytes)?;
    Ok(text)
  }

  pub fn from_cstr(allocator: A, source: &CStr) -> Result<Self, OutOfMemory> {
    Self::from_bytes(allocator, source.to_bytes())
  }

  pub fn from_str(allocator: A, source: &str) -> Result<Self, OutOfMemory> {
    Self::from_bytes(allocator, source.as_bytes())
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

  pub fn allocator(&self) -> &A {
    self.buffer.allocator()
  }

  pub fn growth_strategy(&self) -> GrowthStrategy {
    self.buffer.growth_strategy()
  }

  pub fn set_growth_strategy(&mut self, growth_strategy: GrowthStrategy) {
    self.buffer.set_growth_strategy(growth_strategy);
  }

  /// A pointer to the NUL-terminated contents, or null until the first allocation.
  pub fn as_ptr(&self) -> *const u8 {
    self.buffer.as_ptr()
  }

  /// The contents, without the terminator.
  pub fn as_bytes(&self) -> &[u8] {
    match self.buffer.ptr() {
      // Safety: the first `length` bytes are initialized
      Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.length) },
      None => &[],
    }
  }

  /// The contents followed by the terminator.
  pub fn as_bytes_with_nul(&self) -> &[u8] {
    match self.buffer.ptr() {
      // Safety: the terminator at `length` is initialized whenever storage exists
      Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.length + 1) },
      None => b"\0",
    }
  }

  /// The contents up to the first NUL byte.
  pub fn as_c_str(&self) -> &CStr {
    CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
  }

  pub fn to_str(&self) -> Result<&str, Utf8Error> {
    core::str::from_utf8(self.as_bytes())
  }

  /// Ensures room for at least `min_capacity` bytes in total, terminator included.
  pub fn reserve(&mut self, min_capacity: usize) -> Result<(), OutOfMemory> {
    self.buffer.reserve(min_capacity)?;
    self.terminate();
    Ok(())
  }

  /// Inserts `byte` before the byte at `position`, shifting the rest of the contents right.
  pub fn insert(&mut self, position: usize, byte: u8) -> Result<(), InsertError> {
    if position > self.length {
      return Err(OutOfBounds {
        position,
        length: self.length,
      }
      .into());
    }

    Ok(self.insert_unchecked(position, byte)?)
  }

  pub fn push(&mut self, byte: u8) -> Result<(), OutOfMemory> {
    self.insert_unchecked(self.length, byte)
  }

  fn insert_unchecked(&mut self, position: usize, byte: u8) -> Result<(), OutOfMemory> {
    self.grow_for(1)?;

    let ptr = self.buffer.as_mut_ptr();
    unsafe {
      // Safety: grow_for left room for one more byte past the terminator slot
      ptr.add(position).copy_to(ptr.add(position + 1), self.length - position);
      ptr.add(position).write(byte);
    }
    self.length += 1;
    self.terminate();
    Ok(())
  }

  /// Appends the `length` bytes at `source`.
  ///
  /// Safety:
  /// - `source` must be valid for reads of `length` bytes
  /// - `source` must not point into this text's storage, since growing may release it
  pub unsafe fn push_raw_parts(&mut self, length: usize, source: *const u8) -> Result<(), OutOfMemory> {
    self.grow_for(length)?;

    if length > 0 {
      // Safety: room was reserved above, and the caller guarantees `source` is valid and elsewhere
      unsafe { self.buffer.as_mut_ptr().add(self.length).copy_from_nonoverlapping(source, length) };
      self.length += length;
    }
    self.terminate();
    Ok(())
  }

  pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfMemory> {
    // Safety: a borrowed slice is valid and cannot alias `self`
    unsafe { self.push_raw_parts(bytes.len(), bytes.as_ptr()) }
  }

  pub fn push_cstr(&mut self, source: &CStr) -> Result<(), OutOfMemory> {
    self.push_bytes(source.to_bytes())
  }

  pub fn push_str(&mut self, source: &str) -> Result<(), OutOfMemory> {
    self.push_bytes(source.as_bytes())
  }

  pub fn push_text<A2: CStyleAllocator>(&mut self, other: &GrowableText<A2>) -> Result<(), OutOfMemory> {
    self.push_bytes(other.as_bytes())
  }

  /// Removes the last byte, moving the terminator back over it.
  pub fn pop(&mut self) -> Result<u8, Empty> {
    if self.length == 0 {
      return Err(Empty);
    }

    self.length -= 1;
    // Safety: the byte was initialized, and the slot stays within the allocation
    let byte = unsafe { self.buffer.as_ptr().add(self.length).read() };
    self.terminate();
    Ok(byte)
  }

  /// Returns an independent copy with the same capacity and contents.
  pub fn try_clone(&self) -> Result<Self, OutOfMemory>
  where
    A: Clone,
  {
    let mut clone = Self::with_capacity(self.allocator().clone(), self.capacity())?;
    clone.set_growth_strategy(self.growth_strategy());
    if self.capacity() > 0 {
      clone.push_bytes(self.as_bytes())?;
    }
    Ok(clone)
  }

  /// Releases the storage.
  pub fn free(self) {
    drop(self);
  }

  /// Makes room for `additional` more bytes plus the terminator.
  fn grow_for(&mut self, additional: usize) -> Result<(), OutOfMemory> {
    let required = self.length.checked_add(additional).and_then(|required| required.checked_add(1)).ok_or(OutOfMemory)?;
    self.buffer.reserve(required)
  }

  fn terminate(&mut self) {
    if self.buffer.capacity() > self.length {
      // Safety: in bounds of the allocation
      unsafe { self.buffer.as_mut_ptr().add(self.length).write(0) };
    }
  }
}

impl<A: CStyleAllocator> Deref for GrowableText<A> {
  type Target = [u8];

  fn deref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<A: CStyleAllocator> AsRef<[u8]> for GrowableText<A> {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<A: CStyleAllocator> Debug for GrowableText<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.as_bytes().escape_ascii())
  }
}

impl<A: CStyleAllocator> Display for GrowableText<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.as_bytes().utf8_chunks() {
      f.write_str(chunk.valid())?;
      if !chunk.invalid().is_empty() {
        f.write_char(char::REPLACEMENT_CHARACTER)?;
      }
    }
    Ok(())
  }
}
