//! Growable, allocator-aware buffers: a typed [GrowableSequence](alloc::GrowableSequence) and a NUL-terminated
//! [GrowableText](alloc::GrowableText), both growing by the same [GrowthStrategy](alloc::GrowthStrategy) and
//! reporting every failure, allocation included, as a value.

#![no_std]

#[cfg(test)]
#[macro_use]
#[allow(unused)]
extern crate std;

pub mod alloc;
pub mod num;

pub use zerocopy;

pub mod prelude {
  pub use crate::alloc::{
    CStyleAllocator, Cloned, ElementHooks, FnHooks, GrowableSequence, GrowableText, GrowthStrategy, Trivial,
  };
}
