#[cfg(feature = "libc")]
mod malloc;
#[cfg(any(feature = "alloc", test))]
mod std_alloc;

#[cfg(feature = "libc")]
pub use malloc::*;
#[cfg(any(feature = "alloc", test))]
pub use std_alloc::*;
