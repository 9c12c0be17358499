pub mod allocator;
pub mod error;
pub mod hooks;
pub mod planner;
pub mod raw;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

#[doc(inline)]
pub use allocator::*;
#[doc(inline)]
pub use error::*;
#[doc(inline)]
pub use hooks::*;
#[doc(inline)]
pub use planner::*;
#[doc(inline)]
pub use types::*;
