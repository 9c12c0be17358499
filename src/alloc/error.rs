use core::error::Error;

use thiserror::Error;

use super::planner::CapacityOverflow;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("allocator is out of memory")]
pub struct OutOfMemory;

impl From<CapacityOverflow> for OutOfMemory {
  fn from(_: CapacityOverflow) -> Self {
    OutOfMemory
  }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("container is empty")]
pub struct Empty;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("position {position} is past the end (length {length})")]
pub struct OutOfBounds {
  pub position: usize,
  pub length: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
  #[error("{0}")]
  OutOfMemory(#[from] OutOfMemory),
  #[error("{0}")]
  OutOfBounds(#[from] OutOfBounds),
}

/// Failure while copying elements into new storage through [ElementHooks](super::ElementHooks).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CloneError<E: Error> {
  #[error("{0}")]
  OutOfMemory(#[from] OutOfMemory),
  #[error("element clone failed: {0}")]
  ElementCloneFailed(E),
}
