pub mod sequence;
pub mod text;

pub use sequence::*;
pub use text::*;
