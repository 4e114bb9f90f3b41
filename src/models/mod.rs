pub mod enums;
pub mod patient;
pub mod prediction;
pub mod wire;

pub use enums::*;
pub use patient::*;
pub use prediction::*;
pub use wire::*;
