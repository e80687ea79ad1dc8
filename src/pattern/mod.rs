pub mod errors;
pub mod generator;
pub mod model;
pub mod wire;

pub use errors::PatternError;
pub use generator::PatternGenerator;
#[cfg(test)]
pub use generator::MockPatternGenerator;
pub use model::{InstructionNode, NodeKind, PaginationRule, Pattern, ValueType};
pub use wire::{WireInstruction, WirePagination, WirePattern};
