//! Semantic passes over a parsed program.
//!
//! Each pass fills in one family of decorations and requires the ones
//! written by the passes before it.

pub mod assign;
pub mod bind;
pub mod offsets;
pub mod symbols;
pub mod typeck;
pub mod types;

pub use assign::assign_operands;
pub use bind::bind;
pub use offsets::assign_offsets;
pub use typeck::typecheck;
