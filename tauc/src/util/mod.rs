pub mod compare;
pub mod display;
pub mod visit;
