pub mod error;
pub mod hooks;
pub mod model;

pub use error::{Error, Fault};
pub use model::{Outcome, State, Vm, ENTRY};
