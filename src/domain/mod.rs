pub mod event;
pub mod registry;
pub mod sport;

pub use event::*;
pub use registry::*;
pub use sport::*;
