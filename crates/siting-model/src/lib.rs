pub mod compiler;
pub mod instance;

pub use compiler::{CompileError, CompileOptions, CompiledModel};
pub use instance::{Facility, FacilityInstance, Product};
