pub mod environment;
pub mod interpreter;
pub mod native_functions;
pub mod resolver;
pub mod values;

extern crate frontend;
extern crate tools;

pub use interpreter::{Interpreter, RuntimeError};
pub use resolver::{Annotations, ResolveError, Resolver};
pub use values::RuntimeVal;
