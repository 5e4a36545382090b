/**
Tree-walking interpreter for Strata

- `engine`: statement execution and the control-flow signal
- `eval`: expressions, operators and calls
- `environment`: the scope arena
- `errors`: runtime errors

The module registry is borrowed for the interpreter's lifetime; imports bind
names to modules inside it.
*/
pub mod engine;
pub mod environment;
pub mod errors;
pub mod eval;

pub use engine::{ControlFlow, Interpreter};
pub use errors::{RuntimeError, RuntimeResult};
