//! tugstyle: infer unwritten style conventions from the surrounding code.
//!
//! Code generators and refactoring tools that insert new code need to know
//! how the existing code is written: are private fields `_prefixed`, is
//! member access qualified with `this.`, do using directives go inside the
//! namespace. tugstyle answers these questions from explicit configuration
//! when someone wrote it down, and otherwise from evidence in the nearest
//! source files.

// Engine and language support
pub use tugstyle_core;
pub use tugstyle_csharp;

// Front doors
pub mod cli;
pub mod inference;
pub mod output;

pub use inference::StyleInference;
pub use tugstyle_core::{Inference, Origin, Outcome, StyleError, Verdict};
pub use tugstyle_csharp::Convention;
