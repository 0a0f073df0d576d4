//! Command implementations.

mod check_quote;
mod normalize;
mod verify;

pub use check_quote::execute_check_quote;
pub use normalize::{execute_normalize, read_lines};
pub use verify::{build_request, execute_verify, load_fragments, pipeline_config, run_verify};
