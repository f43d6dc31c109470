//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Decomposer system prompt
pub const DECOMPOSE: &str = include_str!("../../prompts/decompose.pmt");

/// Estimator system prompt
pub const ESTIMATE: &str = include_str!("../../prompts/estimate.pmt");

/// Sequencer system prompt
pub const SEQUENCE: &str = include_str!("../../prompts/sequence.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "decompose" => Some(DECOMPOSE),
        "estimate" => Some(ESTIMATE),
        "sequence" => Some(SEQUENCE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
