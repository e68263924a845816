//! External service interactions
//!
//! - Completion service client and prompt construction
//! - Background generation runner
//! - Credential-holding completion proxy server

pub mod completion;
pub mod generation;
pub mod proxy;

pub use completion::{build_prompt, CompletionError, CompletionService, HttpCompletionClient};
pub use generation::{GenerationOutcome, GenerationRunner};
