//! Similarity judge internals.
//!
//! - run.rs: input checks and orchestration
//! - prompt.rs: prompt and system instruction builders
//! - client.rs: model call and score coercion

pub(crate) mod client;
pub(crate) mod prompt;
pub(crate) mod run;
