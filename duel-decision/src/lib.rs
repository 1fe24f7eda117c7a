#![deny(missing_docs)]
//! Contract with, and a concrete HTTP client for, the external
//! probabilistic decision source (the "language model" collaborator).
//!
//! [`DecisionSource`] is the capability the Turn Orchestrator depends
//! on; [`HttpDecisionSource`] is one concrete implementation. Parsing
//! helpers extract the decision source's JSON-object response contract
//! out of otherwise free-form completion text.

mod error;
mod http;
mod parse;
mod source;
mod types;

pub use error::DecisionSourceError;
pub use http::HttpDecisionSource;
pub use parse::{first_balanced_json_object, parse_action_response, parse_chain_response};
pub use source::DecisionSource;
pub use types::{
    DecisionRequest, DecisionResponse, ModelActionResponse, ModelChainResponse, ModelTier,
};
