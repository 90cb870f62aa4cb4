//! These models represent the objects passed around by the agent
//!
//! There are two formats we need to interact with:
//! - anthropic messages/tools, sent from the agent to the LLM
//! - tool call requests and outcomes, sent between the agent and the tool server
//!
//! We always immediately convert the LLM format into the internal structs using the
//! helpers in `providers::utils`. The tool call wire format is used as-is, see `tools`.
pub mod message;
pub mod role;
pub mod tool;
