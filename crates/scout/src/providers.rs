pub mod anthropic;
pub mod base;
pub mod configs;
pub mod errors;
pub mod utils;

#[cfg(test)]
pub mod mock;
