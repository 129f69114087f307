pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod exec;
pub mod log;
pub mod panel;
pub mod plan;
pub mod prompt;
pub mod provider;
pub mod tutor;
pub mod ux;
pub mod wire;
