pub mod config;
pub mod logging;

pub mod orchestrator;
pub mod replay;
pub mod request;
pub mod targets;
