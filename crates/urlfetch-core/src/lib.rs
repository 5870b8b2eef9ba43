pub mod config;
pub mod error;
pub mod logging;

pub mod client;
pub mod fingerprint;
pub mod limiter;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod request;
pub mod storage;
pub mod url_model;
pub mod worker;
