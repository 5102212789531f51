pub mod config;
pub mod logging;

// Monitoring engine
pub mod acf;
pub mod control;
pub mod diff;
pub mod install;
pub mod locate;
pub mod report;
pub mod sampler;
pub mod status;
