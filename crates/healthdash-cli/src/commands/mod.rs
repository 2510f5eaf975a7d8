pub mod adherence;
pub mod config;
pub mod protocol;
pub mod report;
pub mod risk;
pub mod status;
