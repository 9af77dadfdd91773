//! Command implementations

pub mod cache;
pub mod completions;
pub mod init;
pub mod seed;
pub mod status;
pub mod track;
