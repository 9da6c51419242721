//! CLI Commands

pub mod get;
pub mod reset;
pub mod status;
pub mod update;
