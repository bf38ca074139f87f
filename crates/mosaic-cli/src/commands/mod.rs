//! Subcommand implementations

pub mod info;
pub mod inspect;
pub mod samples;
