//! Command line front end for the anticholinergic burden panel builder.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
