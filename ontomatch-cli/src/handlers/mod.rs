//! Command handlers for the ontomatch CLI

pub mod config;
pub mod fingerprint;
pub mod run;
pub mod suggest;

pub use config::handle_config_command;
pub use fingerprint::handle_fingerprint_command;
pub use run::{RunOutcome, execute_run, handle_run_command};
pub use suggest::{SuggestReport, collect_suggestions, handle_suggest_command};
