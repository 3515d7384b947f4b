pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod utils;

pub use context::OntomatchCliContext;
pub use output::{
    CliColors, config_sections, error_code, format_error, format_info, format_score, format_status,
    format_success, format_warning, output_error, print_config, print_json, print_resolution,
    print_suggestions, print_summary,
};
pub use utils::{cli_logging, parse_entity, parse_pairs, parse_types};
