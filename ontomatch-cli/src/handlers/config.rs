use crate::args::ConfigArgs;
use crate::context::OntomatchCliContext;
use crate::output::{format_success, print_config, print_json};
use ontomatch::config::validate_config;

pub fn handle_config_command(
    args: ConfigArgs,
    ctx: &OntomatchCliContext,
    output_format: &str,
) -> ontomatch::Result<()> {
    validate_config(&ctx.config)?;

    if args.check {
        if output_format == "json" {
            print_json(&serde_json::json!({ "valid": true }));
        } else {
            println!("{}", format_success("Configuration is valid"));
        }
        return Ok(());
    }

    if output_format == "json" {
        print_json(&ctx.config);
    } else {
        print_config(&ctx.config);
    }
    Ok(())
}
