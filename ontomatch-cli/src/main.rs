use clap::Parser;
use is_terminal::IsTerminal;
use ontomatch_cli::commands::Commands;
use ontomatch_cli::context::OntomatchCliContext;
use ontomatch_cli::handlers::*;
use ontomatch_cli::output::output_error;
use ontomatch_cli::utils::cli_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ontomatch-cli")]
#[command(about = "Ontology term harmonization CLI", long_about = None)]
#[command(version = ontomatch::VERSION)]
struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    output: String,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (suppress all logging output)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output_format = cli.output.clone();

    if output_format == "json" || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let ctx = match OntomatchCliContext::new(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output_error(&e, &output_format);
            std::process::exit(1);
        }
    };

    let quiet = cli.quiet || output_format == "json";
    let logging = cli_logging(&ctx.config.logging, cli.verbose, quiet);
    let guard = match ontomatch::logging::init(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            output_error(&ontomatch::OntomatchError::from(e), &output_format);
            std::process::exit(1);
        }
    };

    let result = run(cli, &ctx).await;
    // flush file logs before exiting
    drop(guard);

    if let Err(e) = result {
        output_error(&e, &output_format);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, ctx: &OntomatchCliContext) -> ontomatch::Result<()> {
    let output_format = cli.output.as_str();

    match cli.command {
        Commands::Version => {
            println!("Ontomatch CLI v{}", ontomatch::VERSION);
        }

        Commands::Fingerprint(args) => {
            handle_fingerprint_command(args, output_format)?;
        }

        Commands::Suggest(args) => {
            handle_suggest_command(args, ctx, output_format).await?;
        }

        Commands::Run(args) => {
            handle_run_command(args, ctx, output_format).await?;
        }

        Commands::Config(args) => {
            handle_config_command(args, ctx, output_format)?;
        }
    }

    Ok(())
}
