//! Command argument structures

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct FingerprintArgs {
    /// Entity type (diagnosis, treatment)
    pub entity_type: String,

    /// Key values, e.g. sample_diagnosis=Melanoma data_source=JAX
    #[arg(value_name = "KEY=VALUE")]
    pub values: Vec<String>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Entity type (diagnosis, treatment)
    pub entity_type: String,

    /// Key values, e.g. treatment_name=Cisplatin
    #[arg(value_name = "KEY=VALUE", required = true)]
    pub values: Vec<String>,

    /// JSON array of ontology terms
    #[arg(long)]
    pub ontology: PathBuf,

    /// JSON array of entities; the mapped ones act as rules
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Maximum number of suggestions to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON array of entities to match
    pub entities: PathBuf,

    /// JSON array of ontology terms
    #[arg(long)]
    pub ontology: PathBuf,

    /// Entity types to process (defaults to all)
    #[arg(long = "type", short = 't')]
    pub types: Vec<String>,

    /// Where to write the matched entities (defaults to the input file)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Queue automatic acceptances for review instead of mapping them
    #[arg(long)]
    pub review: bool,

    /// Override the acceptance threshold (0-100)
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Match without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Only validate the configuration
    #[arg(long)]
    pub check: bool,
}
