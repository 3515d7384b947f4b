//! Command enum definitions

use crate::args::*;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// Compute the fingerprint of an entity
    #[command(
        alias = "fp",
        long_about = r#"
Print the identity hash of an entity. Two records with the same type and the
same values (ignoring case) always share a fingerprint; any other difference,
including punctuation, produces a different one.

EXAMPLES:
  ontomatch-cli fingerprint diagnosis sample_diagnosis=Melanoma data_source=JAX
  ontomatch-cli fingerprint treatment treatment_name=Cisplatin
"#
    )]
    Fingerprint(FingerprintArgs),

    /// Rank candidate targets for a single term
    #[command(long_about = r#"
Search a term against the ontology (and optionally against previously mapped
entities) and show the ranked suggestions together with the decision an
automatic pass would take.

EXAMPLES:
  ontomatch-cli suggest diagnosis sample_diagnosis="Malignant Melanoma" \
      --ontology ncit.json
  ontomatch-cli suggest treatment treatment_name=CDDP data_source=JAX \
      --ontology ncit.json --rules entities.json --limit 5
"#)]
    Suggest(SuggestArgs),

    /// Run an automatic matching pass over an entity file
    #[command(
        alias = "match",
        long_about = r#"
Match every unmapped entity in a JSON file. Mapped entities in the same file
serve as rules. Results are written back (or to --out) and a per-type summary
with the automatic hit rate is printed.

EXAMPLES:
  ontomatch-cli run entities.json --ontology ncit.json
  ontomatch-cli run entities.json --ontology ncit.json --type treatment --review
  ontomatch-cli --output json run entities.json --ontology ncit.json --dry-run
"#
    )]
    Run(RunArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}
