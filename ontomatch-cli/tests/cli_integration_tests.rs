//! Integration tests for the ontomatch CLI
//!
//! These tests drive the command handlers against JSON fixtures written to a
//! temporary directory:
//! - argument parsing for every subcommand
//! - single-term suggestions
//! - full matching runs, including review mode and dry runs
//! - configuration loading and error reporting

use clap::Parser;
use ontomatch::config::LoggingConfig;
use ontomatch::prelude::*;
use ontomatch::storage::json;
use ontomatch_cli::args::{RunArgs, SuggestArgs};
use ontomatch_cli::commands::Commands;
use ontomatch_cli::handlers::{collect_suggestions, execute_run};
use ontomatch_cli::{
    OntomatchCliContext, cli_logging, config_sections, error_code, parse_entity, parse_pairs,
    parse_types,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Parser)]
struct TestCli {
    #[command(subcommand)]
    command: Commands,
}

const MELANOMA: &str = "http://purl.obolibrary.org/obo/NCIT_C3224";

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap())
        .expect("Failed to write fixture");
    path
}

/// Ontology and entity fixtures in a fresh temp directory
fn fixtures() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let ontology = write_json(
        temp_dir.path(),
        "ontology.json",
        json!([
            {
                "id": "NCIT_C3224",
                "url": MELANOMA,
                "label": "Melanoma",
                "type": "diagnosis",
                "synonyms": ["Malignant Melanoma"]
            },
            {
                "id": "NCIT_C376",
                "url": "http://purl.obolibrary.org/obo/NCIT_C376",
                "label": "Cisplatin",
                "type": "treatment",
                "synonyms": ["CDDP"]
            }
        ]),
    );

    let entities = write_json(
        temp_dir.path(),
        "entities.json",
        json!([
            {
                "entity_type": "diagnosis",
                "values": { "sample_diagnosis": "Ductal Carcinoma In Situ", "data_source": "JAX" },
                "status": "mapped",
                "mapping_type": "manual",
                "mapped_term_url": "http://x/C2924",
                "mapped_term_label": "Ductal Breast Carcinoma In Situ"
            },
            {
                "entity_type": "diagnosis",
                "values": { "sample_diagnosis": "Ductal Carcinoma, In-Situ", "data_source": "JAX" }
            },
            {
                "entity_type": "diagnosis",
                "values": { "sample_diagnosis": "Malignant Melanoma", "data_source": "CRL" }
            },
            {
                "entity_type": "treatment",
                "values": { "treatment_name": "Compound X-17", "data_source": "CRL" }
            }
        ]),
    );

    (temp_dir, ontology, entities)
}

fn default_context() -> OntomatchCliContext {
    OntomatchCliContext::from_config(ConfigBuilder::testing().build().expect("valid config"))
}

fn run_args(entities: &Path, ontology: &Path) -> RunArgs {
    RunArgs {
        entities: entities.to_path_buf(),
        ontology: ontology.to_path_buf(),
        types: Vec::new(),
        out: None,
        review: false,
        threshold: None,
        dry_run: false,
    }
}

#[test]
fn test_parse_subcommands() {
    let cli = TestCli::try_parse_from([
        "ontomatch-cli",
        "fingerprint",
        "diagnosis",
        "sample_diagnosis=Melanoma",
        "data_source=JAX",
    ])
    .expect("fingerprint should parse");
    assert!(matches!(cli.command, Commands::Fingerprint(ref args) if args.values.len() == 2));

    let cli = TestCli::try_parse_from([
        "ontomatch-cli",
        "run",
        "entities.json",
        "--ontology",
        "ncit.json",
        "-t",
        "treatment",
        "--review",
    ])
    .expect("run should parse");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.types, vec!["treatment".to_string()]);
            assert!(args.review);
            assert!(!args.dry_run);
        }
        _ => panic!("expected run command"),
    }

    // suggest needs at least one value and an ontology file
    assert!(TestCli::try_parse_from(["ontomatch-cli", "suggest", "diagnosis"]).is_err());
    assert!(
        TestCli::try_parse_from(["ontomatch-cli", "suggest", "diagnosis", "sample_diagnosis=x"])
            .is_err()
    );
}

#[test]
fn test_parse_pairs_and_types() {
    let args = ["treatment_name = Cisplatin".to_string(), "data_source=".to_string()];
    let pairs = parse_pairs(&args).unwrap();
    assert_eq!(pairs, vec![("treatment_name", Some("Cisplatin")), ("data_source", None)]);

    let err = parse_pairs(&["Cisplatin".to_string()]).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_INPUT");

    assert_eq!(parse_types(&[]).unwrap(), EntityType::ALL.to_vec());
    assert_eq!(
        parse_types(&["treatment".to_string(), "Treatment".to_string()]).unwrap(),
        vec![EntityType::Treatment]
    );
    let err = parse_types(&["biomarker".to_string()]).unwrap_err();
    assert_eq!(error_code(&err), "UNKNOWN_ENTITY_TYPE");
}

#[test]
fn test_parse_entity_rejects_foreign_key() {
    let entity = parse_entity("treatment", &["treatment_name=CDDP".to_string()]).unwrap();
    assert_eq!(entity.value(MappingKey::TreatmentName), Some("CDDP"));

    let err = parse_entity("treatment", &["tumor_type=Primary".to_string()]).unwrap_err();
    assert_eq!(error_code(&err), "UNKNOWN_MAPPING_KEY");
}

#[tokio::test]
async fn test_suggest_against_ontology() {
    let (_temp_dir, ontology, _entities) = fixtures();
    let args = SuggestArgs {
        entity_type: "diagnosis".to_string(),
        values: vec!["sample_diagnosis=malignant melanoma".to_string()],
        ontology,
        rules: None,
        limit: 5,
    };

    let report = collect_suggestions(&args, &default_context())
        .await
        .expect("Failed to collect suggestions");

    assert!(report.failures.is_empty());
    assert_eq!(report.suggestions[0].target_url(), MELANOMA);
    assert_eq!(report.suggestions[0].score(), 100);
    assert!(report.resolution.is_accepted());
}

#[tokio::test]
async fn test_suggest_uses_rules_file() {
    let (_temp_dir, ontology, entities) = fixtures();
    let args = SuggestArgs {
        entity_type: "diagnosis".to_string(),
        values: vec![
            "sample_diagnosis=ductal carcinoma in situ".to_string(),
            "data_source=JAX".to_string(),
        ],
        ontology,
        rules: Some(entities),
        limit: 1,
    };

    let report = collect_suggestions(&args, &default_context()).await.unwrap();
    assert_eq!(report.suggestions.len(), 1);
    assert_eq!(report.suggestions[0].source(), MappingSource::Rule);
    assert_eq!(report.suggestions[0].target_url(), "http://x/C2924");
}

#[tokio::test]
async fn test_run_writes_results() {
    let (temp_dir, ontology, entities) = fixtures();
    let out = temp_dir.path().join("out").join("matched.json");
    let args = RunArgs {
        out: Some(out.clone()),
        ..run_args(&entities, &ontology)
    };

    let outcome = execute_run(&args, &default_context())
        .await
        .expect("Failed to run matching");
    assert_eq!(outcome.written_to.as_deref(), Some(out.as_path()));

    let diagnosis = outcome.summary.get(EntityType::Diagnosis).unwrap();
    assert_eq!((diagnosis.processed, diagnosis.auto_mapped), (2, 2));
    assert_eq!(diagnosis.hit_rate, Some(100));
    let treatment = outcome.summary.get(EntityType::Treatment).unwrap();
    assert_eq!(treatment.hit_rate, Some(0));
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].entity_type, EntityType::Treatment);

    let written = json::load_entities(&out).await.unwrap();
    assert_eq!(written.len(), 4);
    let melanoma = written
        .iter()
        .find(|e| e.value(MappingKey::SampleDiagnosis) == Some("Malignant Melanoma"))
        .unwrap();
    assert_eq!(melanoma.status, MappingStatus::Mapped);
    assert_eq!(melanoma.mapped_term_url.as_deref(), Some(MELANOMA));

    let variant = written
        .iter()
        .find(|e| e.value(MappingKey::SampleDiagnosis) == Some("Ductal Carcinoma, In-Situ"))
        .unwrap();
    assert_eq!(variant.source, Some(MappingSource::Rule));
}

#[tokio::test]
async fn test_run_review_mode_and_type_filter() {
    let (_temp_dir, ontology, entities) = fixtures();
    let args = RunArgs {
        types: vec!["diagnosis".to_string()],
        review: true,
        ..run_args(&entities, &ontology)
    };

    let outcome = execute_run(&args, &default_context()).await.unwrap();
    assert_eq!(outcome.summary.types.len(), 1);
    assert_eq!(outcome.written_to.as_deref(), Some(entities.as_path()));

    let written = json::load_entities(&entities).await.unwrap();
    let reviewed: Vec<_> = written
        .iter()
        .filter(|e| e.status == MappingStatus::Review)
        .collect();
    assert_eq!(reviewed.len(), 2);

    let treatment = written
        .iter()
        .find(|e| e.entity_type == EntityType::Treatment)
        .unwrap();
    assert_eq!(treatment.mapping_type, None);
}

#[tokio::test]
async fn test_run_dry_run_leaves_files_alone() {
    let (_temp_dir, ontology, entities) = fixtures();
    let before = std::fs::read_to_string(&entities).unwrap();
    let args = RunArgs {
        dry_run: true,
        ..run_args(&entities, &ontology)
    };

    let outcome = execute_run(&args, &default_context()).await.unwrap();
    assert!(outcome.written_to.is_none());
    assert_eq!(std::fs::read_to_string(&entities).unwrap(), before);
}

#[tokio::test]
async fn test_run_rejects_invalid_threshold() {
    let (_temp_dir, ontology, entities) = fixtures();
    let args = RunArgs {
        threshold: Some(101),
        ..run_args(&entities, &ontology)
    };

    let err = execute_run(&args, &default_context()).await.unwrap_err();
    assert_eq!(error_code(&err), "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_run_missing_ontology_file() {
    let (temp_dir, _ontology, entities) = fixtures();
    let missing = temp_dir.path().join("missing.json");

    let err = execute_run(&run_args(&entities, &missing), &default_context())
        .await
        .unwrap_err();
    assert_eq!(error_code(&err), "STORAGE_ERROR");
}

#[test]
fn test_context_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ontomatch.toml");
    std::fs::write(
        &path,
        "[matching]\nscore_threshold = 90\nacceptance = \"review\"\n\n[search]\nrule_top_k = 3\n\n\
         [logging]\nlevel = \"debug\"\nconsole = false\n",
    )
    .unwrap();

    let ctx = OntomatchCliContext::new(Some(&path)).expect("Failed to load config");
    assert_eq!(ctx.config.matching.score_threshold, 90);
    assert_eq!(ctx.config.matching.acceptance, AcceptancePolicy::Review);
    assert_eq!(ctx.config.search.rule_top_k, 3);
    assert_eq!(ctx.config.logging.level, LogLevel::Debug);
    assert!(!ctx.config.logging.console);

    let err = OntomatchCliContext::new(Some(&temp_dir.path().join("absent.toml")))
        .err()
        .expect("missing file should fail");
    assert_eq!(error_code(&err), "CONFIGURATION_ERROR");
}

#[test]
fn test_cli_logging_overrides_level_only() {
    let base = LoggingConfig {
        level: LogLevel::Info,
        file: Some(PathBuf::from("ontomatch.log")),
        console: false,
        ..LoggingConfig::default()
    };

    assert_eq!(cli_logging(&base, false, false), base);
    assert_eq!(cli_logging(&base, true, false).level, LogLevel::Debug);

    let quiet = cli_logging(&base, true, true);
    assert_eq!(quiet.level, LogLevel::Error);
    assert_eq!(quiet.file, base.file);
    assert!(!quiet.console);
}

#[test]
fn test_config_sections_cover_every_setting() {
    let config = ConfigBuilder::new()
        .with_log_file("logs/ontomatch.log")
        .build()
        .unwrap();
    let sections = config_sections(&config);

    let value = |section: &str, key: &str| {
        sections
            .iter()
            .find(|(name, _)| *name == section)
            .and_then(|(_, fields)| fields.iter().find(|(name, _)| *name == key))
            .map(|(_, value)| value.clone())
    };
    assert_eq!(value("search", "max_text_length").as_deref(), Some("150"));
    assert_eq!(value("search", "max_token_length").as_deref(), Some("50"));
    assert_eq!(value("logging", "console").as_deref(), Some("true"));
    assert!(value("logging", "file").is_some_and(|file| file.ends_with("ontomatch.log")));

    let json = serde_json::to_value(&config).unwrap();
    for (section, fields) in &sections {
        assert_eq!(fields.len(), json[section].as_object().unwrap().len(), "{}", section);
    }
}
