use crate::args::RunArgs;
use crate::context::OntomatchCliContext;
use crate::output::{describe_unresolved, format_info, format_status, print_json, print_summary};
use crate::utils::parse_types;
use colored::Colorize;
use ontomatch::prelude::*;
use ontomatch::storage::json;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UnresolvedEntity {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub reason: UnresolvedReason,
    pub suggestions: usize,
}

/// What a matching pass produced and where it was written.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub summary: BatchSummary,
    pub unresolved: Vec<UnresolvedEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<PathBuf>,
}

pub async fn execute_run(args: &RunArgs, ctx: &OntomatchCliContext) -> ontomatch::Result<RunOutcome> {
    let types = parse_types(&args.types)?;

    let mut builder = ConfigBuilder::from_config(ctx.config.clone());
    if args.review {
        builder = builder.with_acceptance(AcceptancePolicy::Review);
    }
    if let Some(threshold) = args.threshold {
        builder = builder.with_score_threshold(threshold);
    }
    let config = builder.build()?;

    let (service, store) = ctx
        .service(config, Some(args.entities.as_path()), &args.ontology)
        .await?;
    let report = service.run(&types).await?;

    let unresolved = report
        .outcomes
        .iter()
        .filter_map(|outcome| match &outcome.resolution {
            Resolution::Unresolved(reason) => Some(UnresolvedEntity {
                id: outcome.entity.id,
                entity_type: outcome.entity.entity_type,
                reason: reason.clone(),
                suggestions: outcome.entity.suggestions.len(),
            }),
            Resolution::Accepted(_) => None,
        })
        .collect();

    let written_to = if args.dry_run {
        None
    } else {
        let target = args.out.clone().unwrap_or_else(|| args.entities.clone());
        json::write_entities(&target, &store.entities().await).await?;
        info!(path = %target.display(), "Wrote matched entities");
        Some(target)
    };

    Ok(RunOutcome {
        summary: report.summary,
        unresolved,
        written_to,
    })
}

pub async fn handle_run_command(
    args: RunArgs,
    ctx: &OntomatchCliContext,
    output_format: &str,
) -> ontomatch::Result<()> {
    let outcome = execute_run(&args, ctx).await?;

    if output_format == "json" {
        print_json(&outcome);
        return Ok(());
    }

    print_summary(&outcome.summary);

    if !outcome.unresolved.is_empty() {
        println!();
        println!(
            "{}",
            format_info(&format!(
                "{} entities left for review:",
                outcome.unresolved.len()
            ))
        );
        for entity in &outcome.unresolved {
            println!(
                "  {} {} {} ({} suggestions)",
                entity.id.to_string().dimmed(),
                format_status(MappingStatus::Unmapped),
                describe_unresolved(&entity.reason),
                entity.suggestions
            );
        }
    }

    if let Some(path) = &outcome.written_to {
        println!();
        println!("{}", format_info(&format!("Results written to {}", path.display())));
    }
    Ok(())
}
