use crate::args::SuggestArgs;
use crate::context::OntomatchCliContext;
use crate::output::{format_warning, print_json, print_resolution, print_suggestions};
use crate::utils::parse_entity;
use ontomatch::prelude::*;
use serde::Serialize;

/// Ranked suggestions for one term and the decision they lead to.
#[derive(Debug, Serialize)]
pub struct SuggestReport {
    pub entity_type: EntityType,
    pub fingerprint: String,
    pub suggestions: Vec<Suggestion>,
    pub failures: Vec<String>,
    pub resolution: Resolution,
}

pub async fn collect_suggestions(
    args: &SuggestArgs,
    ctx: &OntomatchCliContext,
) -> ontomatch::Result<SuggestReport> {
    let entity = parse_entity(&args.entity_type, &args.values)?;
    let (service, _store) = ctx
        .service(ctx.config.clone(), args.rules.as_deref(), &args.ontology)
        .await?;

    let suggestions = service.suggest(&entity);
    let resolution = ConsensusResolver::new(&ctx.config.matching).resolve(&suggestions);

    Ok(SuggestReport {
        entity_type: entity.entity_type,
        fingerprint: entity.fingerprint(),
        failures: suggestions.failures.iter().map(ToString::to_string).collect(),
        suggestions: suggestions.items.into_iter().take(args.limit).collect(),
        resolution,
    })
}

pub async fn handle_suggest_command(
    args: SuggestArgs,
    ctx: &OntomatchCliContext,
    output_format: &str,
) -> ontomatch::Result<()> {
    let report = collect_suggestions(&args, ctx).await?;

    if output_format == "json" {
        print_json(&report);
        return Ok(());
    }

    for failure in &report.failures {
        println!("{}", format_warning(failure));
    }
    print_suggestions(&report.suggestions, ctx.config.matching.score_threshold);
    println!();
    print_resolution(&report.resolution);
    Ok(())
}
