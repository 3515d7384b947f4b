use crate::args::FingerprintArgs;
use crate::output::{print_fingerprint, print_json};
use crate::utils::parse_pairs;
use ontomatch::fingerprint::fingerprint_named;
use ontomatch::models::EntityType;
use serde_json::json;

pub fn handle_fingerprint_command(args: FingerprintArgs, output_format: &str) -> ontomatch::Result<()> {
    let entity_type: EntityType = args.entity_type.parse()?;
    let pairs = parse_pairs(&args.values)?;
    let fingerprint = fingerprint_named(entity_type.label(), &pairs)?;

    if output_format == "json" {
        print_json(&json!({
            "entity_type": entity_type,
            "fingerprint": fingerprint,
        }));
    } else {
        print_fingerprint(entity_type, &fingerprint);
    }
    Ok(())
}
