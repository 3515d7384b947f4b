//! End-to-end matching passes over the in-memory store.

use ontomatch::matching::IndexReport;
use ontomatch::prelude::*;
use ontomatch::search::BuildReport;
use std::sync::Arc;

const MELANOMA: &str = "http://purl.obolibrary.org/obo/NCIT_C3224";
const CISPLATIN: &str = "http://purl.obolibrary.org/obo/NCIT_C376";

fn ontology() -> Vec<OntologyTerm> {
    vec![
        OntologyTerm::new("NCIT_C3224", MELANOMA, "Melanoma", "diagnosis")
            .with_synonym("Malignant Melanoma")
            .with_description("A malignant neoplasm composed of melanocytes."),
        OntologyTerm::new("NCIT_C376", CISPLATIN, "Cisplatin", "treatment").with_synonym("CDDP"),
        OntologyTerm::new("NCIT_C9145", "http://x/C9145", "Lung Carcinoma", "diagnosis")
            .with_synonym("Carcinoma of Lung"),
        OntologyTerm::new("NCIT_C4878", "http://x/C4878", "Lung Cancer", "diagnosis")
            .with_synonym("Carcinoma of Lung"),
    ]
}

fn diagnosis(values: &[(MappingKey, &str)]) -> MappingEntity {
    MappingEntity::new(
        EntityType::Diagnosis,
        values.iter().map(|(key, value)| (*key, Some(*value))),
    )
    .expect("valid diagnosis")
}

fn treatment(name: &str, source: &str) -> MappingEntity {
    MappingEntity::new(
        EntityType::Treatment,
        [
            (MappingKey::TreatmentName, Some(name)),
            (MappingKey::DataSource, Some(source)),
        ],
    )
    .expect("valid treatment")
}

async fn service_with(
    config: OntomatchConfig,
    entities: Vec<MappingEntity>,
) -> (MatchingService, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new().with_terms(ontology()));
    store
        .insert_all(entities)
        .await
        .expect("Failed to seed store");

    let service = init(config, store.clone(), store.clone())
        .await
        .expect("Failed to initialize service");
    (service, store)
}

fn testing_config() -> OntomatchConfig {
    ConfigBuilder::testing().build().expect("valid config")
}

#[tokio::test]
async fn test_exact_ontology_matches_are_mapped() {
    let melanoma = diagnosis(&[
        (MappingKey::SampleDiagnosis, "Malignant Melanoma"),
        (MappingKey::DataSource, "JAX"),
    ]);
    let cisplatin = treatment("CDDP", "JAX");
    let unknown = treatment("Compound X-17", "JAX");
    let ids = [melanoma.id, cisplatin.id, unknown.id];

    let (service, store) =
        service_with(testing_config(), vec![melanoma, cisplatin, unknown]).await;
    let report = service.run(&EntityType::ALL).await.expect("run failed");

    let melanoma = store.get(ids[0]).await.unwrap().unwrap();
    assert_eq!(melanoma.status, MappingStatus::Mapped);
    assert_eq!(melanoma.mapping_type, Some(MappingType::AutomaticMapped));
    assert_eq!(melanoma.mapped_term_url.as_deref(), Some(MELANOMA));
    assert_eq!(melanoma.mapped_term_label.as_deref(), Some("Melanoma"));
    assert_eq!(melanoma.source, Some(MappingSource::Ontology));

    let cisplatin = store.get(ids[1]).await.unwrap().unwrap();
    assert_eq!(cisplatin.mapped_term_url.as_deref(), Some(CISPLATIN));

    let unknown = store.get(ids[2]).await.unwrap().unwrap();
    assert_eq!(unknown.status, MappingStatus::Unmapped);
    assert_eq!(unknown.mapping_type, Some(MappingType::AutomaticReview));

    let diagnosis = report.summary.get(EntityType::Diagnosis).unwrap();
    assert_eq!((diagnosis.processed, diagnosis.auto_mapped), (1, 1));
    assert_eq!(diagnosis.hit_rate, Some(100));
    let treatment = report.summary.get(EntityType::Treatment).unwrap();
    assert_eq!((treatment.processed, treatment.auto_mapped), (2, 1));
    assert_eq!(treatment.hit_rate, Some(50));
}

#[tokio::test]
async fn test_rule_match_ignores_punctuation() {
    let mut rule = diagnosis(&[
        (MappingKey::SampleDiagnosis, "Ductal Carcinoma In Situ"),
        (MappingKey::TumorType, "Primary"),
        (MappingKey::DataSource, "JAX"),
    ]);
    rule.apply_manual_mapping("http://x/C2924", "Ductal Breast Carcinoma In Situ", MappingStatus::Mapped);

    let variant = diagnosis(&[
        (MappingKey::SampleDiagnosis, "Ductal Carcinoma, In-Situ"),
        (MappingKey::TumorType, "primary"),
        (MappingKey::DataSource, "JAX"),
    ]);
    assert_ne!(rule.fingerprint(), variant.fingerprint());
    let variant_id = variant.id;

    let (service, store) = service_with(testing_config(), vec![rule, variant]).await;
    let report = service.run(&[EntityType::Diagnosis]).await.expect("run failed");

    let matched = store.get(variant_id).await.unwrap().unwrap();
    assert_eq!(matched.status, MappingStatus::Mapped);
    assert_eq!(matched.source, Some(MappingSource::Rule));
    assert_eq!(matched.mapped_term_url.as_deref(), Some("http://x/C2924"));
    assert_eq!(report.outcomes.len(), 1);
}

#[tokio::test]
async fn test_disagreeing_top_band_stays_unresolved() {
    let entity = diagnosis(&[(MappingKey::SampleDiagnosis, "Carcinoma of Lung")]);
    let id = entity.id;

    let (service, store) = service_with(testing_config(), vec![entity]).await;
    let report = service.run(&[EntityType::Diagnosis]).await.expect("run failed");

    match &report.outcomes[0].resolution {
        Resolution::Unresolved(UnresolvedReason::Disagreement { urls }) => {
            assert_eq!(urls.len(), 2);
        }
        other => panic!("unexpected resolution {:?}", other),
    }

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, MappingStatus::Unmapped);
    assert_eq!(stored.mapping_type, Some(MappingType::AutomaticReview));
    assert!(stored.suggestions.len() >= 2);
    assert_eq!(report.summary.get(EntityType::Diagnosis).unwrap().hit_rate, Some(0));
}

#[tokio::test]
async fn test_review_policy_queues_acceptances() {
    let config = ConfigBuilder::testing()
        .with_acceptance(AcceptancePolicy::Review)
        .build()
        .unwrap();
    let entity = diagnosis(&[(MappingKey::SampleDiagnosis, "Melanoma")]);
    let id = entity.id;

    let (service, store) = service_with(config, vec![entity]).await;
    let report = service.run(&[EntityType::Diagnosis]).await.unwrap();

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, MappingStatus::Review);
    assert_eq!(stored.mapping_type, Some(MappingType::AutomaticReview));
    assert_eq!(stored.mapped_term_url.as_deref(), Some(MELANOMA));
    assert_eq!(report.summary.get(EntityType::Diagnosis).unwrap().auto_mapped, 1);
}

#[tokio::test]
async fn test_strict_threshold_rejects_fuzzy_matches() {
    let entity = diagnosis(&[(MappingKey::SampleDiagnosis, "Melanomma")]);
    let (service, _store) = service_with(testing_config(), vec![entity.clone()]).await;

    let suggestions = service.suggest(&entity);
    assert_eq!(suggestions.items[0].target_url(), MELANOMA);
    assert!(suggestions.items[0].score() < 95);

    let outcome = service.evaluate(entity);
    assert!(matches!(
        outcome.resolution,
        Resolution::Unresolved(UnresolvedReason::BelowThreshold { .. })
    ));
}

#[tokio::test]
async fn test_empty_pass_has_no_hit_rate() {
    let (service, _store) = service_with(testing_config(), Vec::new()).await;
    let report = service.run(&EntityType::ALL).await.unwrap();

    assert!(report.outcomes.is_empty());
    for summary in &report.summary.types {
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.hit_rate, None);
    }
}

#[tokio::test]
async fn test_ingest_deduplicates() {
    let (service, store) = service_with(testing_config(), Vec::new()).await;

    let first = service.ingest(treatment("Cisplatin", "JAX")).await.unwrap();
    let second = service.ingest(treatment("CISPLATIN", "jax")).await.unwrap();
    assert!(matches!(first, InsertOutcome::Inserted(_)));
    assert_eq!(second, InsertOutcome::Duplicate(first.id()));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_manual_mapping_feeds_rule_corpus() {
    let entity = treatment("Cis-DDP regimen A", "CRL");
    let id = entity.id;
    let (service, store) = service_with(testing_config(), vec![entity]).await;

    let report = service.run(&[EntityType::Treatment]).await.unwrap();
    assert!(!report.outcomes[0].resolution.is_accepted());

    let mut reviewed = store.get(id).await.unwrap().unwrap();
    reviewed.apply_manual_mapping(CISPLATIN, "Cisplatin", MappingStatus::Mapped);
    store.save(&[reviewed]).await.unwrap();

    let rebuilt = service.rebuild_indexes().await.unwrap();
    assert_eq!(rebuilt.rules, BuildReport { indexed: 1, skipped: 0 });

    let repeat = treatment("Cis DDP Regimen A", "CRL");
    let outcome = service.evaluate(repeat);
    match outcome.resolution {
        Resolution::Accepted(acceptance) => {
            assert_eq!(acceptance.url, CISPLATIN);
            assert_eq!(acceptance.source, MappingSource::Rule);
        }
        other => panic!("unexpected resolution {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_terms_are_skipped() {
    let store = Arc::new(InMemoryStore::new().with_terms(vec![
        OntologyTerm::new("ok", "http://x/ok", "Melanoma", "diagnosis"),
        OntologyTerm::new("no-url", "", "Sarcoma", "diagnosis"),
    ]));
    let service = MatchingService::new(testing_config(), store.clone(), store).unwrap();

    let report = service.rebuild_indexes().await.unwrap();
    assert_eq!(
        report,
        IndexReport {
            rules: BuildReport { indexed: 0, skipped: 0 },
            ontology: BuildReport { indexed: 1, skipped: 1 },
        }
    );
    assert!(service.index().is_built());
}

fn suggest_with_defaults(
    terms: Vec<OntologyTerm>,
    entity: &MappingEntity,
) -> (Suggestions, Resolution) {
    let config = OntomatchConfig::default();
    let index = DualIndex::new(&config.search);
    index.rules.build(Vec::new());
    index.ontology.build(terms);

    let suggestions = SuggestionEngine::new(&config.search).suggest(&index, entity);
    let resolution = ConsensusResolver::new(&config.matching).resolve(&suggestions);
    (suggestions, resolution)
}

#[test]
fn test_long_exact_labels_are_accepted() {
    const SQUAMOUS: &str =
        "squamous cell carcinoma of the head and neck region not otherwise specified";
    const MPNST: &str = "Malignant Peripheral Nerve Sheath Tumor with Rhabdomyoblastic \
        Differentiation Arising in the Retroperitoneum of an Adult Patient Not Otherwise Specified";

    let terms = vec![
        OntologyTerm::new("NCIT_C34447", "http://x/C34447", SQUAMOUS, "diagnosis"),
        OntologyTerm::new("NCIT_C3790", "http://x/C3790", MPNST, "diagnosis"),
        OntologyTerm::new("NCIT_C2929", "http://x/C2929", "Squamous Cell Carcinoma", "diagnosis"),
    ];

    for (text, url) in [(SQUAMOUS, "http://x/C34447"), (MPNST, "http://x/C3790")] {
        let entity = diagnosis(&[(MappingKey::SampleDiagnosis, text)]);
        let (suggestions, resolution) = suggest_with_defaults(terms.clone(), &entity);

        assert_eq!(suggestions.items[0].target_url(), url);
        assert_eq!(suggestions.items[0].score(), 100);
        assert!(suggestions.items[1..].iter().all(|s| s.score() < 100));
        assert!(resolution.is_accepted(), "{} should be accepted", text);
    }

    // the first ten words alone are not the long label
    let prefix = diagnosis(&[(
        MappingKey::SampleDiagnosis,
        "squamous cell carcinoma of the head and neck region not",
    )]);
    let (suggestions, _) = suggest_with_defaults(terms, &prefix);
    assert!(suggestions.best_score().is_some_and(|best| best < 95));
}

#[test]
fn test_large_catalog_within_default_budget() {
    const MODIFIERS: [&str; 20] = [
        "Invasive", "Metastatic", "Recurrent", "Primary", "Refractory", "Localized", "Advanced",
        "Early", "Familial", "Sporadic", "Childhood", "Adult", "Hereditary", "Secondary",
        "Multifocal", "Occult", "Unresectable", "Resectable", "Stage", "Residual",
    ];
    const SITES: [&str; 30] = [
        "Breast", "Lung", "Colon", "Rectal", "Gastric", "Hepatic", "Pancreatic", "Renal",
        "Bladder", "Prostate", "Ovarian", "Cervical", "Endometrial", "Thyroid", "Adrenal",
        "Esophageal", "Skin", "Bone", "Brain", "Spinal", "Tongue", "Laryngeal", "Nasal",
        "Orbital", "Testicular", "Penile", "Vulvar", "Vaginal", "Anal", "Biliary",
    ];
    const HISTOLOGIES: [&str; 25] = [
        "Carcinoma", "Adenocarcinoma", "Sarcoma", "Lymphoma", "Melanoma", "Blastoma", "Glioma",
        "Mesothelioma", "Myeloma", "Neuroma", "Papilloma", "Adenoma", "Fibroma", "Lipoma",
        "Teratoma", "Seminoma", "Thymoma", "Chordoma", "Ependymoma", "Meningioma", "Hemangioma",
        "Leiomyoma", "Osteoma", "Chondroma", "Schwannoma",
    ];

    let mut terms = Vec::with_capacity(60_001);
    for modifier in MODIFIERS {
        for site in SITES {
            for histology in HISTOLOGIES {
                for grade in 1..=4 {
                    let id = format!("GEN_{}", terms.len());
                    terms.push(OntologyTerm::new(
                        id.as_str(),
                        format!("http://x/{}", id),
                        format!("{} {} {} Grade {}", modifier, site, histology, grade),
                        "diagnosis",
                    ));
                }
            }
        }
    }
    terms.push(
        OntologyTerm::new("NCIT_C4194", "http://x/C4194", "Invasive Ductal Carcinoma", "diagnosis")
            .with_synonym("IDC"),
    );
    assert_eq!(terms.len(), 60_001);

    let entity = diagnosis(&[(MappingKey::SampleDiagnosis, "Invasive Ductal Carcinoma")]);
    let (suggestions, resolution) = suggest_with_defaults(terms, &entity);

    assert!(suggestions.failures.is_empty(), "{:?}", suggestions.failures);
    assert_eq!(suggestions.items[0].target_url(), "http://x/C4194");
    assert_eq!(suggestions.items[0].score(), 100);
    assert!(resolution.is_accepted());
}
