// tests/readers_view.rs
// Reader behavior over a coordinator fed by a fixed source: ids, literal and
// numeric presentation, enabled-pollen filtering, error reporting.

use std::sync::Arc;

use async_trait::async_trait;
use pollen_risk_watcher::{
    build_readers, CountyCode, CountyRisksPayload, FetchError, PollenKind, ReadError,
    RefreshCoordinator, RiskDataset, RiskSource, RiskValue, WatcherConfig,
};

const INTERVAL: std::time::Duration = std::time::Duration::from_secs(3 * 3600);

/// Serves the same snapshot forever.
struct StaticSource {
    dataset: RiskDataset,
}

#[async_trait]
impl RiskSource for StaticSource {
    async fn fetch(&self, _county: &CountyCode) -> Result<RiskDataset, FetchError> {
        Ok(self.dataset.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn county() -> CountyCode {
    "60".parse().expect("valid county")
}

fn oise_dataset(aggregate: u8) -> RiskDataset {
    let payload: CountyRisksPayload = serde_json::from_value(serde_json::json!({
        "countyName": "Oise",
        "riskLevel": aggregate,
        "risks": [
            {"pollenName": "Bouleau", "level": 1},
            {"pollenName": "Graminées", "level": 3},
            {"pollenName": "Chêne", "level": 0}
        ]
    }))
    .expect("payload");
    RiskDataset::from_payload(county(), payload)
}

fn coordinator_with(dataset: RiskDataset) -> RefreshCoordinator {
    RefreshCoordinator::new(Arc::new(StaticSource { dataset }), county(), INTERVAL)
}

fn config(toml: &str) -> WatcherConfig {
    WatcherConfig::from_toml_str(toml).expect("config parses")
}

#[tokio::test]
async fn readers_report_unavailable_before_first_refresh() {
    let coordinator = coordinator_with(oise_dataset(2));
    let cfg = config(r#"county = "60""#);
    let (pollens, aggregates) = build_readers(&coordinator, &cfg);

    assert!(matches!(
        pollens[0].level(),
        Err(ReadError::Unavailable { .. })
    ));
    assert!(matches!(
        aggregates[0].value(),
        Err(ReadError::Unavailable { .. })
    ));
    assert!(aggregates[1].county_name().is_none());
}

#[tokio::test]
async fn pollen_readers_expose_ids_and_literal_values() {
    let coordinator = coordinator_with(oise_dataset(2));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(
        r#"
        county = "60"
        literal_states = true
        pollens = ["bouleau", "graminees"]
        "#,
    );
    let (pollens, _) = build_readers(&coordinator, &cfg);
    assert_eq!(pollens.len(), 2);

    let bouleau = pollens
        .iter()
        .find(|r| r.name() == "bouleau")
        .expect("bouleau reader");
    assert_eq!(bouleau.id(), "pollens_60_bouleau");
    assert_eq!(bouleau.kind(), PollenKind::Tree);
    assert_eq!(bouleau.level().expect("level"), 1);
    assert_eq!(
        bouleau.value().expect("value"),
        RiskValue::Literal("faible".to_string())
    );

    let graminees = pollens
        .iter()
        .find(|r| r.name() == "graminées")
        .expect("graminées reader");
    assert_eq!(graminees.id(), "pollens_60_graminees");
    assert_eq!(graminees.kind(), PollenKind::Grass);
    assert_eq!(
        graminees.value().expect("value"),
        RiskValue::Literal("élevé".to_string())
    );
    coordinator.stop();
}

#[tokio::test]
async fn numeric_presentation_returns_raw_levels() {
    let coordinator = coordinator_with(oise_dataset(2));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(
        r#"
        county = "60"
        literal_states = false
        pollens = ["bouleau"]
        "#,
    );
    let (pollens, _) = build_readers(&coordinator, &cfg);
    assert_eq!(pollens[0].value().expect("value"), RiskValue::Numeric(1));
    coordinator.stop();
}

#[tokio::test]
async fn aggregate_readers_cover_both_presentations() {
    let coordinator = coordinator_with(oise_dataset(3));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(r#"county = "60""#);
    let (_, aggregates) = build_readers(&coordinator, &cfg);
    assert_eq!(aggregates.len(), 2);

    assert_eq!(aggregates[0].id(), "pollens_60");
    assert_eq!(
        aggregates[0].value().expect("literal value"),
        RiskValue::Literal("élevé".to_string())
    );
    assert_eq!(aggregates[0].county_name().as_deref(), Some("Oise"));

    assert_eq!(aggregates[1].id(), "pollens_60_risklevel");
    assert_eq!(
        aggregates[1].value().expect("numeric value"),
        RiskValue::Numeric(3)
    );
    coordinator.stop();
}

#[tokio::test]
async fn empty_pollen_list_enables_whole_vocabulary() {
    let coordinator = coordinator_with(oise_dataset(1));
    let cfg = config(r#"county = "60""#);
    let (pollens, _) = build_readers(&coordinator, &cfg);
    assert_eq!(pollens.len(), 20);
}

#[tokio::test]
async fn pollen_absent_from_snapshot_reports_unknown() {
    let coordinator = coordinator_with(oise_dataset(1));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(
        r#"
        county = "60"
        pollens = ["olivier"]
        "#,
    );
    let (pollens, _) = build_readers(&coordinator, &cfg);
    assert_eq!(pollens.len(), 1);
    assert!(matches!(
        pollens[0].level(),
        Err(ReadError::UnknownPollen { .. })
    ));
    coordinator.stop();
}

#[tokio::test]
async fn out_of_scale_level_surfaces_mapping_error() {
    let payload: CountyRisksPayload = serde_json::from_value(serde_json::json!({
        "countyName": "Oise",
        "riskLevel": 9,
        "risks": [{"pollenName": "Bouleau", "level": 9}]
    }))
    .expect("payload");
    let coordinator =
        coordinator_with(RiskDataset::from_payload(county(), payload));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(
        r#"
        county = "60"
        pollens = ["bouleau"]
        "#,
    );
    let (pollens, aggregates) = build_readers(&coordinator, &cfg);

    // The raw level is still readable.
    assert_eq!(pollens[0].level().expect("level"), 9);
    // Mapping it through the four-label scale is an error, not a panic.
    assert_eq!(
        pollens[0].label(),
        Err(ReadError::LevelOutOfRange {
            level: 9,
            scale_len: 4
        })
    );
    assert!(matches!(
        aggregates[0].value(),
        Err(ReadError::LevelOutOfRange { .. })
    ));
    // The numeric aggregate is unaffected by the scale.
    assert_eq!(
        aggregates[1].value().expect("numeric value"),
        RiskValue::Numeric(9)
    );
    coordinator.stop();
}

#[tokio::test]
async fn custom_scale_applies_to_readers() {
    let coordinator = coordinator_with(oise_dataset(2));
    coordinator.start().await.expect("start succeeds");

    let cfg = config(
        r#"
        county = "60"
        pollens = ["graminees"]
        risk_labels = ["none", "low", "mid", "high", "severe"]
        "#,
    );
    let (pollens, aggregates) = build_readers(&coordinator, &cfg);
    assert_eq!(
        pollens[0].value().expect("value"),
        RiskValue::Literal("high".to_string())
    );
    assert_eq!(
        aggregates[0].value().expect("value"),
        RiskValue::Literal("mid".to_string())
    );
    coordinator.stop();
}
