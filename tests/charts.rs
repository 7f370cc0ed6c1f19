use messmass::chart::{
    ChartConfig, ChartType, compute_all, compute_chart, format_value,
};
use messmass::stats::StatsRecord;

fn sample_stats() -> StatsRecord {
    let mut stats = StatsRecord::new();
    stats.set("indoor", 30.0);
    stats.set("outdoor", 50.0);
    stats.set("stadium", 20.0);
    stats.set("eventAttendees", 200.0);
    stats.set("visitWeb", 150.0);
    stats.set("female", 80.0);
    stats.set("male", 120.0);
    stats
}

#[test]
fn pie_chart_segments_total_and_percentages() {
    let config = ChartConfig::pie(
        "fan_location",
        "Fan Location",
        vec![
            ("indoor", "Indoor", "[indoor]"),
            ("outdoor", "Outdoor", "[outdoor]"),
            ("stadium", "Stadium", "[stadium]"),
        ],
    );

    let computed = compute_chart(&config, &sample_stats()).unwrap();
    assert_eq!(computed.chart_id, "fan_location");
    assert_eq!(computed.chart_type, ChartType::Pie);
    assert_eq!(computed.total, Some(100.0));

    let values: Vec<f64> = computed.segments.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![30.0, 50.0, 20.0]);
    let percentages: Vec<Option<f64>> =
        computed.segments.iter().map(|s| s.percentage).collect();
    assert_eq!(percentages, vec![Some(30.0), Some(50.0), Some(20.0)]);
}

#[test]
fn explicit_total_formula_overrides_segment_sum() {
    let mut config = ChartConfig::pie(
        "gender",
        "Gender Split",
        vec![
            ("female", "Female", "[female]"),
            ("male", "Male", "[male]"),
        ],
    );
    config.total_formula = Some("[eventAttendees]".to_string());

    let computed = compute_chart(&config, &sample_stats()).unwrap();
    assert_eq!(computed.total, Some(200.0));
    assert_eq!(computed.segments[0].percentage, Some(40.0));
    assert_eq!(computed.segments[1].percentage, Some(60.0));
}

#[test]
fn zero_total_yields_no_percentages() {
    let config = ChartConfig::pie(
        "empty",
        "Empty",
        vec![("a", "A", "[nope]"), ("b", "B", "[alsoNope]")],
    );

    let computed = compute_chart(&config, &sample_stats()).unwrap();
    assert_eq!(computed.total, Some(0.0));
    assert!(computed.segments.iter().all(|s| s.percentage.is_none()));
}

#[test]
fn na_element_makes_chart_na() {
    let config = ChartConfig::pie(
        "broken",
        "Broken",
        vec![
            ("ok", "Ok", "[indoor]"),
            ("bad", "Bad", "[indoor] / [doesNotExist]"),
        ],
    );
    assert!(compute_chart(&config, &sample_stats()).is_none());
}

#[test]
fn na_total_formula_makes_chart_na() {
    let mut config = ChartConfig::pie("t", "T", vec![("a", "A", "[indoor]")]);
    config.total_formula = Some("[indoor] / 0".to_string());
    assert!(compute_chart(&config, &sample_stats()).is_none());
}

#[test]
fn chart_without_elements_is_na() {
    let config = ChartConfig::pie("none", "None", vec![]);
    assert!(compute_chart(&config, &sample_stats()).is_none());
}

#[test]
fn kpi_uses_first_element_only() {
    let mut config = ChartConfig::kpi(
        "engagement",
        "Fan Engagement",
        "[visitWeb] / [eventAttendees] * 100",
    );
    // A stray second element with a broken formula must not affect a KPI.
    config.elements.push(messmass::chart::ChartElement {
        id: "stray".to_string(),
        label: "Stray".to_string(),
        formula: "1 / 0".to_string(),
        color: None,
    });

    let computed = compute_chart(&config, &sample_stats()).unwrap();
    assert_eq!(computed.segments.len(), 1);
    assert_eq!(computed.segments[0].value, 75.0);
    assert_eq!(computed.total, None);
}

#[test]
fn compute_all_sorts_by_order_and_skips_na() {
    let mut first = ChartConfig::kpi("first", "First", "[indoor]");
    first.order = 5;
    let mut second = ChartConfig::kpi("second", "Second", "[outdoor]");
    second.order = 1;
    let broken = ChartConfig::kpi("broken", "Broken", "1 / [doesNotExist]");

    let computed = compute_all(&[first, second, broken], &sample_stats());
    let ids: Vec<&str> = computed.iter().map(|c| c.chart_id.as_str()).collect();
    assert_eq!(ids, vec!["second", "first"]);
}

#[test]
fn format_value_applies_units_decimals_and_grouping() {
    let mut config = ChartConfig::kpi("ad", "Ad Value", "[visitWeb] * 12");
    config.unit_suffix = Some(" EUR".to_string());

    assert_eq!(format_value(1234567.5, &config, 2), "1 234 567.50 EUR");
    assert_eq!(format_value(-1234.0, &config, 0), "-1 234 EUR");
    assert_eq!(format_value(75.0, &config, 1), "75.0 EUR");

    config.unit_prefix = Some("~".to_string());
    config.unit_suffix = Some("%".to_string());
    assert_eq!(format_value(99.5, &config, 0), "~100%");
}

#[test]
fn chart_config_round_trips_through_stored_json() {
    let json = r##"{
        "chart_id": "fan_location",
        "title": "Fan Location",
        "type": "pie",
        "elements": [
            {"id": "indoor", "label": "Indoor", "formula": "[indoor]", "color": "#3b82f6"},
            {"id": "outdoor", "label": "Outdoor", "formula": "[outdoor]"}
        ],
        "order": 3
    }"##;

    let config: ChartConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.chart_type, ChartType::Pie);
    assert_eq!(config.elements.len(), 2);
    assert_eq!(config.elements[0].color.as_deref(), Some("#3b82f6"));
    assert_eq!(config.order, 3);
    assert!(config.total_formula.is_none());

    let back = serde_json::to_string(&config).unwrap();
    let again: ChartConfig = serde_json::from_str(&back).unwrap();
    assert_eq!(config, again);
}
