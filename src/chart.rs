use crate::formula::{self, EvalResult};
use crate::stats::StatsRecord;
use serde::{Deserialize, Serialize};

/// Available chart types supported by the report surfaces
///
/// This enum defines the different visualization formats a chart
/// configuration can request from the engine.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Pie chart - Shows how segment values split a total
    Pie,

    /// Bar chart - Compares segment values across categories
    Bar,

    /// KPI card - A single derived value displayed on a dashboard card
    Kpi,
}

/// One slice/bar/card of a chart: a label, a formula, and an optional color.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChartElement {
    pub id: String,
    pub label: String,
    pub formula: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Chart configuration as persisted by the admin layer
///
/// These documents own the formula strings; the engine only consumes them.
/// The serde names match the stored JSON (`type` for the chart type).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChartConfig {
    pub chart_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub elements: Vec<ChartElement>,

    /// Overrides the segment sum as the percentage base when present.
    #[serde(default)]
    pub total_formula: Option<String>,

    #[serde(default)]
    pub unit_prefix: Option<String>,
    #[serde(default)]
    pub unit_suffix: Option<String>,

    /// Display position among the other charts of a report.
    #[serde(default)]
    pub order: i32,
}

impl ChartConfig {
    /// A single-value KPI card.
    pub fn kpi(
        chart_id: impl Into<String>,
        title: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        let chart_id = chart_id.into();
        ChartConfig {
            elements: vec![ChartElement {
                id: format!("{}_value", chart_id),
                label: String::new(),
                formula: formula.into(),
                color: None,
            }],
            chart_id,
            title: title.into(),
            subtitle: None,
            chart_type: ChartType::Kpi,
            total_formula: None,
            unit_prefix: None,
            unit_suffix: None,
            order: 0,
        }
    }

    /// A pie chart over `(id, label, formula)` segments.
    pub fn pie(
        chart_id: impl Into<String>,
        title: impl Into<String>,
        segments: Vec<(&str, &str, &str)>,
    ) -> Self {
        ChartConfig {
            chart_id: chart_id.into(),
            title: title.into(),
            subtitle: None,
            chart_type: ChartType::Pie,
            elements: segments
                .into_iter()
                .map(|(id, label, formula)| ChartElement {
                    id: id.to_string(),
                    label: label.to_string(),
                    formula: formula.to_string(),
                    color: None,
                })
                .collect(),
            total_formula: None,
            unit_prefix: None,
            unit_suffix: None,
            order: 0,
        }
    }
}

/// A computed chart element ready for rendering.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChartSegment {
    pub id: String,
    pub label: String,
    pub value: f64,
    /// Share of the chart total, only present when the total is positive.
    pub percentage: Option<f64>,
    pub color: Option<String>,
}

/// A fully evaluated chart for one stats record.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ComputedChart {
    pub chart_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub chart_type: ChartType,
    pub segments: Vec<ChartSegment>,
    pub total: Option<f64>,
}

/// Evaluates a chart configuration against a stats record.
///
/// Every element formula must produce a number; a single not-applicable
/// element makes the whole chart not applicable (`None`), so a
/// partially-missing dataset never renders a misleading chart. KPI charts
/// use their first element only and carry no total.
pub fn compute_chart(config: &ChartConfig, stats: &StatsRecord) -> Option<ComputedChart> {
    let element_count = match config.chart_type {
        ChartType::Kpi => 1,
        _ => config.elements.len(),
    };

    let mut values = Vec::with_capacity(element_count);
    for element in config.elements.iter().take(element_count) {
        match formula::evaluate(&element.formula, stats) {
            EvalResult::Number(value) => values.push((element, value)),
            EvalResult::NotApplicable => return None,
        }
    }

    if values.is_empty() {
        return None;
    }

    let total = match (&config.chart_type, &config.total_formula) {
        (ChartType::Kpi, _) => None,
        (_, Some(total_formula)) => match formula::evaluate(total_formula, stats) {
            EvalResult::Number(value) => Some(value),
            EvalResult::NotApplicable => return None,
        },
        (_, None) => Some(values.iter().map(|(_, value)| value).sum()),
    };

    let segments = values
        .into_iter()
        .map(|(element, value)| {
            let percentage = match total {
                Some(t) if t > 0.0 => Some(value / t * 100.0),
                _ => None,
            };
            ChartSegment {
                id: element.id.clone(),
                label: element.label.clone(),
                value,
                percentage,
                color: element.color.clone(),
            }
        })
        .collect();

    Some(ComputedChart {
        chart_id: config.chart_id.clone(),
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        chart_type: config.chart_type.clone(),
        segments,
        total,
    })
}

/// Evaluates a configuration set in display order, skipping charts that
/// came out not applicable.
pub fn compute_all(configs: &[ChartConfig], stats: &StatsRecord) -> Vec<ComputedChart> {
    let mut sorted: Vec<&ChartConfig> = configs.iter().collect();
    sorted.sort_by_key(|config| config.order);

    sorted
        .into_iter()
        .filter_map(|config| compute_chart(config, stats))
        .collect()
}

/// Renders a value with the chart's unit prefix/suffix, fixed decimals and
/// thousands grouping. Formatting lives here, on the caller side; the
/// evaluator only ever produces plain numbers.
pub fn format_value(value: f64, config: &ChartConfig, decimals: usize) -> String {
    let mut out = String::new();
    if let Some(prefix) = &config.unit_prefix {
        out.push_str(prefix);
    }
    out.push_str(&group_thousands(&format!("{:.*}", decimals, value)));
    if let Some(suffix) = &config.unit_suffix {
        out.push_str(suffix);
    }
    out
}

/// Insert a space between every group of three integer digits.
fn group_thousands(rendered: &str) -> String {
    let (number, fraction) = match rendered.split_once('.') {
        Some((n, f)) => (n, Some(f)),
        None => (rendered, None),
    };
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let mut out = format!("{}{}", sign, grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
