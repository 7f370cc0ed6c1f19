#![cfg(not(tarpaulin_include))]

use crate::chart::{ChartConfig, compute_chart};
use crate::project::Project;
use std::error::Error;

/// Convert a project to CSV format
///
/// This function exports a project's raw counters and its computed chart
/// values to CSV. It creates a string where:
/// - The first section lists every raw stat field and its value
/// - Each chart follows as its own section with one row per segment
/// - Charts that evaluate to not-applicable export a single `NA` row
/// - Special characters (commas, quotes, newlines) are properly escaped
///
/// # Arguments
/// * `project` - Reference to the project to convert
/// * `configs` - Chart configurations to evaluate against the project
///
/// # Returns
/// * `Result<String, Box<dyn Error>>` - CSV content as a string or an error
pub fn to_csv(project: &Project, configs: &[ChartConfig]) -> Result<String, Box<dyn Error>> {
    let mut csv_content = String::from("section,name,value\n");

    for (field, value) in project.stats.iter() {
        push_row(&mut csv_content, "stats", field, &value.to_string());
    }

    let mut sorted: Vec<&ChartConfig> = configs.iter().collect();
    sorted.sort_by_key(|config| config.order);

    for config in sorted {
        match compute_chart(config, &project.stats) {
            Some(computed) => {
                for segment in &computed.segments {
                    push_row(
                        &mut csv_content,
                        &config.chart_id,
                        &segment.label,
                        &segment.value.to_string(),
                    );
                }
                if let Some(total) = computed.total {
                    push_row(&mut csv_content, &config.chart_id, "total", &total.to_string());
                }
            }
            None => {
                push_row(&mut csv_content, &config.chart_id, &config.title, "NA");
            }
        }
    }

    Ok(csv_content)
}

fn push_row(csv_content: &mut String, section: &str, name: &str, value: &str) {
    csv_content.push_str(&escape_csv(section));
    csv_content.push(',');
    csv_content.push_str(&escape_csv(name));
    csv_content.push(',');
    csv_content.push_str(&escape_csv(value));
    csv_content.push('\n');
}

/// Escape commas, quotes and newlines as needed
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        let escaped = value.replace("\"", "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
