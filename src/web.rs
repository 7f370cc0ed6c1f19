#![cfg(not(tarpaulin_include))]

use chrono::Utc;
use messmass::app;
use messmass::project::Project;
use messmass::saving;
use std::env;

/// Main entry point for the engine's JSON API server
///
/// Optional arguments:
/// * `argv[1]` - path to a project JSON file to serve
/// * `argv[2]` - path to a chart configuration JSON file
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let project = if args.len() >= 2 {
        saving::project_from_json(&std::fs::read_to_string(&args[1])?)?
    } else {
        Project::new("untitled", Utc::now().date_naive())
    };

    let charts = if args.len() >= 3 {
        saving::charts_from_json(&std::fs::read_to_string(&args[2])?)?
    } else {
        Vec::new()
    };

    app::run(project, charts, "127.0.0.1:3000").await
}
