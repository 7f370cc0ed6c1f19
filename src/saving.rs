use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;

use crate::chart::ChartConfig;
use crate::project::Project;

pub fn save_project(project: &Project, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = std::io::BufWriter::new(encoder);

    serialize_into(&mut writer, project)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    Ok(())
}

pub fn load_project(filename: &str) -> std::io::Result<Project> {
    let file = File::open(filename)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);

    let project: Project = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(project)
}

pub fn project_to_json(project: &Project) -> serde_json::Result<String> {
    serde_json::to_string_pretty(project)
}

pub fn project_from_json(json: &str) -> serde_json::Result<Project> {
    serde_json::from_str(json)
}

pub fn charts_to_json(configs: &[ChartConfig]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(configs)
}

pub fn charts_from_json(json: &str) -> serde_json::Result<Vec<ChartConfig>> {
    serde_json::from_str(json)
}
