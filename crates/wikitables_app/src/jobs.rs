use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wikitables_core::{JobSpec, RunPlan};

/// Job list file format:
///
/// ```ron
/// (
///     jobs: [
///         ( url: "https://en.wikipedia.org/wiki/...", output_name: "mountains" ),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobFileEntry {
    url: String,
    output_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct JobFile {
    jobs: Vec<JobFileEntry>,
}

pub fn load_plan(path: &Path) -> anyhow::Result<RunPlan> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading job file {}", path.display()))?;
    let file: JobFile =
        ron::from_str(&content).with_context(|| format!("parsing job file {}", path.display()))?;

    let mut specs = Vec::with_capacity(file.jobs.len());
    for entry in file.jobs {
        let name = entry.output_name.clone();
        let spec = JobSpec::new(entry.url, entry.output_name)
            .with_context(|| format!("invalid job `{name}`"))?;
        specs.push(spec);
    }
    RunPlan::new(specs).with_context(|| format!("building run plan from {}", path.display()))
}
