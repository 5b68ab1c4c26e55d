use std::collections::HashSet;
use std::fmt;

use crate::{JobId, JobSpec};

/// A job with its position in the run assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    pub id: JobId,
    pub spec: JobSpec,
}

/// An ordered, collision-free batch of jobs.
///
/// Job ids are assigned 1..=n in declaration order; the engine runs them in
/// exactly that order. Output names must be pairwise distinct since each one
/// becomes a directory under the consolidated output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    jobs: Vec<PlannedJob>,
}

impl RunPlan {
    pub fn new(specs: Vec<JobSpec>) -> Result<Self, PlanError> {
        if specs.is_empty() {
            return Err(PlanError::NoJobs);
        }
        let mut seen: HashSet<String> = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if !seen.insert(spec.output_name().to_string()) {
                return Err(PlanError::DuplicateName {
                    name: spec.output_name().to_string(),
                });
            }
        }
        let jobs = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| PlannedJob {
                id: index as JobId + 1,
                spec,
            })
            .collect();
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[PlannedJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    NoJobs,
    DuplicateName { name: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::NoJobs => write!(f, "run plan has no jobs"),
            PlanError::DuplicateName { name } => {
                write!(f, "duplicate output name `{name}` in run plan")
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// The built-in batch: five Wikipedia list articles with heavy wikitables.
pub fn default_plan() -> RunPlan {
    let specs = [
        (
            "https://en.wikipedia.org/wiki/List_of_mountains_by_elevation",
            "mountains",
        ),
        (
            "https://en.wikipedia.org/wiki/List_of_volcanoes_by_elevation",
            "volcanoes",
        ),
        (
            "https://en.wikipedia.org/wiki/List_of_current_NBA_team_rosters",
            "123",
        ),
        (
            "https://en.wikipedia.org/wiki/List_of_National_Basketball_Association_career_scoring_leaders",
            "nba",
        ),
        (
            "https://en.wikipedia.org/wiki/List_of_highest-grossing_films",
            "films",
        ),
    ]
    .into_iter()
    .map(|(url, name)| JobSpec::new(url, name).expect("built-in job is valid"))
    .collect();
    RunPlan::new(specs).expect("built-in plan is valid")
}
