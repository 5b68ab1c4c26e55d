use std::collections::BTreeMap;

use crate::{JobId, JobSpec, RunPlan};

/// Terminal state of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { files: usize, bytes: u64 },
    Failed { reason: String },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: JobId,
    pub spec: JobSpec,
    pub outcome: Option<JobOutcome>,
}

/// Per-job results for one run.
///
/// Every planned job gets a record up front; outcomes land as the engine
/// reports them. BTreeMap keys keep iteration in job-id (plan) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    records: BTreeMap<JobId, JobRecord>,
}

impl RunReport {
    pub fn new(plan: &RunPlan) -> Self {
        let records = plan
            .jobs()
            .iter()
            .map(|job| {
                (
                    job.id,
                    JobRecord {
                        id: job.id,
                        spec: job.spec.clone(),
                        outcome: None,
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Records the outcome for a planned job. Returns false when the id is
    /// not part of the plan, leaving the report untouched.
    pub fn record(&mut self, id: JobId, outcome: JobOutcome) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.outcome = Some(outcome);
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.records.values()
    }

    /// Output names of jobs that completed, in plan order. These are the
    /// directories the consolidator is allowed to relocate.
    pub fn completed_names(&self) -> Vec<String> {
        self.records
            .values()
            .filter(|record| {
                record
                    .outcome
                    .as_ref()
                    .is_some_and(JobOutcome::is_completed)
            })
            .map(|record| record.spec.output_name().to_string())
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.records.len(),
            ..RunSummary::default()
        };
        for record in self.records.values() {
            match &record.outcome {
                Some(outcome) if outcome.is_completed() => summary.completed += 1,
                Some(_) => summary.failed += 1,
                None => summary.pending += 1,
            }
        }
        summary
    }

    pub fn all_completed(&self) -> bool {
        let summary = self.summary();
        summary.completed == summary.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
}
