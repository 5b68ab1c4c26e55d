use wikitables_core::{default_plan, JobSpec, PlanError, RunPlan};

fn spec(url: &str, name: &str) -> JobSpec {
    JobSpec::new(url, name).expect("valid spec")
}

#[test]
fn default_plan_lists_the_five_articles_in_order() {
    let plan = default_plan();
    let names: Vec<_> = plan
        .jobs()
        .iter()
        .map(|job| job.spec.output_name())
        .collect();
    assert_eq!(names, ["mountains", "volcanoes", "123", "nba", "films"]);

    let ids: Vec<_> = plan.jobs().iter().map(|job| job.id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
}

#[test]
fn duplicate_output_names_are_a_collision_error() {
    let result = RunPlan::new(vec![
        spec("https://en.wikipedia.org/wiki/A", "tables"),
        spec("https://en.wikipedia.org/wiki/B", "tables"),
    ]);
    assert_eq!(
        result.unwrap_err(),
        PlanError::DuplicateName {
            name: "tables".to_string()
        }
    );
}

#[test]
fn distinct_names_for_the_same_url_are_allowed() {
    let plan = RunPlan::new(vec![
        spec("https://en.wikipedia.org/wiki/A", "first"),
        spec("https://en.wikipedia.org/wiki/A", "second"),
    ])
    .expect("same url twice is fine");
    assert_eq!(plan.len(), 2);
}

#[test]
fn empty_plan_is_rejected() {
    assert_eq!(RunPlan::new(Vec::new()).unwrap_err(), PlanError::NoJobs);
}
