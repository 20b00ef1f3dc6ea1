use gridtune_core::{ErrorInfo, ParamSet, Searcher, TuneError};
use gridtune_search::{GridParameter, GridSearcher};
use serde_json::json;

fn axes() -> Vec<GridParameter> {
    vec![
        GridParameter {
            name: "--p1".to_string(),
            values: vec![json!(1), json!(2)],
        },
        GridParameter {
            name: "--p2".to_string(),
            values: vec![json!("a"), json!("b")],
        },
    ]
}

fn first_config(params: &ParamSet) -> bool {
    params.tokens().expect("tokens") == vec!["--p1=1", "--p2=a"]
}

#[test]
fn a_fully_run_configuration_is_skipped() {
    let mut searcher = GridSearcher::new(&axes(), 2).expect("grid");
    searcher
        .check_existing_runs(Box::new(|params: &ParamSet| -> Result<usize, TuneError> {
            Ok(if first_config(params) { 2 } else { 0 })
        }))
        .expect("bind");
    let proposed: Vec<Vec<String>> = searcher
        .map(|config| config.expect("config").tokens().expect("tokens"))
        .collect();
    assert_eq!(proposed.len(), 6);
    assert_eq!(proposed[0], vec!["--p1=1", "--p2=b"]);
    assert!(proposed.iter().all(|t| t != &["--p1=1", "--p2=a"]));
}

#[test]
fn resume_picks_up_after_completed_runs() {
    let mut searcher = GridSearcher::new(&axes(), 2).expect("grid");
    searcher
        .check_existing_runs(Box::new(|params: &ParamSet| -> Result<usize, TuneError> {
            Ok(if first_config(params) { 1 } else { 0 })
        }))
        .expect("bind");
    let proposed: Vec<Vec<String>> = searcher
        .map(|config| config.expect("config").tokens().expect("tokens"))
        .collect();
    // The first configuration has one run left; the rest get both.
    assert_eq!(proposed.len(), 7);
    assert_eq!(proposed[0], vec!["--p1=1", "--p2=a"]);
    assert_eq!(proposed[1], vec!["--p1=1", "--p2=b"]);
}

#[test]
fn a_fully_run_grid_is_exhausted_immediately() {
    let mut searcher = GridSearcher::new(&axes(), 2).expect("grid");
    searcher
        .check_existing_runs(Box::new(|_: &ParamSet| -> Result<usize, TuneError> { Ok(2) }))
        .expect("bind");
    assert!(searcher.next_config().unwrap_err().is_exhausted());
}

#[test]
fn zero_runs_refuses_to_bind_an_oracle() {
    let mut searcher = GridSearcher::new(&axes(), 0).expect("grid");
    let err = searcher
        .check_existing_runs(Box::new(|_: &ParamSet| -> Result<usize, TuneError> { Ok(0) }))
        .unwrap_err();
    assert!(matches!(err, TuneError::Plan(_)));
}

#[test]
fn oracle_failures_are_not_swallowed() {
    let mut searcher = GridSearcher::new(&axes(), 1).expect("grid");
    searcher
        .check_existing_runs(Box::new(|_: &ParamSet| -> Result<usize, TuneError> {
            Err(TuneError::Storage(ErrorInfo::new(
                "test.broken",
                "oracle unavailable",
            )))
        }))
        .expect("bind");
    let err = searcher.next_config().unwrap_err();
    assert!(matches!(err, TuneError::Storage(_)));
}
