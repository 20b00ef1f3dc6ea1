use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use gridtune_core::{ParamSet, Searcher};
use gridtune_search::{GridSearcher, SweepPlan};
use gridtune_store::CsvStore;
use serde_yaml::from_str;

use crate::submit;

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// YAML sweep plan describing grid axes and the repeat count.
    #[arg(long)]
    pub plan: PathBuf,
    /// Batch submission script handed to the scheduler.
    #[arg(long)]
    pub sbatch: PathBuf,
    /// Training script forwarded as the first job argument.
    #[arg(long)]
    pub script: Option<PathBuf>,
    /// Result root consulted when skipping completed runs.
    #[arg(long, default_value = "gridtune_results")]
    pub root: PathBuf,
    /// Skip (configuration, run) pairs already present in the store.
    #[arg(long)]
    pub skip_existing: bool,
    /// Extra name=value argument appended to every job; repeatable.
    #[arg(long = "carg", value_name = "NAME=VALUE")]
    pub cargs: Vec<String>,
}

pub fn run(args: &LaunchArgs) -> Result<(), Box<dyn Error>> {
    let plan_text = fs::read_to_string(&args.plan)?;
    let plan: SweepPlan = from_str(&plan_text)?;
    let mut searcher = GridSearcher::from_plan(&plan)?;
    if args.skip_existing {
        let store = CsvStore::new(&args.root);
        searcher.check_existing_runs(Box::new(store))?;
    }
    let cargs = ParamSet::parse_tokens(&args.cargs)?.cli_args()?;
    let summary = submit::submit_sweep(&mut searcher, &args.sbatch, args.script.as_deref(), &cargs)?;
    println!(
        "submitted {} jobs, {} rejected",
        summary.submitted, summary.failed
    );
    Ok(())
}
