use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gridtune_core::ParamSet;
use gridtune_store::{Collation, CsvStore, Selection};

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Result root to query.
    #[arg(long, default_value = "gridtune_results")]
    pub root: PathBuf,
    /// Result file extension inside the root.
    #[arg(long, default_value = "csv")]
    pub ext: String,
    /// Metric column to reduce.
    #[arg(long)]
    pub metric: String,
    /// Reduction applied within each result file.
    #[arg(long, default_value = "max")]
    pub select: String,
    /// Collation across runs of one configuration: mean or all.
    #[arg(long, default_value = "mean")]
    pub collate: String,
    /// Constraint in name=value form; repeatable.
    #[arg(long = "where", value_name = "NAME=VALUE")]
    pub constraints: Vec<String>,
}

pub fn run(args: &ReadArgs) -> Result<(), Box<dyn Error>> {
    let params = ParamSet::parse_tokens(&args.constraints)?;
    let select: Selection = args.select.parse()?;
    let collate: Collation = args.collate.parse()?;
    let store = CsvStore::with_extension(&args.root, &args.ext);
    let readings = store.read(&params, &args.metric, select, collate)?;
    if readings.is_empty() {
        println!("no results");
        return Ok(());
    }
    for reading in readings {
        let values = reading
            .values
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}\t{}", reading.path.display(), values);
    }
    Ok(())
}
