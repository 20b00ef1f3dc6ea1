use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gridtune_core::ParamSet;
use gridtune_store::CsvStore;

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Result root to query.
    #[arg(long, default_value = "gridtune_results")]
    pub root: PathBuf,
    /// Result file extension inside the root.
    #[arg(long, default_value = "csv")]
    pub ext: String,
    /// Configuration parameter in name=value form; repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

pub fn run(args: &ExistsArgs) -> Result<(), Box<dyn Error>> {
    let params = ParamSet::parse_tokens(&args.params)?;
    let store = CsvStore::with_extension(&args.root, &args.ext);
    println!("{}", store.exists(&params)?);
    Ok(())
}
