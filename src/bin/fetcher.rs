use anyhow::Result;
use casafinder::commands::{print_response, run_fetch};
use casafinder::config::{FetchArgs, StoreArgs};
use casafinder::debug;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Archive search result pages as raw HTML")]
struct Args {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    fetch: FetchArgs,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::init(args.debug);

    let report = run_fetch(&args.store, &args.fetch)?;
    print_response(&report.to_response(&args.store.raw_container))
}
