use anyhow::Result;
use casafinder::commands::{print_response, run_extract};
use casafinder::config::{ExtractArgs, StoreArgs};
use casafinder::debug;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn archived search pages into a dated listings CSV")]
struct Args {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    extract: ExtractArgs,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::init(args.debug);

    let event = args.extract.load_event(&args.store.raw_container)?;
    print_response(&run_extract(&args.store, &event)?)
}
