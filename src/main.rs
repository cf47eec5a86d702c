use anyhow::Result;
use casafinder::commands::{print_response, run_extract, run_fetch, run_pipeline};
use casafinder::config::{ExtractArgs, FetchArgs, StoreArgs};
use casafinder::debug;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Casafinder - listing page archiver and extractor")]
struct Args {
    #[command(flatten)]
    store: StoreArgs,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch search result pages and archive the raw HTML
    Fetch(FetchArgs),
    /// Extract listings from archived pages into a dated CSV
    Extract(ExtractArgs),
    /// Fetch, then extract the pages stored by this run
    Run(FetchArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::init(args.debug);

    let response = match &args.command {
        Command::Fetch(fetch_args) => {
            run_fetch(&args.store, fetch_args)?.to_response(&args.store.raw_container)
        }
        Command::Extract(extract_args) => {
            let event = extract_args.load_event(&args.store.raw_container)?;
            run_extract(&args.store, &event)?
        }
        Command::Run(fetch_args) => run_pipeline(&args.store, fetch_args)?,
    };

    print_response(&response)
}
