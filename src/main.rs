use anyhow::Result;
use clap::Parser;
use tracing::error;

use whatblocks::utils::{setup_logging, validate_args};
use whatblocks::{render_report, run, Args, ReportOptions};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    // clap enforces the input group; this only guards against it being loosened
    if args.profile.is_none() && args.file.is_none() {
        eprintln!("No profile or file specified!");
        std::process::exit(1);
    }

    match validate_args(&args).and_then(|()| run(&args)) {
        Ok(analysis) => {
            let options = ReportOptions {
                redact: args.redact,
            };
            print!("{}", render_report(&analysis, &options));
            Ok(())
        }
        Err(e) => {
            error!(action = "abort", component = "main", error = %format!("{:#}", e), "Analysis failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
