use anyhow::Result;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use portsweep::cli::{Cli, OutputFormat};
use portsweep::logging;
use portsweep::output::OutputWriter;
use portsweep::scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let progress = if cli.quiet || cli.output_format != OutputFormat::Human {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} Please wait... [{elapsed_precise}] {bar:40} {pos}/{len}")?,
        );
        pb
    };

    let scanner = Scanner::new(&cli.scan_config()).with_progress(progress);

    let report = match scanner.scan_target(&cli.address, &cli.range).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    };

    OutputWriter::new(cli.output_format, cli.output_file).write(&report)?;

    Ok(())
}
