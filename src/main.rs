//! Main entry point for the `burpconv` CLI application.
//!
//! `burpconv` turns a Burp Suite proxy history export into a report that
//! can be opened in a spreadsheet (`--format csv`) or a browser
//! (`--format html`). The report is written next to the input file with
//! the matching extension unless `--output` is given.
//!
//! # Flags of Interest
//! - `--format csv|html`: report format
//! - `--csv-delimiter ,|;`: CSV field delimiter
//! - `--profile`: phase timings and a stats JSON file

use anyhow::{Context, Result};
use burpconv::Args;
use burpconv::convert::convert_file;
use burpconv::metrics::{ProfileData, print_profile_summary, rss_after_phase, save_stats_json};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let env = std::env::var("BURPCONV_LOG").unwrap_or_else(|_| {
        if verbose {
            "burpconv=debug".to_string()
        } else {
            "burpconv=warn".to_string()
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = args.to_options();
    let report = convert_file(&args.filename, &options)
        .with_context(|| format!("Failed to convert {}", args.filename.display()))?;

    println!(
        "Converted {} record(s) to: {}",
        report.records,
        report.output.display()
    );

    if args.profile {
        let profile = ProfileData {
            phases: report.phases,
            memory_rss: rss_after_phase(),
            records: report.records,
            output_bytes: report.output_bytes,
        };
        print_profile_summary(&profile);
        let stats = save_stats_json(&report.output, &profile)
            .context("Failed to write profiling stats")?;
        println!("Performance stats saved to: {}", stats.display());
    }

    Ok(())
}
