use anyhow::Result;
use clap::Args;
use colored::Colorize;
use copydesk_stamp::{inject_tree, WalkOptions};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InjectArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Write changes instead of only reporting them
    #[arg(long)]
    pub write: bool,

    /// Only process paths matching these globs, relative to ROOT
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Skip paths matching these globs
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
}

pub fn inject(args: InjectArgs) -> Result<()> {
    let options = WalkOptions::new(&args.include, &args.exclude)?;
    let mode = if args.write { "write" } else { "dry-run" };
    println!(
        "{} ({})",
        "Stamping editing identifiers...".bright_blue().bold(),
        mode
    );

    let summary = inject_tree(&args.root, &options, args.write)?;

    println!();
    println!(
        "{} {} files scanned, {} changed, {} identifiers added, {} skipped",
        "Done:".green().bold(),
        summary.files_scanned,
        summary.files_changed,
        summary.identifiers_added,
        summary.files_skipped
    );
    if !args.write && summary.files_changed > 0 {
        println!("{}", "Run again with --write to apply".dimmed());
    }

    Ok(())
}
