mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{inject, render, serve, strip, InjectArgs, RenderArgs, ServeArgs, StripArgs};

/// Copydesk CLI - content-driven site generator with live copy editing
#[derive(Parser, Debug)]
#[command(name = "copydesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove editing identifiers from a source tree (dry-run by default)
    Strip(StripArgs),

    /// Stamp editable elements with fresh identifiers (dry-run by default)
    Inject(InjectArgs),

    /// Render a page module's block array to HTML
    Render(RenderArgs),

    /// Run the edit-intake API
    Serve(ServeArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir()
        .expect("Cannot get current directory")
        .display()
        .to_string();

    let result = match cli.command {
        Command::Strip(args) => strip(args),
        Command::Inject(args) => inject(args),
        Command::Render(args) => render(args),
        Command::Serve(args) => serve(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
