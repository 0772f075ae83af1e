use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use copydesk_blocks::{blocks_from_module, BlockRegistry};
use copydesk_parser::parse;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page module to render
    pub file: PathBuf,

    /// Write HTML to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.file)?;
    let module =
        parse(&source).map_err(|e| anyhow!("{}: {}", args.file.display(), e))?;

    let blocks = blocks_from_module(&module)?;
    let registry = BlockRegistry::with_builtins();
    let rendered = registry.render_all(&blocks);

    for error in &rendered.errors {
        eprintln!("  {} {}", "✗".red(), error.to_string().red());
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered.html)?;
            println!(
                "{} {} blocks rendered to {}",
                "Done:".green().bold(),
                blocks.len() - rendered.errors.len(),
                path.display()
            );
        }
        None => print!("{}", rendered.html),
    }

    if !rendered.errors.is_empty() {
        eprintln!(
            "{} {} of {} blocks failed to render",
            "Warning:".yellow().bold(),
            rendered.errors.len(),
            blocks.len()
        );
    }

    Ok(())
}
