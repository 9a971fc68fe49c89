//! Vesta CLI - inspect and tidy reactive notebook files.

mod cells;
mod colors;
mod fmt;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use vesta_core::CellData;
use vesta_sync::{default_notebook_path, write_notebook};

#[derive(Parser)]
#[command(name = "vesta")]
#[command(about = "Reactive notebook files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cells of a notebook
    Cells {
        /// Path to the notebook (.percival file)
        notebook: String,

        /// Print cells as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a notebook in canonical form
    Fmt {
        /// Path to the notebook (.percival file)
        notebook: String,

        /// Fail instead of rewriting when the file is not canonical
        #[arg(long)]
        check: bool,
    },

    /// Create a new notebook from template
    New {
        /// Name of the notebook (extension optional)
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Cells { notebook, json } => cells::execute(&notebook, json)?,
        Commands::Fmt { notebook, check } => fmt::execute(&notebook, check)?,
        Commands::New { name } => create_new_notebook(&name)?,
    }

    Ok(())
}

/// Create a new notebook from template.
fn create_new_notebook(name: &str) -> anyhow::Result<()> {
    let notebook_path = if Path::new(name).extension().is_some() {
        PathBuf::from(name)
    } else {
        default_notebook_path(name)
    };

    if notebook_path.exists() {
        anyhow::bail!("File {} already exists", notebook_path.display());
    }

    let title = notebook_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    write_notebook(&notebook_path, &template(&title))?;
    println!(
        "{}Created new notebook:{} {}",
        colors::BOLD,
        colors::RESET,
        notebook_path.display()
    );

    Ok(())
}

fn template(title: &str) -> Vec<CellData> {
    vec![
        CellData::markdown(format!(
            "# {}\n\nEach code cell defines relations that later cells can read.",
            title
        )),
        CellData::code("edge(x: 1, y: 2).\nedge(x: 2, y: 3)."),
        CellData::code("tc(x, y) :- edge(x, y).\ntc(x, y) :- tc(x, y: z), edge(x: z, y)."),
    ]
}
