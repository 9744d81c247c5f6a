use anyhow::Result;
use clap::{Parser, Subcommand};
use rdom_cli::{BuildConfig, EmitMode, Whitespace, build_with};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rdom", version, about = "rdom template compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template file into render functions.
    Build {
        /// Path to the template file
        input: PathBuf,
        /// Output directory (default: target/rdom-gen)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// What to emit: an ES module or the raw JSON output
        #[arg(long, value_enum, default_value_t = EmitMode::Module)]
        emit: EmitMode,
        /// JSON options file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Keep HTML comments
        #[arg(long)]
        comments: bool,
        #[arg(long, value_enum)]
        whitespace: Option<Whitespace>,
        /// Write output even when the template has errors
        #[arg(long)]
        allow_errors: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            input,
            out_dir,
            emit,
            config,
            comments,
            whitespace,
            allow_errors,
        } => {
            let mut build = match config {
                Some(path) => BuildConfig::load(&path)?,
                None => BuildConfig::default(),
            };
            build.comments |= comments;
            build.allow_errors |= allow_errors;
            if let Some(whitespace) = whitespace {
                build.whitespace = whitespace.into();
            }
            build_with(&input, out_dir.as_deref(), emit, &build)?;
        }
    }
    Ok(())
}
