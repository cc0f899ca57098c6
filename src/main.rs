use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comic_press::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates a starter comic-press.toml config file
    Config,
    /// Renders every chapter listed in the config file
    Render,
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Cli {
    /// Path to the configuration file
    #[clap(short, long, default_value = "comic-press.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Config => {
            if cli.config.exists() {
                anyhow::bail!(
                    "{} already exists, refusing to overwrite it",
                    cli.config.display()
                );
            }
            let contents = toml::to_string_pretty(&Config::example())
                .with_context(|| "Failed to serialize the starter configuration")?;
            std::fs::write(&cli.config, contents)
                .with_context(|| format!("Failed to write {}", cli.config.display()))?;
            println!("Wrote starter configuration to {}", cli.config.display());
            Ok(())
        }
        Commands::Render => {
            let contents = std::fs::read_to_string(&cli.config)
                .with_context(|| format!("Failed to load {}", cli.config.display()))?;
            let config: Config =
                toml::from_str(&contents).with_context(|| "Failed to parse TOML")?;

            if config.chapters.is_empty() {
                println!("No chapters configured.");
                return Ok(());
            }

            for chapter in config.chapters.iter() {
                let stats = comic_press::chapter::render_chapter(&config, chapter)
                    .with_context(|| format!("Failed to render chapter `{}`", chapter.title))?;

                println!("PDF saved to {}", chapter.output.display());
                println!(
                    "  {} pages ({} missing page directories skipped)",
                    stats.page_count, stats.pages_skipped
                );
            }

            Ok(())
        }
    }
}
