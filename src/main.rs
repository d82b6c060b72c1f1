mod form;
mod parser;
mod pipeline;
mod settings;
mod statement;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use settings::Settings;

#[derive(Parser)]
#[command(name = "form8949", about = "Robinhood 1099 statement to filled Form 8949")]
struct Cli {
    /// Configuration file (default: ./form8949.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for the section tables and per-section forms
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,
    /// Blank two-page Form 8949
    #[arg(long, global = true)]
    template: Option<PathBuf>,
    /// Merged output form
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Identity {
    /// Taxpayer name printed on every page
    #[arg(long)]
    name: Option<String>,
    /// Taxpayer identification number
    #[arg(long)]
    tin: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the statement into the four section tables
    Extract {
        /// Statement PDF, or text with form-feed page breaks
        statement: PathBuf,
    },
    /// Fill the form from previously extracted tables
    Fill {
        #[command(flatten)]
        identity: Identity,
    },
    /// Extract + fill in one go
    Run {
        statement: PathBuf,
        #[command(flatten)]
        identity: Identity,
    },
    /// Per-section counts and totals of the extracted tables
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.work_dir {
        settings.work_dir = dir;
    }
    if let Some(template) = cli.template {
        settings.template = template;
    }
    if let Some(output) = cli.output {
        settings.output = output;
    }

    let result = match cli.command {
        Commands::Extract { statement } => {
            let sections = pipeline::extract(&statement, &settings.work_dir, settings.gate())?;
            println!("Extracted {} records.", pipeline::record_count(&sections));
            Ok(())
        }
        Commands::Fill { identity } => {
            apply_identity(&mut settings, identity);
            fill(&settings)
        }
        Commands::Run { statement, identity } => {
            apply_identity(&mut settings, identity);
            let t_extract = Instant::now();
            let sections = pipeline::extract(&statement, &settings.work_dir, settings.gate())?;
            println!(
                "Extracted {} records in {:.1}s",
                pipeline::record_count(&sections),
                t_extract.elapsed().as_secs_f64()
            );
            fill(&settings)
        }
        Commands::Summary { json } => {
            let tables = pipeline::load_tables(&settings.work_dir)?;
            let summary = pipeline::summarize(&tables);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!(
                "{:<4} | {:>7} | {:>5} | {:>12} | {:>12} | {:>10} | {:>12}",
                "Doc", "Records", "Pages", "Proceeds", "Cost basis", "Adjust.", "Gain/Loss"
            );
            println!("{}", "-".repeat(80));
            for s in &summary {
                println!(
                    "{:<4} | {:>7} | {:>5} | {:>12} | {:>12} | {:>10} | {:>12}",
                    s.document,
                    s.records,
                    s.pages,
                    form::mapper::money(s.totals.proceeds),
                    form::mapper::money(s.totals.cost_basis),
                    form::mapper::money(s.totals.adjustment),
                    form::mapper::money(s.totals.gain_loss),
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn apply_identity(settings: &mut Settings, identity: Identity) {
    if let Some(name) = identity.name {
        settings.taxpayer_name = name;
    }
    if let Some(tin) = identity.tin {
        settings.taxpayer_id = tin;
    }
}

fn fill(settings: &Settings) -> anyhow::Result<()> {
    let targets = pipeline::FillTargets {
        template: settings.template.clone(),
        work_dir: settings.work_dir.clone(),
        output: settings.output.clone(),
    };
    let report = pipeline::fill(&targets, &settings.taxpayer())?;
    for (doc, path, pages) in &report.documents {
        println!("{}: {} ({} pages)", doc, path.display(), pages);
    }
    println!(
        "Form 8949 has been successfully filled and saved to {} ({} pages).",
        targets.output.display(),
        report.merged_pages
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
