//! `tds-workshop`: token build and component workshop from the command line.
//!
//! ```bash
//! tds-workshop build-tokens --input "TDS Helper tokens.json" --output src/tokens/variables.css
//! tds-workshop catalog --search tab
//! tds-workshop show button --set size=large --set disabled=true
//! tds-workshop show toggle-tab-bar --tab accessibility
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tds_workshop::catalog::{Catalog, Platform};
use tds_workshop::config::WorkshopConfig;
use tds_workshop::tokens::build_tokens;
use tds_workshop::workshop::{PropertyControl, TabContent, Workshop, WorkshopTab};

#[derive(Parser)]
#[command(name = "tds-workshop")]
#[command(version)]
#[command(about = "Design token build and component workshop for the TDS design system")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Tokens Studio export into CSS custom properties
    BuildTokens {
        /// Workshop config file (embedded defaults when omitted)
        #[arg(long, env = "TDS_WORKSHOP_CONFIG")]
        config: Option<PathBuf>,

        /// Token export to read, overriding the config
        #[arg(long, env = "TDS_TOKENS_INPUT")]
        input: Option<PathBuf>,

        /// Stylesheet to write, overriding the config
        #[arg(long, env = "TDS_TOKENS_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List catalog components
    Catalog {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show one component in the workshop after applying property edits
    Show {
        /// Component id, e.g. `button`
        id: String,

        #[arg(long, default_value = "preview")]
        tab: WorkshopTab,

        #[arg(long, default_value = "web")]
        platform: Platform,

        /// Property edit as `name=value`; repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Print the session snapshot as JSON instead of the text view
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::BuildTokens {
            config,
            input,
            output,
        } => cmd_build_tokens(config, input, output),
        Commands::Catalog { search } => cmd_catalog(&search),
        Commands::Show {
            id,
            tab,
            platform,
            assignments,
            json,
        } => cmd_show(&id, tab, platform, &assignments, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

fn cmd_build_tokens(
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = WorkshopConfig::resolve(config.as_deref())
        .context("failed to load workshop config")?
        .tokens;
    if let Some(input) = input {
        config.input = input;
    }
    if let Some(output) = output {
        config.output = output;
    }

    let summary = build_tokens(&config)
        .with_context(|| format!("failed to build tokens from {}", config.input.display()))?;

    println!(
        "wrote {} variables to {} ({} categories processed, {} inverted skipped, {} other themes skipped, {} borders repaired)",
        summary.variables,
        summary.output.display(),
        summary.report.processed(),
        summary.report.skipped_inverted(),
        summary.report.skipped_other_theme(),
        summary.repaired.len(),
    );
    Ok(())
}

fn cmd_catalog(search: &str) -> Result<()> {
    let catalog = Catalog::builtin().context("failed to load component catalog")?;
    for component in catalog.search(search) {
        println!(
            "{:<16} {:<16} {:<13} {}",
            component.id,
            component.name,
            component.category.label(),
            component.description
        );
    }
    Ok(())
}

fn cmd_show(
    id: &str,
    tab: WorkshopTab,
    platform: Platform,
    assignments: &[(String, String)],
    json: bool,
) -> Result<()> {
    let catalog = Catalog::builtin().context("failed to load component catalog")?;
    let mut workshop = Workshop::new(&catalog);
    if !workshop.select_component(id) {
        bail!("unknown component `{id}`");
    }
    workshop.set_platform(platform);
    workshop.set_active_tab(tab);
    for (name, value) in assignments {
        if !workshop.change_property(name, value) {
            bail!("component `{id}` has no property `{name}`");
        }
    }

    if json {
        let snapshot = serde_json::to_string_pretty(&workshop.snapshot())
            .context("failed to serialize workshop snapshot")?;
        println!("{snapshot}");
        return Ok(());
    }

    let Some(component) = workshop.selected() else {
        bail!("no component selected");
    };
    println!("{} ({})", component.name, component.category.label());
    if !component.description.is_empty() {
        println!("{}", component.description);
    }
    println!();
    let tabs = WorkshopTab::ALL
        .iter()
        .map(|candidate| {
            if *candidate == workshop.active_tab() {
                format!("[{}]", candidate.label())
            } else {
                candidate.label().to_string()
            }
        })
        .collect::<Vec<_>>();
    println!("{}", tabs.join("  "));
    println!();

    match workshop.tab_content() {
        TabContent::NothingSelected => println!("Select a component to preview"),
        TabContent::Preview {
            platform,
            examples,
            rows,
        } => {
            println!("Platform: {}", platform.label());
            println!();
            println!("Interactive Example");
            for example in examples {
                let props = example
                    .props
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                match example.label {
                    Some(label) => println!("  {label}: {props}"),
                    None => println!("  {props}"),
                }
            }

            let columns = workshop.variant_columns();
            let groups = [
                ("Variants", &columns.unassigned),
                ("Variants (left)", &columns.left),
                ("Variants (right)", &columns.right),
            ];
            for (heading, variants) in groups {
                if variants.is_empty() {
                    continue;
                }
                println!();
                println!("{heading}");
                for variant in variants {
                    println!("  {}", variant.name);
                }
            }

            println!();
            println!("Properties");
            if rows.is_empty() {
                println!("  No properties defined");
            }
            for row in rows {
                let control = match &row.control {
                    PropertyControl::Select(options) => format!("select [{}]", options.join(", ")),
                    PropertyControl::TextInput => "text".to_string(),
                    PropertyControl::ReadOnly => "read-only".to_string(),
                };
                let marker = if row.dirty { "*" } else { " " };
                println!(
                    " {marker}{:<14} {:<12} {:<24} {} ({})",
                    row.name, row.value, control, row.description, row.type_label
                );
            }
        }
        TabContent::Source(snippets) => {
            if snippets.is_empty() {
                println!("No source snippets available");
            }
            for snippet in snippets {
                if let Some(title) = &snippet.title {
                    println!("## {title}");
                }
                println!("```{}", snippet.language.as_deref().unwrap_or_default());
                println!("{}", snippet.code);
                println!("```");
                println!();
            }
        }
        TabContent::Accessibility(notes) => match notes {
            Some(notes) => {
                println!("Accessibility Information");
                for (heading, body) in notes.sections() {
                    println!();
                    println!("{heading}");
                    println!("  {body}");
                }
            }
            None => println!("No accessibility information available"),
        },
    }
    Ok(())
}
