use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use publist_enrich::cite::SystemClock;
use publist_enrich::config::{
    find_config_file, load_settings, render_settings, write_default_config, Settings,
    LOCAL_CONFIG_FILE,
};
use publist_enrich::pipeline::{self, EnrichJob, EnrichOptions, EnrichReport, FetchJob};
use publist_enrich::sources::QueryScope;
use publist_enrich::store;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// publist-enrich - Normalize publication metadata and render Nature-style citations
#[derive(Parser, Debug)]
#[command(name = "publist-enrich")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Normalize publication metadata and render Nature-style citations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add year and citation fields to every record of a collection
    #[command(alias = "e")]
    Enrich {
        /// Collection to read (default: paths.input)
        #[arg(long = "in", alias = "input", value_name = "PATH")]
        input: Option<PathBuf>,

        /// Collection to write (default: paths.output)
        #[arg(long = "out", alias = "output", value_name = "PATH")]
        output: Option<PathBuf>,

        /// Order records newest first, then by title
        #[arg(long)]
        sort: bool,

        /// Do not back up the existing output
        #[arg(long)]
        no_backup: bool,

        /// Truncate author lists longer than this
        #[arg(long)]
        threshold: Option<usize>,

        /// Authors kept before "et al." when truncating
        #[arg(long)]
        display_cap: Option<usize>,

        /// Record field the citation is written to
        #[arg(long, value_name = "NAME")]
        field: Option<String>,
    },

    /// Print the citation of every record without writing anything
    #[command(alias = "p")]
    Preview {
        /// Collection to read (default: paths.input)
        #[arg(long = "in", alias = "input", value_name = "PATH")]
        input: Option<PathBuf>,

        /// Order records newest first, then by title
        #[arg(long)]
        sort: bool,
    },

    /// Fetch publications from OpenAlex, enrich them and write a collection
    #[command(alias = "f")]
    #[command(group(ArgGroup::new("scope").required(true).args(["author", "institution"])))]
    Fetch {
        /// OpenAlex author ID (e.g. A5023888391)
        #[arg(long)]
        author: Option<String>,

        /// OpenAlex institution ID (e.g. I136199984)
        #[arg(long)]
        institution: Option<String>,

        /// Collection to write (default: paths.output)
        #[arg(long = "out", alias = "output", value_name = "PATH")]
        output: Option<PathBuf>,

        /// Maximum number of publications (default: fetch.max_results)
        #[arg(long, short)]
        max_results: Option<usize>,

        /// Contact email for the OpenAlex polite pool
        #[arg(long)]
        email: Option<String>,

        /// Order records newest first, then by title
        #[arg(long)]
        sort: bool,

        /// Do not back up the existing output
        #[arg(long)]
        no_backup: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Where to write it
        #[arg(long, default_value = LOCAL_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut settings = load_settings(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => settings.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("publist_enrich={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let clock = SystemClock;

    match cli.command {
        Commands::Enrich {
            input,
            output,
            sort,
            no_backup,
            threshold,
            display_cap,
            field,
        } => {
            apply_citation_overrides(&mut settings, threshold, display_cap, field);
            let job = EnrichJob {
                input: input.unwrap_or_else(|| settings.paths.input.clone()),
                output: output.unwrap_or_else(|| settings.paths.output.clone()),
                sort,
                no_backup,
            };
            let report = pipeline::run_enrich(&job, &settings, &clock)?;
            print_report(&report, &job.output, cli.quiet);
        }

        Commands::Preview { input, sort } => {
            let input = input.unwrap_or_else(|| settings.paths.input.clone());
            let records = store::load_collection(&input)?;
            let options = EnrichOptions {
                citation_field: settings.citation.field.clone(),
                policy: settings.citation.policy(),
                sort,
            };
            for record in pipeline::enrich_collection(&records, &options, &clock) {
                if let Some(citation) = record.text(&options.citation_field) {
                    println!("{}", citation);
                }
            }
        }

        Commands::Fetch {
            author,
            institution,
            output,
            max_results,
            email,
            sort,
            no_backup,
        } => {
            let scope = match (author, institution) {
                (Some(id), _) => QueryScope::Author(id),
                (None, Some(id)) => QueryScope::Institution(id),
                (None, None) => anyhow::bail!("Either --author or --institution is required"),
            };
            let job = FetchJob {
                scope,
                output: output.unwrap_or_else(|| settings.paths.output.clone()),
                max_results,
                email,
                sort,
                no_backup,
            };
            let summary = pipeline::run_fetch(&job, &settings, &clock).await?;
            if summary.skipped > 0 && !cli.quiet {
                eprintln!("Skipped {} publications that could not be read", summary.skipped);
            }
            print_report(&summary.report, &job.output, cli.quiet);
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                write_default_config(&path, force)?;
                eprintln!("Config written to {}", path.display());
            }
            ConfigAction::Show => {
                print!("{}", render_settings(&settings)?);
            }
        },
    }

    Ok(())
}

fn apply_citation_overrides(
    settings: &mut Settings,
    threshold: Option<usize>,
    display_cap: Option<usize>,
    field: Option<String>,
) {
    if let Some(threshold) = threshold {
        settings.citation.threshold = threshold;
    }
    if let Some(display_cap) = display_cap {
        settings.citation.display_cap = display_cap;
    }
    if let Some(field) = field {
        settings.citation.field = field;
    }
}

fn print_report(report: &EnrichReport, output: &std::path::Path, quiet: bool) {
    if let Some(warning) = &report.backup_warning {
        eprintln!("WARNING: Could not write backup: {}", warning);
    }
    if quiet {
        return;
    }
    if let Some(backup) = &report.backup {
        eprintln!("Backup written to {}", backup.display());
    }
    println!("Wrote {} records -> {}", report.written, output.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["publist-enrich"]).is_err());
    }

    #[test]
    fn test_cli_verbose_and_quiet() {
        let cli = Cli::parse_from(["publist-enrich", "-vv", "preview"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);

        let cli = Cli::parse_from(["publist-enrich", "preview", "--quiet"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_enrich_defaults() {
        let cli = Cli::parse_from(["publist-enrich", "enrich"]);
        match cli.command {
            Commands::Enrich {
                input,
                output,
                sort,
                no_backup,
                threshold,
                display_cap,
                field,
            } => {
                assert!(input.is_none());
                assert!(output.is_none());
                assert!(!sort);
                assert!(!no_backup);
                assert!(threshold.is_none());
                assert!(display_cap.is_none());
                assert!(field.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_enrich_with_options() {
        let cli = Cli::parse_from([
            "publist-enrich",
            "enrich",
            "--in",
            "in.yml",
            "--out",
            "out.yml",
            "--sort",
            "--no-backup",
            "--threshold",
            "10",
            "--display-cap",
            "6",
            "--field",
            "citation",
        ]);
        match cli.command {
            Commands::Enrich {
                input,
                output,
                sort,
                no_backup,
                threshold,
                display_cap,
                field,
            } => {
                assert_eq!(input, Some(PathBuf::from("in.yml")));
                assert_eq!(output, Some(PathBuf::from("out.yml")));
                assert!(sort);
                assert!(no_backup);
                assert_eq!(threshold, Some(10));
                assert_eq!(display_cap, Some(6));
                assert_eq!(field.as_deref(), Some("citation"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_input_alias() {
        let cli = Cli::parse_from(["publist-enrich", "preview", "--input", "pubs.yml"]);
        match cli.command {
            Commands::Preview { input, .. } => assert_eq!(input, Some(PathBuf::from("pubs.yml"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_fetch_requires_one_scope() {
        assert!(Cli::try_parse_from(["publist-enrich", "fetch"]).is_err());
        assert!(Cli::try_parse_from([
            "publist-enrich",
            "fetch",
            "--author",
            "A1",
            "--institution",
            "I1"
        ])
        .is_err());

        let cli = Cli::parse_from([
            "publist-enrich",
            "fetch",
            "--institution",
            "I136199984",
            "-m",
            "50",
        ]);
        match cli.command {
            Commands::Fetch {
                author,
                institution,
                max_results,
                ..
            } => {
                assert!(author.is_none());
                assert_eq!(institution.as_deref(), Some("I136199984"));
                assert_eq!(max_results, Some(50));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from([
            "publist-enrich",
            "--config",
            "x.toml",
            "config",
            "init",
            "--force",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Config {
                action: ConfigAction::Init { path, force },
            } => {
                assert_eq!(path, PathBuf::from(LOCAL_CONFIG_FILE));
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_citation_overrides() {
        let mut settings = Settings::default();
        apply_citation_overrides(&mut settings, Some(10), None, Some("citation".into()));
        assert_eq!(settings.citation.threshold, 10);
        assert_eq!(settings.citation.display_cap, 6);
        assert_eq!(settings.citation.field, "citation");
    }
}
