use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use foiex::about;
use foiex::config::{self, ExplorerConfig};
use foiex::db::models::EntityKind;
use foiex::db::Database;
use foiex::output::csv::{write_csv, DEFAULT_CSV_FILENAME};
use foiex::output::{json as json_out, table};
use foiex::preview::Preview;
use foiex::search::filters::{parse_date, FilterSet};
use foiex::search::grid::{ResultGrid, SortColumn, SortOrder};
use foiex::search::SearchOutput;

#[derive(Parser)]
#[command(
    name = "foiex",
    version,
    about = "FOIA Email Explorer — search the Documenting COVID-19 email archive",
    long_about = about::TAGLINE,
    after_help = about::ATTRIBUTION
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the archive database (default: ~/.foiex/foiex.db)
    #[arg(long, global = true, env = "FOIEX_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search emails by date range, entities and body text
    Search {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Person mentioned in the email (repeatable)
        #[arg(long = "person")]
        persons: Vec<String>,

        /// Organization mentioned in the email (repeatable)
        #[arg(long = "org")]
        orgs: Vec<String>,

        /// Location mentioned in the email (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,

        /// Full-text query over the body ('quoted phrase', OR, NOT)
        #[arg(long, short)]
        query: Option<String>,

        /// Sort column: sent, subject, from, to, topic, pages
        #[arg(long, default_value = "sent")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page to display (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Preview the row with this index
        #[arg(long)]
        select: Option<usize>,

        /// Export the full result set as CSV (use - for stdout)
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_CSV_FILENAME)]
        csv: Option<PathBuf>,
    },

    /// List filterable entities: person, org or location
    Entities {
        kind: String,
    },

    /// Emails per day, as a bar chart
    Counts {
        /// First day to count (YYYY-MM-DD)
        #[arg(long, default_value = "2020-01-01")]
        since: String,
    },

    /// Preview a single email
    Show {
        email_id: i64,
    },

    /// Show database statistics
    Stats,

    /// Manage ~/.foiex/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a commented default config if none exists
    Init,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;
    let cfg = ExplorerConfig::load()?;

    if let Commands::Config { action } = &cli.command {
        return run_config(action, &cfg);
    }

    let db_path = config::resolve_db_path(cli.db, &cfg)?;
    let db = Database::open(&db_path)?;

    match cli.command {
        Commands::Search {
            from,
            to,
            persons,
            orgs,
            locations,
            query,
            sort,
            desc,
            page,
            page_size,
            select,
            csv,
        } => {
            let mut filters = cfg.default_filters()?;
            if let Some(ref s) = from {
                filters.begin_date = parse_date(s)?;
            }
            if let Some(ref s) = to {
                filters.end_date = parse_date(s)?;
            }
            filters.persons = persons;
            filters.orgs = orgs;
            filters.locations = locations;
            filters.full_text = query;

            warn_unknown_entities(&db, &filters, cfg.search.entity_id_floor)?;

            let built = cfg.query_builder().build(&filters)?;
            let rows = db.run_search(&built)?;

            let column = SortColumn::from_str(&sort)
                .with_context(|| format!("Unknown sort column: {sort}. Use: sent, subject, from, to, topic, pages"))?;
            let order = if desc { SortOrder::Descending } else { SortOrder::Ascending };
            let mut grid = ResultGrid::new(rows, page_size.unwrap_or(cfg.search.page_size));
            grid.sort(column, order);

            if let Some(ref path) = csv {
                let n = write_csv(grid.rows(), path)?;
                if path.as_os_str() != "-" {
                    eprintln!("Wrote {} rows ({n} bytes) to {}", grid.len(), path.display());
                }
                return Ok(());
            }

            let view = grid.page(page);
            let selected = select.map(|i| {
                grid.select(i)
                    .map(|row| Preview::for_row(row, &cfg.preview))
                    .with_context(|| format!("No row {i} in {} results", grid.len()))
            });
            let selected = selected.transpose()?;

            if json_output {
                let search = SearchOutput {
                    explanation: &built.explanation,
                    total: view.total,
                    page: view.page,
                    page_count: view.page_count,
                    emails: view.rows,
                };
                json_out::print_json(&serde_json::json!({
                    "search": search,
                    "preview": selected,
                }))?;
            } else {
                print!(
                    "{}",
                    table::render_search(&view, &built.explanation, selected.as_ref())
                );
            }
        }

        Commands::Entities { kind } => {
            let kind = EntityKind::from_str(&kind)
                .with_context(|| format!("Unknown entity kind: {kind}. Use: person, org, location"))?;
            let names = db.entity_vocabulary(kind, cfg.search.entity_id_floor)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "kind": kind,
                    "total": names.len(),
                    "entities": names,
                }))?;
            } else {
                table::print_entities(kind, &names);
            }
        }

        Commands::Counts { since } => {
            let since = parse_date(&since)?.format("%Y-%m-%d").to_string();
            let counts = db.daily_counts(&since)?;
            if json_output {
                json_out::print_json(&counts)?;
            } else {
                table::print_daily_counts(&counts);
            }
        }

        Commands::Show { email_id } => {
            let email = db
                .get_email(email_id)?
                .with_context(|| format!("Email not found: {email_id}"))?;
            let preview = Preview::for_row(&email, &cfg.preview);
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "email": email,
                    "preview": preview,
                }))?;
            } else {
                print!("{}", table::render_preview(&preview));
            }
        }

        Commands::Stats => {
            let stats = db.stats()?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "attribution": about::ATTRIBUTION,
                    "db_path": db.path.display().to_string(),
                    "stats": stats,
                }))?;
            } else {
                println!("foiex v{}", env!("CARGO_PKG_VERSION"));
                println!("  Database:     {}\n", db.path.display());
                print!("{}", table::render_stats(&stats));
            }
        }

        // Handled before the database is opened.
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_config(action: &ConfigAction, cfg: &ExplorerConfig) -> Result<()> {
    match action {
        ConfigAction::Show => println!("{}", cfg.display()?),
        ConfigAction::Init => {
            let path = config::config_path()?;
            if config::init_config()? {
                println!("Created {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Path => println!("{}", config::config_path()?.display()),
    }
    Ok(())
}

/// Entity names outside the vocabulary are allowed but simply match nothing.
fn warn_unknown_entities(db: &Database, filters: &FilterSet, floor: i64) -> Result<()> {
    let groups = [
        (EntityKind::Person, &filters.persons),
        (EntityKind::Org, &filters.orgs),
        (EntityKind::Location, &filters.locations),
    ];
    for (kind, names) in groups {
        if names.is_empty() {
            continue;
        }
        let vocab = db.entity_vocabulary(kind, floor)?;
        for name in names.iter().filter(|n| !vocab.contains(n)) {
            warn!("{name:?} is not a known {} entity", kind.as_str());
        }
    }
    Ok(())
}
