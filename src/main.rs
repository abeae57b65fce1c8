use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::path::PathBuf;
use taskview::loader::{latest_by_id, read_filter_state, read_records, read_sort_state};
use taskview::models::Priority;
use taskview::{
    Engine, EngineConfig, FilterState, Identity, PredefinedFilter, ProcessedRecord, Record, RecordKind, SortDirection,
    SortState,
};

#[derive(Parser)]
#[command(name = "taskview")]
#[command(about = "TaskView CLI - Filter, sort and summarize task and project records")]
#[command(version)]
struct Cli {
    /// Engine config file (default: <config_dir>/taskview/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Records file (JSON array or JSONL)
    records: PathBuf,

    /// Kind of record in the file
    #[arg(short, long, default_value = "task")]
    kind: RecordKind,

    /// Records used to resolve bare ids in subtask/task lists
    #[arg(long)]
    aux: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort records
    Query {
        #[command(flatten)]
        source: Source,

        /// Filter state file (YAML or JSON)
        #[arg(long)]
        state: Option<PathBuf>,

        /// Sort state file (YAML or JSON)
        #[arg(long)]
        sort_state: Option<PathBuf>,

        /// Free-text search term
        #[arg(short, long)]
        search: Option<String>,

        /// Predefined filter (all, overdue, high-priority, my-tasks, a status...)
        #[arg(short, long)]
        preset: Option<String>,

        /// Sort field
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        user_name: Option<String>,

        #[arg(long)]
        user_email: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show derived progress for every record
    Metrics {
        #[command(flatten)]
        source: Source,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Setup tracing; stdout is reserved for results
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_default()?,
    };

    match cli.command {
        Commands::Query {
            source,
            state,
            sort_state,
            search,
            preset,
            sort,
            desc,
            user_id,
            user_name,
            user_email,
            json,
        } => {
            let mut filter = match state {
                Some(path) => read_filter_state(&path)?,
                None => FilterState::default(),
            };
            if let Some(term) = search {
                filter.search_term = term;
            }
            if let Some(preset) = preset {
                filter.predefined_filter = PredefinedFilter::from(preset);
            }

            let mut sort_state = match sort_state {
                Some(path) => read_sort_state(&path)?,
                None => SortState::default(),
            };
            if let Some(field) = sort {
                sort_state.field = field;
            }
            if desc {
                sort_state.direction = SortDirection::Desc;
            }

            let user = Identity {
                id: user_id,
                name: user_name,
                email: user_email,
            };

            let (engine, records) = load(&source, config)?;
            let engine = engine.with_current_user(user);
            let output = engine.process(&records, &filter, &sort_state);

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_table(&output, engine.config());
            }
        }
        Commands::Metrics { source, json } => {
            let (engine, records) = load(&source, config)?;
            let processed: Vec<ProcessedRecord> = records.iter().map(|r| engine.prepare(r)).collect();

            if json {
                let rows: Vec<serde_json::Value> = processed
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "id": p.record.id(),
                            "completedCount": p.metrics.completed,
                            "totalCount": p.metrics.total,
                            "progressPercent": p.metrics.progress_percent,
                            "unresolved": p.unresolved_references().collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for p in &processed {
                    let unresolved = p.unresolved_references().count();
                    let mut line = format!(
                        "{:<12} {:>3}/{:<3} {:>3}%",
                        p.record.id().unwrap_or_default(),
                        p.metrics.completed,
                        p.metrics.total,
                        p.metrics.progress_percent
                    );
                    if unresolved > 0 {
                        line.push_str(&format!("  {}", format!("{} unresolved", unresolved).yellow()));
                    }
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

fn load(source: &Source, config: EngineConfig) -> Result<(Engine, Vec<Record>)> {
    let records = latest_by_id(read_records(&source.records)?);

    let mut engine = Engine::new(source.kind).with_config(config);
    if let Some(aux_path) = &source.aux {
        let aux = latest_by_id(read_records(aux_path).context("Failed to load auxiliary records")?);
        engine = engine.with_auxiliary(&aux);
    }

    Ok((engine, records))
}

fn print_table(records: &[ProcessedRecord], config: &EngineConfig) {
    if records.is_empty() {
        println!("No matching records");
        return;
    }

    for p in records {
        let id = p.record.id().unwrap_or_default();
        let title = p.record.text(p.kind.title_fields()).unwrap_or_default();
        let status = p.status().unwrap_or_default();
        let priority = p.record.priority().unwrap_or_default();

        println!(
            "{:<10} {:<32} {:<12} {:<8} {:>3}% ({}/{}) {}",
            id,
            title,
            paint_status(&status, config),
            paint_priority(&priority),
            p.metrics.progress_percent,
            p.metrics.completed,
            p.metrics.total,
            p.tags.join(", ").dimmed()
        );
    }
    println!("{} record(s)", records.len());
}

fn paint_status(status: &str, config: &EngineConfig) -> ColoredString {
    if config.is_completion(status) {
        status.green()
    } else if status.eq_ignore_ascii_case("overdue") {
        status.red()
    } else {
        status.normal()
    }
}

fn paint_priority(priority: &str) -> ColoredString {
    match Priority::parse(priority) {
        Priority::High => priority.red().bold(),
        Priority::Medium => priority.yellow(),
        _ => priority.normal(),
    }
}
