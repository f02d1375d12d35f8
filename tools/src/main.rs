//! amabutho: headless runner for the subscriber recommendation engine.
//!
//! Usage:
//!   amabutho run --mode random --count 4 --xlsx
//!   amabutho run --mode specific --msisdn 27831234567 --field DeviceType
//!   amabutho parse saved_response.txt
//!   amabutho health --ping

use amabutho_core::{
    analysis::{run_analysis, AnalysisRequest, AnalysisResult},
    config::AppConfig,
    dataset::{ProductCatalogue, SubscriberTable},
    distribution::{category_distribution, render_bar_chart, CategoryPalette},
    error::RecError,
    export,
    health::{all_healthy, check_integration_health},
    insights::format_commentary,
    model::{GeminiClient, GenerativeModel},
    parser::{self, ParsedResponse},
    prompt::render_text_table,
    rng::SampleRng,
    selector::{SelectionMode, SelectionPolicy},
    store::RunStore,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "amabutho", version, about = "AI product recommendations for subscribers")]
struct Cli {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(long, global = true, env = "AMABUTHO_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select subscribers, ask the model, print and export the result.
    Run(RunArgs),
    /// Parse a saved model response offline.
    Parse {
        /// File holding the raw response text.
        file: PathBuf,
    },
    /// Check data files, credentials and (optionally) the model API.
    Health {
        /// Also send a test prompt to the model.
        #[arg(long)]
        ping: bool,
    },
    /// Show recent runs from the ledger.
    History {
        #[arg(long)]
        ledger: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, default_value = "random")]
    mode: String,
    /// MSISDN for specific mode.
    #[arg(long)]
    msisdn: Option<String>,
    /// Sample size for random mode.
    #[arg(long, default_value = "4")]
    count: String,
    /// Profiling field to include (repeatable). Defaults to the configured set.
    #[arg(long = "field")]
    fields: Vec<String>,
    /// Directory for exported files.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    #[arg(long)]
    csv: bool,
    #[arg(long)]
    xlsx: bool,
    #[arg(long)]
    report: bool,
    /// Print the full result as JSON instead of tables.
    #[arg(long)]
    json: bool,
    /// SQLite ledger path. In-memory when omitted.
    #[arg(long)]
    ledger: Option<String>,
    /// Seed the subscriber sample for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Run(args) => run(&config, args),
        Command::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let parsed = parser::parse(&text);
            print_parsed(&parsed, &CategoryPalette::from_config(&config.palette));
            Ok(())
        }
        Command::Health { ping } => health(&config, ping),
        Command::History { ledger, limit } => history(&ledger, limit),
    }
}

fn run(config: &AppConfig, args: RunArgs) -> Result<()> {
    let mode: SelectionMode = args.mode.parse()?;
    let argument = match mode {
        SelectionMode::Specific => args.msisdn.as_deref(),
        SelectionMode::Random => Some(args.count.as_str()),
        SelectionMode::All => None,
    };
    let policy = SelectionPolicy::from_input(mode, argument).map_err(usage_error)?;
    let fields = if args.fields.is_empty() {
        config.profiling_fields.clone()
    } else {
        args.fields.clone()
    };

    let subscribers = SubscriberTable::load(&config.subscriber_file, config.subscriber_limit)
        .with_context(|| format!("failed to load {}", config.subscriber_file))?;
    let catalogue = ProductCatalogue::load(&config.product_file, config.product_limit)
        .with_context(|| format!("failed to load {}", config.product_file))?;

    let model = GeminiClient::from_config(config)?;
    let mut rng = match args.seed {
        Some(seed) => SampleRng::seeded(seed),
        None => SampleRng::from_entropy(),
    };

    let request = AnalysisRequest { policy, fields };
    let result = run_analysis(&request, &subscribers, &catalogue, &model, &mut rng)
        .map_err(usage_error)?;

    let store = match &args.ledger {
        Some(path) => RunStore::open(path)?,
        None => RunStore::in_memory()?,
    };
    store.migrate()?;
    store.record_run(&result, model.name())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, &CategoryPalette::from_config(&config.palette));
    }

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.report_dir));
    if args.csv || args.xlsx || args.report {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("cannot create {}", out_dir.display()))?;
    }
    write_exports(&result, &out_dir, &args)?;
    Ok(())
}

/// Operator mistakes get a hint; everything else passes through.
fn usage_error(e: RecError) -> anyhow::Error {
    if e.is_operator_error() {
        anyhow::anyhow!("{e} (check --mode, --msisdn and --count)")
    } else {
        e.into()
    }
}

fn write_exports(result: &AnalysisResult, out_dir: &Path, args: &RunArgs) -> Result<()> {
    let now = result.generated_at;
    if args.csv {
        match &result.parsed.table {
            Some(table) => {
                let path = out_dir.join(export::default_file_name("Recommendations", "csv", now));
                export::export_table_csv(table, &path)?;
                println!("saved {}", path.display());
            }
            None => println!("no recommendation table to export as CSV"),
        }
        if !result.parsed.insights.is_empty() {
            let path =
                out_dir.join(export::default_file_name("UpsellCrosssell_Strategies", "csv", now));
            export::export_insights_csv(&result.parsed.insights, &path)?;
            println!("saved {}", path.display());
        }
    }
    if args.xlsx {
        let path = out_dir.join(export::default_file_name("Complete_Recommendation_Report", "xlsx", now));
        export::export_workbook(result, &path)?;
        println!("saved {}", path.display());
    }
    if args.report {
        let path = out_dir.join(export::default_file_name("Recommendation_Report", "txt", now));
        export::export_text_report(result, &path)?;
        println!("saved {}", path.display());
    }
    Ok(())
}

fn print_result(result: &AnalysisResult, palette: &CategoryPalette) {
    println!("=== RUN {} ===", result.run_id);
    println!("  generated:   {}", result.generated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  mode:        {}", result.selection_mode);
    println!("  subscribers: {}", result.subscriber_count());
    if result.clamped {
        println!("  (sample size clamped to table size)");
    }
    if let Some(seed) = result.seed {
        println!("  seed:        {seed}");
    }
    println!("  fields:      {}", result.fields_label());
    println!();
    println!("=== SELECTED SUBSCRIBERS ===");
    let rows: Vec<Vec<String>> = result
        .subscribers
        .iter()
        .map(|r| r.fields.iter().map(|(_, v)| v.clone()).collect())
        .collect();
    println!("{}", render_text_table(&result.subscriber_headers, &rows));
    println!();
    print_parsed(&result.parsed, palette);
}

fn print_parsed(parsed: &ParsedResponse, palette: &CategoryPalette) {
    match &parsed.table {
        Some(table) => {
            println!("=== RECOMMENDED PRODUCTS ===");
            println!("{}", render_text_table(&table.columns, &table.rows));
            let missing = table.missing_columns();
            if !missing.is_empty() {
                println!("  (missing columns: {})", missing.join(", "));
            }
            println!();
            println!("=== CATEGORY DISTRIBUTION ===");
            let counts = category_distribution(table);
            println!("{}", render_bar_chart(&counts, 30));
            for c in &counts {
                println!("  {:<16} {}", c.category, palette.color_for(&c.category));
            }
        }
        None => println!("No recommendation table found in the model response."),
    }
    println!();

    println!("=== UPSELL & CROSS-SELL INSIGHTS ===");
    if parsed.insights.is_empty() {
        println!("No structured upsell/cross-sell details found.");
    } else {
        for entry in &parsed.insights {
            println!("  [{:<10}] {}", entry.kind.label(), entry.text);
        }
    }
    println!();
    println!("=== COMMENTARY ===");
    println!("{}", format_commentary(&parsed.commentary));
}

fn health(config: &AppConfig, ping: bool) -> Result<()> {
    let client = if ping {
        match GeminiClient::from_config(config) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("cannot build model client: {e}");
                None
            }
        }
    } else {
        None
    };
    let probes = check_integration_health(
        config,
        client.as_ref().map(|c| c as &dyn GenerativeModel),
    );

    println!("=== INTEGRATION HEALTH ===");
    for p in &probes {
        let status = if p.ok { "OK" } else { "FAILED" };
        println!("  {:<22} {:<7} {}", p.service, status, p.tooltip);
        if !p.ok {
            println!("  {:<22}         {}", "", p.detail);
        }
    }
    if !all_healthy(&probes) {
        anyhow::bail!("one or more health checks failed");
    }
    Ok(())
}

fn history(ledger: &str, limit: usize) -> Result<()> {
    let store = RunStore::open(ledger)?;
    store.migrate()?;
    println!("=== RECENT RUNS ({} total) ===", store.run_count()?);
    for run in store.recent_runs(limit)? {
        println!(
            "  {} | {} | {:<8} | {} subscribers | table: {} ({} rows) | {} insights",
            run.generated_at,
            run.run_id,
            run.selection_mode,
            run.record_count,
            if run.table_found { "yes" } else { "no" },
            run.row_count,
            run.insight_count
        );
    }
    Ok(())
}
