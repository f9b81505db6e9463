//! `dealmap run` and `dealmap validate`.

use std::path::{Path, PathBuf};

use clap::Args;
use dealmap_recon::{ReconConfig, ReconError, ReconInput, ReconResult, RunOptions, RawRecord};

use crate::exit_codes::{EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_OUTPUT};
use crate::CliError;

/// Brands listed in the human summary.
const TOP_BRANDS: usize = 5;

#[derive(Args)]
pub struct RunArgs {
    /// Deals export (.csv or .json)
    #[arg(long)]
    pub deals: PathBuf,

    /// Companies export (.csv or .json)
    #[arg(long)]
    pub companies: PathBuf,

    /// TOML config (column names, attribution, revenue key)
    #[arg(long, env = "DEALMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Case-insensitive filter for the combined relationship list
    #[arg(long)]
    pub search: Option<String>,

    /// Output JSON to stdout instead of human summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log resolver progress to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

fn config_err(e: ReconError) -> CliError {
    CliError::new(EXIT_INVALID_CONFIG, e.to_string())
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&text).map_err(config_err)
}

fn load_table(table: &str, path: &Path) -> Result<Vec<RawRecord>, CliError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INPUT, format!("cannot read {}: {e}", path.display()))
    })?;
    let format = TableFormat::of(path);
    let records = match format {
        TableFormat::Csv => dealmap_recon::load_csv_records(table, &data),
        TableFormat::Json => dealmap_recon::load_json_records(table, &data),
    };
    records.map_err(|e| {
        let err = CliError::new(EXIT_INPUT, e.to_string());
        match format {
            TableFormat::Csv => err.with_hint("files without a .json extension are read as CSV"),
            TableFormat::Json => err.with_hint("expected a JSON array of objects"),
        }
    })
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let input = ReconInput {
        deals: load_table("deals", &args.deals)?,
        companies: load_table("companies", &args.companies)?,
    };
    log::debug!(
        "loaded {} deal rows from {}, {} company rows from {}",
        input.deals.len(),
        args.deals.display(),
        input.companies.len(),
        args.companies.display(),
    );

    let options = RunOptions { search: args.search };
    let result = dealmap_recon::run(&config, &input, &options);

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str).map_err(|e| {
            CliError::new(EXIT_OUTPUT, format!("cannot write output {}: {e}", path.display()))
        })?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    print_summary(&result);
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: '{}' with delimiter '{}', {} brand attribution, {} company attribution, revenue by {}",
        config.name,
        config.delimiter,
        config.attribution.brands,
        config.attribution.companies,
        config.revenue.key,
    );
    Ok(())
}

// ---- human summary (stderr) ----

fn print_summary(result: &ReconResult) {
    let s = &result.stats;
    eprintln!(
        "{} deals, {} companies: {} direct-id matches, {} domain links, {} unmapped ({:.1}% coverage)",
        s.total_deals,
        s.total_companies,
        s.direct_id_matches,
        s.domain_matches,
        s.unmapped_deals,
        s.mapping_coverage * 100.0,
    );
    eprintln!(
        "revenue {}: {} won, {} open, {} lost ({:.1}% win rate)",
        format_cents(s.total_revenue_cents),
        s.won,
        s.open,
        s.lost,
        s.win_rate,
    );

    for b in result.brand_metrics.iter().take(TOP_BRANDS) {
        eprintln!(
            "  {:<24} {:>16}  {} deal(s)",
            b.brand,
            format_cents(b.revenue_cents),
            b.deal_count,
        );
    }

    if let Some(ref term) = result.meta.search {
        eprintln!(
            "search '{}': {} of {} relationships",
            term,
            result.relationships.len(),
            result.meta.total_relationships,
        );
    }
}

/// `1234567` cents → `12,345.67`.
fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{:02}", abs % 100)
}
