use std::collections::HashMap;

use serde_json::Value;

use crate::brand::aggregate_brands;
use crate::checks::compute_checks;
use crate::combine::{combine, filter_relationships};
use crate::config::{ReconConfig, RevenueKey, RunOptions};
use crate::direct::{deal_counts, resolve_direct_ids};
use crate::domain::resolve_domains;
use crate::error::ReconError;
use crate::model::{Company, Deal, RawRecord, ReconInput, ReconMeta, ReconResult};
use crate::normalize::normalize_input;
use crate::revenue::{validate_by_id, validate_by_name};
use crate::stats::compute_stats;

/// Normalize raw records and run a full reconciliation pass.
pub fn run(config: &ReconConfig, input: &ReconInput, options: &RunOptions) -> ReconResult {
    let (deals, companies) = normalize_input(&input.deals, &input.companies, config);
    reconcile(config, &deals, &companies, options)
}

/// Run a full reconciliation pass over already-normalized records.
///
/// Pure: every derived collection is rebuilt from `deals` and `companies`.
pub fn reconcile(
    config: &ReconConfig,
    deals: &[Deal],
    companies: &[Company],
    options: &RunOptions,
) -> ReconResult {
    let mappings = resolve_direct_ids(deals, companies);
    let domain_relationships = resolve_domains(companies, &deal_counts(&mappings));
    let brand_metrics = aggregate_brands(deals, config.attribution.brands);

    let company_revenue = match config.revenue.key {
        RevenueKey::Name => validate_by_name(deals, config.attribution.companies),
        RevenueKey::Id => validate_by_id(&mappings, companies),
    };

    let stats = compute_stats(deals, companies, &mappings, &domain_relationships);
    let checks = compute_checks(deals, companies, &brand_metrics);

    let combined = combine(&mappings, &domain_relationships);
    let search = options
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let relationships = filter_relationships(&combined, search.as_deref());

    log::info!(
        "reconciled {} deals / {} companies: {} direct-id, {} domain, {} shown",
        stats.total_deals,
        stats.total_companies,
        stats.direct_id_matches,
        stats.domain_matches,
        relationships.len()
    );

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            revenue_key: config.revenue.key,
            brand_attribution: config.attribution.brands,
            company_attribution: config.attribution.companies,
            search,
            total_relationships: combined.len(),
        },
        stats,
        checks,
        mappings,
        domain_relationships,
        brand_metrics,
        company_revenue,
        relationships,
    }
}

/// Decode CSV text (with a header row) into raw records. Every cell is kept
/// as a string; typing happens during normalization. Short rows leave their
/// trailing columns absent, extra cells are dropped.
pub fn load_csv_records(table: &str, csv_data: &str) -> Result<Vec<RawRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv {
            table: table.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv {
            table: table.into(),
            message: e.to_string(),
        })?;

        let fields: HashMap<String, Value> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), Value::String(v.to_string()))))
            .collect();
        rows.push(RawRecord { fields });
    }

    log::debug!("{table}: loaded {} CSV rows", rows.len());
    Ok(rows)
}

/// Decode a JSON array of objects into raw records. Values keep their JSON
/// types.
pub fn load_json_records(table: &str, json_data: &str) -> Result<Vec<RawRecord>, ReconError> {
    let json_err = |message: String| ReconError::Json {
        table: table.into(),
        message,
    };

    let value: Value = serde_json::from_str(json_data).map_err(|e| json_err(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(json_err("expected an array of objects".into()));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => rows.push(RawRecord {
                fields: map.into_iter().collect(),
            }),
            other => {
                return Err(json_err(format!(
                    "element {i} is {}, expected an object",
                    json_type(&other)
                )))
            }
        }
    }

    log::debug!("{table}: loaded {} JSON records", rows.len());
    Ok(rows)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
