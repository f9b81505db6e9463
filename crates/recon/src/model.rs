use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{Attribution, RevenueKey};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single header-named row as handed over by the data source.
///
/// Values keep whatever type the source produced: CSV cells are always
/// strings, JSON input may mix numbers, bools and nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub fields: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.fields.get(column)
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Pre-loaded deal and company tables.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub deals: Vec<RawRecord>,
    pub companies: Vec<RawRecord>,
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

/// A typed deal. Budget is the authoritative deal value; `amount_cents`
/// (the PO value) is reported alongside but never substituted for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub id: String,
    pub name: String,
    pub budget_cents: i64,
    pub amount_cents: i64,
    /// Raw brand-tag text, kept for display and filtering.
    pub brand: String,
    pub brands: Vec<String>,
    pub stage: String,
    pub pipeline: String,
    /// Primary company reference; `None` when blank.
    pub primary_company: Option<String>,
    pub associated_companies: Vec<String>,
    pub close_date: Option<NaiveDate>,
    pub create_date: Option<NaiveDate>,
    pub is_closed_won: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
    pub total_revenue_cents: i64,
}

// ---------------------------------------------------------------------------
// Resolver outputs
// ---------------------------------------------------------------------------

/// Confidence weight of a Direct-ID mapping.
pub const DIRECT_ID_CONFIDENCE: u8 = 100;

/// Confidence weight of a domain relationship.
pub const DOMAIN_CONFIDENCE: u8 = 75;

/// Deal linked to a company through its primary-company reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mapping {
    pub deal_id: String,
    pub deal_name: String,
    pub company_id: String,
    pub company_name: String,
    pub confidence: u8,
    /// Deal value (the budget).
    pub amount_cents: i64,
    /// PO value.
    pub po_cents: i64,
    pub brand: String,
    pub stage: String,
    pub pipeline: String,
    pub close_date: Option<NaiveDate>,
    pub create_date: Option<NaiveDate>,
    pub is_closed_won: bool,
}

/// Parent/child pair inferred from a shared root domain.
///
/// This records DNS co-location only. It is a heuristic and says nothing
/// about legal or organizational structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRelationship {
    pub parent_id: String,
    pub parent_name: String,
    pub child_id: String,
    pub child_name: String,
    pub root_domain: String,
    pub confidence: u8,
    pub parent_deal_count: usize,
    pub parent_revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandMetric {
    pub brand: String,
    pub revenue_cents: i64,
    pub deal_count: usize,
    pub average_deal_cents: f64,
    pub company_count: usize,
    pub win_rate: f64,
    pub pipelines: BTreeMap<String, usize>,
    pub stages: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRevenueAnalysis {
    pub company: String,
    /// Set by the identifier-keyed validator only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub budget_cents: i64,
    pub po_cents: i64,
    pub deal_count: usize,
    pub won: usize,
    pub open: usize,
    pub lost: usize,
    pub win_rate: f64,
    pub average_budget_cents: f64,
    pub average_po_cents: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_revenue_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

// ---------------------------------------------------------------------------
// Combined view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    #[serde(rename = "Enhanced ID")]
    EnhancedId,
    #[serde(rename = "Domain")]
    Domain,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnhancedId => write!(f, "Enhanced ID"),
            Self::Domain => write!(f, "Domain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    DealCompany,
    ParentChild,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Link {
    Mapping(Mapping),
    Domain(DomainRelationship),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRelationship {
    pub strategy: Strategy,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(flatten)]
    pub link: Link,
}

// ---------------------------------------------------------------------------
// Stats + Checks
// ---------------------------------------------------------------------------

/// Process-wide aggregates, always over the full unfiltered input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStats {
    pub total_deals: usize,
    pub total_companies: usize,
    pub direct_id_matches: usize,
    pub domain_matches: usize,
    pub unmapped_deals: usize,
    /// Direct-ID mappings / total deals, in `[0, 1]`.
    pub mapping_coverage: f64,
    pub total_revenue_cents: i64,
    pub average_revenue_cents: f64,
    pub won: usize,
    pub open: usize,
    pub lost: usize,
    /// Stage says "closed" without saying won or lost.
    pub closed_other: usize,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub open_rate: f64,
    pub pipelines: BTreeMap<String, usize>,
    pub stages: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationChecks {
    pub deal_revenue_cents: i64,
    pub brand_revenue_cents: i64,
    /// Brand revenue minus deal revenue. Positive under full attribution
    /// whenever a deal names several brands.
    pub brand_overcount_cents: i64,
    pub multi_brand_deals: usize,
    pub multi_company_deals: usize,
    pub unbranded_deals: usize,
    pub blank_references: usize,
    pub dangling_references: usize,
    pub companies_without_domain: usize,
    pub companies_sharing_domain: usize,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub revenue_key: RevenueKey,
    pub brand_attribution: Attribution,
    pub company_attribution: Attribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Size of the combined sequence before the search filter.
    pub total_relationships: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub stats: StrategyStats,
    pub checks: ValidationChecks,
    pub mappings: Vec<Mapping>,
    pub domain_relationships: Vec<DomainRelationship>,
    pub brand_metrics: Vec<BrandMetric>,
    pub company_revenue: Vec<CompanyRevenueAnalysis>,
    /// Combined relationships after the search filter.
    pub relationships: Vec<CombinedRelationship>,
}
