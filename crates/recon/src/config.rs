use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every table has defaults, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Separator for multi-valued fields (brand tags, associated companies).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub deal_columns: DealColumns,
    #[serde(default)]
    pub company_columns: CompanyColumns,
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub revenue: RevenueConfig,
    #[serde(default)]
    pub placeholders: Placeholders,
}

fn default_name() -> String {
    "dealmap".into()
}

fn default_delimiter() -> String {
    ";".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            delimiter: default_delimiter(),
            deal_columns: DealColumns::default(),
            company_columns: CompanyColumns::default(),
            attribution: AttributionConfig::default(),
            revenue: RevenueConfig::default(),
            placeholders: Placeholders::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names for the deal table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DealColumns {
    pub record_id: String,
    pub name: String,
    pub budget: String,
    pub amount: String,
    pub brand: String,
    pub stage: String,
    pub pipeline: String,
    pub close_date: String,
    pub create_date: String,
    pub is_closed_won: String,
    pub primary_company: String,
    pub associated_companies: String,
}

impl Default for DealColumns {
    fn default() -> Self {
        Self {
            record_id: "Record ID".into(),
            name: "Deal Name".into(),
            budget: "Budget".into(),
            amount: "Amount".into(),
            brand: "Campaign Brand".into(),
            stage: "Deal Stage".into(),
            pipeline: "Pipeline".into(),
            close_date: "Close Date".into(),
            create_date: "Create Date".into(),
            is_closed_won: "Is Closed Won".into(),
            primary_company: "Associated Company IDs (Primary)".into(),
            associated_companies: "Associated Company".into(),
        }
    }
}

impl DealColumns {
    pub fn all(&self) -> [(&'static str, &str); 12] {
        [
            ("record_id", &self.record_id),
            ("name", &self.name),
            ("budget", &self.budget),
            ("amount", &self.amount),
            ("brand", &self.brand),
            ("stage", &self.stage),
            ("pipeline", &self.pipeline),
            ("close_date", &self.close_date),
            ("create_date", &self.create_date),
            ("is_closed_won", &self.is_closed_won),
            ("primary_company", &self.primary_company),
            ("associated_companies", &self.associated_companies),
        ]
    }
}

/// Header names for the company table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanyColumns {
    pub record_id: String,
    pub name: String,
    pub domain: String,
    pub total_revenue: String,
}

impl Default for CompanyColumns {
    fn default() -> Self {
        Self {
            record_id: "Record ID".into(),
            name: "Company name".into(),
            domain: "Company Domain Name".into(),
            total_revenue: "Total Revenue".into(),
        }
    }
}

impl CompanyColumns {
    pub fn all(&self) -> [(&'static str, &str); 4] {
        [
            ("record_id", &self.record_id),
            ("name", &self.name),
            ("domain", &self.domain),
            ("total_revenue", &self.total_revenue),
        ]
    }
}

// ---------------------------------------------------------------------------
// Attribution + Revenue key
// ---------------------------------------------------------------------------

/// How a deal's money is attributed when it names several brands or companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// Every named brand/company receives the deal's full amount.
    #[default]
    Full,
    /// The amount is divided across the names; the cent remainder goes to
    /// the earliest-listed names.
    Split,
}

impl std::fmt::Display for Attribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Split => write!(f, "split"),
        }
    }
}

impl Attribution {
    /// Cents credited to each of `n` names for a deal worth `cents`.
    pub fn shares(self, cents: i64, n: usize) -> Vec<i64> {
        if n == 0 {
            return Vec::new();
        }
        match self {
            Self::Full => vec![cents; n],
            Self::Split => {
                let n_i = n as i64;
                let base = cents.div_euclid(n_i);
                let rem = cents.rem_euclid(n_i) as usize;
                (0..n).map(|i| if i < rem { base + 1 } else { base }).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributionConfig {
    pub brands: Attribution,
    pub companies: Attribution,
}

/// Join key used by the revenue validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueKey {
    /// Free-text names from the deal's associated-companies field.
    #[default]
    Name,
    /// Company identifier, via Direct-ID mappings.
    Id,
}

impl std::fmt::Display for RevenueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Id => write!(f, "id"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevenueConfig {
    pub key: RevenueKey,
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Text substituted for blank string fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Placeholders {
    pub unknown: String,
    pub unnamed_deal: String,
    pub unnamed_company: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            unknown: "Unknown".into(),
            unnamed_deal: "Unnamed Deal".into(),
            unnamed_company: "Unnamed Company".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-run options
// ---------------------------------------------------------------------------

/// Parameters supplied by the caller on each invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Free-text filter over the combined relationships. `None` or blank
    /// returns the full sequence.
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.delimiter.chars().count() != 1 {
            return Err(ReconError::ConfigValidation(format!(
                "delimiter must be a single character, got {:?}",
                self.delimiter
            )));
        }

        for (field, column) in self.deal_columns.all() {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "deal_columns.{field} must not be empty"
                )));
            }
        }
        for (field, column) in self.company_columns.all() {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "company_columns.{field} must not be empty"
                )));
            }
        }

        let p = &self.placeholders;
        for (field, value) in [
            ("unknown", &p.unknown),
            ("unnamed_deal", &p.unnamed_deal),
            ("unnamed_company", &p.unnamed_company),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "placeholders.{field} must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// The multi-value delimiter. Validation guarantees exactly one char.
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(';')
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.name, "dealmap");
        assert_eq!(config.delimiter_char(), ';');
        assert_eq!(config.deal_columns.primary_company, "Associated Company IDs (Primary)");
        assert_eq!(config.company_columns.domain, "Company Domain Name");
        assert_eq!(config.attribution.brands, Attribution::Full);
        assert_eq!(config.attribution.companies, Attribution::Full);
        assert_eq!(config.revenue.key, RevenueKey::Name);
        assert_eq!(config.placeholders.unknown, "Unknown");
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
name = "Q3 pipeline"
delimiter = "|"

[deal_columns]
budget = "Media Budget"

[company_columns]
domain = "Website"

[attribution]
brands = "split"

[revenue]
key = "id"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "Q3 pipeline");
        assert_eq!(config.delimiter_char(), '|');
        assert_eq!(config.deal_columns.budget, "Media Budget");
        // Untouched columns keep their defaults
        assert_eq!(config.deal_columns.amount, "Amount");
        assert_eq!(config.company_columns.domain, "Website");
        assert_eq!(config.attribution.brands, Attribution::Split);
        assert_eq!(config.attribution.companies, Attribution::Full);
        assert_eq!(config.revenue.key, RevenueKey::Id);
    }

    #[test]
    fn reject_unknown_revenue_key() {
        let err = ReconConfig::from_toml("[revenue]\nkey = \"email\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_multi_char_delimiter() {
        let err = ReconConfig::from_toml("delimiter = \";;\"\n").unwrap_err();
        assert!(err.to_string().contains("single character"));
    }

    #[test]
    fn reject_empty_column() {
        let err = ReconConfig::from_toml("[deal_columns]\nbudget = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("deal_columns.budget"));
    }

    #[test]
    fn reject_empty_placeholder() {
        let err = ReconConfig::from_toml("[placeholders]\nunknown = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("placeholders.unknown"));
    }

    #[test]
    fn attribution_shares() {
        assert_eq!(Attribution::Full.shares(500, 2), vec![500, 500]);
        assert_eq!(Attribution::Split.shares(500, 2), vec![250, 250]);
        assert_eq!(Attribution::Split.shares(100, 3), vec![34, 33, 33]);
        assert_eq!(Attribution::Split.shares(-100, 3).iter().sum::<i64>(), -100);
        assert!(Attribution::Full.shares(500, 0).is_empty());
    }

    #[test]
    fn reject_unknown_field() {
        let err = ReconConfig::from_toml("[revenue]\njoin = \"id\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
