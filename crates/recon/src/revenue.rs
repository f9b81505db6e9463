//! Revenue validator: per-company totals computed from deals, checked
//! against what companies declare.
//!
//! Two join keys exist and they disagree on which deals belong to which
//! company. A run uses exactly one of them:
//! - [`validate_by_name`]: the free-text associated-companies list.
//! - [`validate_by_id`]: Direct-ID mappings, with an accuracy score against
//!   the declared total revenue.

use std::collections::HashMap;

use crate::config::Attribution;
use crate::direct::index_companies;
use crate::model::{Company, CompanyRevenueAnalysis, Deal, Mapping};

/// Deal outcome inferred from stage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Open,
    Lost,
}

impl Outcome {
    /// "won" wins over "lost"; anything else is open.
    pub fn from_stage(stage: &str) -> Self {
        let lower = stage.to_lowercase();
        if lower.contains("won") {
            Self::Won
        } else if lower.contains("lost") {
            Self::Lost
        } else {
            Self::Open
        }
    }
}

#[derive(Default)]
struct CompanyTotals {
    budget_cents: i64,
    po_cents: i64,
    deal_count: usize,
    won: usize,
    open: usize,
    lost: usize,
}

impl CompanyTotals {
    fn add(&mut self, budget_cents: i64, po_cents: i64, stage: &str) {
        self.budget_cents = self.budget_cents.saturating_add(budget_cents);
        self.po_cents = self.po_cents.saturating_add(po_cents);
        self.deal_count += 1;
        match Outcome::from_stage(stage) {
            Outcome::Won => self.won += 1,
            Outcome::Open => self.open += 1,
            Outcome::Lost => self.lost += 1,
        }
    }

    fn has_money(&self) -> bool {
        self.budget_cents != 0 || self.po_cents != 0
    }

    fn into_analysis(self, company: String) -> CompanyRevenueAnalysis {
        let n = self.deal_count as f64;
        let avg = |cents: i64| if self.deal_count == 0 { 0.0 } else { cents as f64 / n };
        CompanyRevenueAnalysis {
            company,
            company_id: None,
            budget_cents: self.budget_cents,
            po_cents: self.po_cents,
            deal_count: self.deal_count,
            won: self.won,
            open: self.open,
            lost: self.lost,
            win_rate: if self.deal_count == 0 { 0.0 } else { self.won as f64 / n * 100.0 },
            average_budget_cents: avg(self.budget_cents),
            average_po_cents: avg(self.po_cents),
            declared_revenue_cents: None,
            accuracy: None,
        }
    }
}

/// How closely a declared revenue figure matches the calculated one, 0–100.
/// A zero declaration scores 0.
pub fn accuracy(declared_cents: i64, calculated_cents: i64) -> f64 {
    if declared_cents == 0 {
        return 0.0;
    }
    let declared = declared_cents as f64;
    let delta = (declared - calculated_cents as f64).abs();
    (100.0 - delta * 100.0 / declared.abs()).max(0.0)
}

fn sort_by_budget(rows: &mut [CompanyRevenueAnalysis]) {
    rows.sort_by(|a, b| {
        b.budget_cents
            .cmp(&a.budget_cents)
            .then_with(|| a.company.cmp(&b.company))
    });
}

/// Name-keyed validation over each deal's associated-companies list.
///
/// Only companies with a non-zero budget or PO total are returned.
pub fn validate_by_name(deals: &[Deal], attribution: Attribution) -> Vec<CompanyRevenueAnalysis> {
    let mut totals: HashMap<&str, CompanyTotals> = HashMap::new();

    for deal in deals {
        let n = deal.associated_companies.len();
        let budgets = attribution.shares(deal.budget_cents, n);
        let pos = attribution.shares(deal.amount_cents, n);
        for ((name, budget), po) in deal.associated_companies.iter().zip(budgets).zip(pos) {
            totals
                .entry(name.as_str())
                .or_default()
                .add(budget, po, &deal.stage);
        }
    }

    let mut rows: Vec<CompanyRevenueAnalysis> = totals
        .into_iter()
        .filter(|(_, t)| t.has_money())
        .map(|(name, t)| t.into_analysis(name.to_string()))
        .collect();
    sort_by_budget(&mut rows);

    log::debug!("revenue (by name): {} companies", rows.len());
    rows
}

/// Identifier-keyed validation over Direct-ID mappings.
///
/// Only companies with a non-zero budget or PO total are returned.
pub fn validate_by_id(mappings: &[Mapping], companies: &[Company]) -> Vec<CompanyRevenueAnalysis> {
    let index = index_companies(companies);
    let mut totals: HashMap<&str, CompanyTotals> = HashMap::new();

    for m in mappings {
        totals
            .entry(m.company_id.as_str())
            .or_default()
            .add(m.amount_cents, m.po_cents, &m.stage);
    }

    let mut rows: Vec<CompanyRevenueAnalysis> = totals
        .into_iter()
        .filter(|(_, t)| t.has_money())
        .map(|(id, t)| {
            let (name, declared) = match index.get(id) {
                Some(c) => (c.name.clone(), c.total_revenue_cents),
                None => (id.to_string(), 0),
            };
            let calculated = t.budget_cents;
            let mut row = t.into_analysis(name);
            row.company_id = Some(id.to_string());
            row.declared_revenue_cents = Some(declared);
            row.accuracy = Some(accuracy(declared, calculated));
            row
        })
        .collect();
    sort_by_budget(&mut rows);

    log::debug!("revenue (by id): {} companies", rows.len());
    rows
}
