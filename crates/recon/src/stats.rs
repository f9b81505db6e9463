use std::collections::BTreeMap;

use crate::model::{Company, Deal, DomainRelationship, Mapping, StrategyStats};

/// Pipeline-level outcome. Unlike the revenue validator this honours the
/// explicit closed-won flag and separates "closed" stages with no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealStatus {
    Won,
    Lost,
    Open,
    ClosedOther,
}

impl DealStatus {
    pub fn of(deal: &Deal) -> Self {
        let stage = deal.stage.to_lowercase();
        if deal.is_closed_won || stage.contains("won") {
            Self::Won
        } else if stage.contains("lost") {
            Self::Lost
        } else if stage.contains("closed") {
            Self::ClosedOther
        } else {
            Self::Open
        }
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Compute process-wide statistics over the full, unfiltered input.
pub fn compute_stats(
    deals: &[Deal],
    companies: &[Company],
    mappings: &[Mapping],
    domains: &[DomainRelationship],
) -> StrategyStats {
    let mut won = 0;
    let mut open = 0;
    let mut lost = 0;
    let mut closed_other = 0;
    let mut total_revenue_cents: i64 = 0;
    let mut pipelines: BTreeMap<String, usize> = BTreeMap::new();
    let mut stages: BTreeMap<String, usize> = BTreeMap::new();

    for deal in deals {
        total_revenue_cents = total_revenue_cents.saturating_add(deal.budget_cents);
        *pipelines.entry(deal.pipeline.clone()).or_insert(0) += 1;
        *stages.entry(deal.stage.clone()).or_insert(0) += 1;

        match DealStatus::of(deal) {
            DealStatus::Won => won += 1,
            DealStatus::Lost => lost += 1,
            DealStatus::Open => open += 1,
            DealStatus::ClosedOther => closed_other += 1,
        }
    }

    let total_deals = deals.len();
    StrategyStats {
        total_deals,
        total_companies: companies.len(),
        direct_id_matches: mappings.len(),
        domain_matches: domains.len(),
        unmapped_deals: total_deals - mappings.len().min(total_deals),
        mapping_coverage: if total_deals == 0 {
            0.0
        } else {
            mappings.len() as f64 / total_deals as f64
        },
        total_revenue_cents,
        average_revenue_cents: if total_deals == 0 {
            0.0
        } else {
            total_revenue_cents as f64 / total_deals as f64
        },
        won,
        open,
        lost,
        closed_other,
        win_rate: percent(won, total_deals),
        loss_rate: percent(lost, total_deals),
        open_rate: percent(open, total_deals),
        pipelines,
        stages,
    }
}
