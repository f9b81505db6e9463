use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::Attribution;
use crate::model::{BrandMetric, Deal};

#[derive(Default)]
struct BrandAccumulator<'a> {
    revenue_cents: i64,
    deal_count: usize,
    companies: BTreeSet<&'a str>,
    pipelines: BTreeMap<String, usize>,
    stages: BTreeMap<String, usize>,
}

/// Explode each deal's brand tags and accumulate per-brand metrics.
///
/// Under `Attribution::Full` a deal tagged with N brands credits its whole
/// budget to each of them, so the sum over brands can exceed the sum over
/// deals. Results are sorted by revenue, highest first, then by name.
pub fn aggregate_brands(deals: &[Deal], attribution: Attribution) -> Vec<BrandMetric> {
    let mut brands: HashMap<&str, BrandAccumulator> = HashMap::new();

    for deal in deals {
        let shares = attribution.shares(deal.budget_cents, deal.brands.len());
        for (brand, share) in deal.brands.iter().zip(shares) {
            let acc = brands.entry(brand.as_str()).or_default();
            acc.revenue_cents = acc.revenue_cents.saturating_add(share);
            acc.deal_count += 1;
            *acc.pipelines.entry(deal.pipeline.clone()).or_insert(0) += 1;
            *acc.stages.entry(deal.stage.clone()).or_insert(0) += 1;
            if let Some(ref company) = deal.primary_company {
                acc.companies.insert(company.as_str());
            }
        }
    }

    let mut metrics: Vec<BrandMetric> = brands
        .into_iter()
        .map(|(brand, acc)| {
            let won: usize = acc
                .stages
                .iter()
                .filter(|(stage, _)| stage.to_lowercase().contains("won"))
                .map(|(_, count)| count)
                .sum();
            BrandMetric {
                brand: brand.to_string(),
                revenue_cents: acc.revenue_cents,
                deal_count: acc.deal_count,
                average_deal_cents: ratio(acc.revenue_cents as f64, acc.deal_count),
                company_count: acc.companies.len(),
                win_rate: ratio(won as f64 * 100.0, acc.deal_count),
                pipelines: acc.pipelines,
                stages: acc.stages,
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.brand.cmp(&b.brand))
    });

    log::debug!("brands: {} distinct brands", metrics.len());
    metrics
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / count as f64
    }
}
