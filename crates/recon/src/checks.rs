//! Data-quality checks reported next to the statistics.

use std::collections::HashMap;

use crate::direct::{index_companies, unique_companies};
use crate::domain::root_domain;
use crate::model::{BrandMetric, Company, Deal, ValidationChecks};

pub fn compute_checks(
    deals: &[Deal],
    companies: &[Company],
    brand_metrics: &[BrandMetric],
) -> ValidationChecks {
    let index = index_companies(companies);

    // Money totals saturate at the i64 bounds instead of overflowing.
    let deal_revenue_cents = deals
        .iter()
        .map(|d| d.budget_cents)
        .fold(0i64, i64::saturating_add);
    let brand_revenue_cents = brand_metrics
        .iter()
        .map(|b| b.revenue_cents)
        .fold(0i64, i64::saturating_add);

    let mut blank_references = 0;
    let mut dangling_references = 0;
    for deal in deals {
        match deal.primary_company.as_deref() {
            None => blank_references += 1,
            Some(r) if !index.contains_key(r) => dangling_references += 1,
            Some(_) => {}
        }
    }

    let mut root_sizes: HashMap<String, usize> = HashMap::new();
    let mut companies_without_domain = 0;
    for company in unique_companies(companies) {
        match company.domain.as_deref().and_then(root_domain) {
            Some(root) => *root_sizes.entry(root).or_insert(0) += 1,
            None => companies_without_domain += 1,
        }
    }
    let companies_sharing_domain: usize = root_sizes.values().filter(|&&n| n >= 2).sum();

    if dangling_references > 0 {
        log::warn!("{dangling_references} deal(s) reference a company ID that does not exist");
    }

    ValidationChecks {
        deal_revenue_cents,
        brand_revenue_cents,
        brand_overcount_cents: brand_revenue_cents.saturating_sub(deal_revenue_cents),
        multi_brand_deals: deals.iter().filter(|d| d.brands.len() > 1).count(),
        multi_company_deals: deals.iter().filter(|d| d.associated_companies.len() > 1).count(),
        unbranded_deals: deals.iter().filter(|d| d.brands.is_empty()).count(),
        blank_references,
        dangling_references,
        companies_without_domain,
        companies_sharing_domain,
    }
}
