use std::collections::{HashMap, HashSet};

use crate::model::{Company, Deal, Mapping, DIRECT_ID_CONFIDENCE};

/// Company lookup by identifier, built once per pass.
///
/// On duplicate identifiers the first company wins.
pub fn index_companies(companies: &[Company]) -> HashMap<&str, &Company> {
    let mut index = HashMap::with_capacity(companies.len());
    for company in companies {
        index.entry(company.id.as_str()).or_insert(company);
    }
    index
}

/// Companies in input order, skipping rows whose identifier was already seen.
pub fn unique_companies(companies: &[Company]) -> impl Iterator<Item = &Company> {
    let mut seen = HashSet::with_capacity(companies.len());
    companies.iter().filter(move |c| seen.insert(c.id.as_str()))
}

/// Link each deal to the company named by its primary-company reference.
///
/// Deals with a blank reference, or a reference that matches no company,
/// produce nothing. At most one mapping per deal, in deal order.
pub fn resolve_direct_ids(deals: &[Deal], companies: &[Company]) -> Vec<Mapping> {
    let index = index_companies(companies);

    let mappings: Vec<Mapping> = deals
        .iter()
        .filter_map(|deal| {
            let reference = deal.primary_company.as_deref()?;
            let company = index.get(reference)?;
            Some(Mapping {
                deal_id: deal.id.clone(),
                deal_name: deal.name.clone(),
                company_id: company.id.clone(),
                company_name: company.name.clone(),
                confidence: DIRECT_ID_CONFIDENCE,
                amount_cents: deal.budget_cents,
                po_cents: deal.amount_cents,
                brand: deal.brand.clone(),
                stage: deal.stage.clone(),
                pipeline: deal.pipeline.clone(),
                close_date: deal.close_date,
                create_date: deal.create_date,
                is_closed_won: deal.is_closed_won,
            })
        })
        .collect();

    log::debug!("direct-id: {} of {} deals mapped", mappings.len(), deals.len());
    mappings
}

/// Number of mapped deals per company identifier.
pub fn deal_counts(mappings: &[Mapping]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for m in mappings {
        *counts.entry(m.company_id.as_str()).or_insert(0) += 1;
    }
    counts
}
