//! Domain clustering: companies sharing a root domain are grouped, and one
//! member of each group is elected parent of the others.
//!
//! The root domain is the last two dot-separated labels of the lower-cased,
//! `www.`-stripped domain. Multi-label public suffixes are not special-cased,
//! so `mail.acme.co.uk` clusters under `co.uk`. A relationship only means
//! the companies share DNS, not that one owns the other.

use std::collections::{BTreeMap, HashMap};

use crate::direct::unique_companies;
use crate::model::{Company, DomainRelationship, DOMAIN_CONFIDENCE};

/// Clustering key for a raw domain name. `None` when nothing usable remains.
pub fn root_domain(domain: &str) -> Option<String> {
    let lower = domain.trim().to_lowercase();
    let stripped = lower.strip_prefix("www.").unwrap_or(&lower);
    let labels: Vec<&str> = stripped.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => None,
        1 => Some(labels[0].to_string()),
        n => Some(format!("{}.{}", labels[n - 2], labels[n - 1])),
    }
}

/// Companies grouped by root domain. Members keep input order; groups are
/// ordered by root domain. A repeated identifier keeps its first row only.
pub fn group_by_root_domain(companies: &[Company]) -> BTreeMap<String, Vec<&Company>> {
    let mut groups: BTreeMap<String, Vec<&Company>> = BTreeMap::new();
    for company in unique_companies(companies) {
        if let Some(root) = company.domain.as_deref().and_then(root_domain) {
            groups.entry(root).or_default().push(company);
        }
    }
    groups
}

/// Elect the parent of a group: most mapped deals, then highest declared
/// revenue, then earliest member.
fn elect_parent<'a>(members: &[&'a Company], deal_counts: &HashMap<&str, usize>) -> usize {
    let mut best = 0;
    for (i, candidate) in members.iter().enumerate().skip(1) {
        let current = members[best];
        let cand_deals = deal_counts.get(candidate.id.as_str()).copied().unwrap_or(0);
        let best_deals = deal_counts.get(current.id.as_str()).copied().unwrap_or(0);
        if (cand_deals, candidate.total_revenue_cents) > (best_deals, current.total_revenue_cents) {
            best = i;
        }
    }
    best
}

/// Emit one parent→child relationship for every non-parent member of each
/// group of two or more companies.
pub fn resolve_domains(
    companies: &[Company],
    deal_counts: &HashMap<&str, usize>,
) -> Vec<DomainRelationship> {
    let groups = group_by_root_domain(companies);
    let mut relationships = Vec::new();
    let mut clustered = 0;

    for (root, members) in &groups {
        if members.len() < 2 {
            continue;
        }
        clustered += 1;

        let parent_idx = elect_parent(members, deal_counts);
        let parent = members[parent_idx];
        let parent_deal_count = deal_counts.get(parent.id.as_str()).copied().unwrap_or(0);

        for (i, child) in members.iter().enumerate() {
            if i == parent_idx {
                continue;
            }
            relationships.push(DomainRelationship {
                parent_id: parent.id.clone(),
                parent_name: parent.name.clone(),
                child_id: child.id.clone(),
                child_name: child.name.clone(),
                root_domain: root.clone(),
                confidence: DOMAIN_CONFIDENCE,
                parent_deal_count,
                parent_revenue_cents: parent.total_revenue_cents,
            });
        }
    }

    log::debug!(
        "domain: {} groups, {} clustered, {} relationships",
        groups.len(),
        clustered,
        relationships.len()
    );
    relationships
}
