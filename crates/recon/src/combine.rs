use crate::model::{CombinedRelationship, DomainRelationship, Link, Mapping, RelationType, Strategy};

/// Merge resolver outputs: Direct-ID mappings first, then domain
/// relationships, each in its resolver's order.
pub fn combine(mappings: &[Mapping], domains: &[DomainRelationship]) -> Vec<CombinedRelationship> {
    let direct = mappings.iter().map(|m| CombinedRelationship {
        strategy: Strategy::EnhancedId,
        relation_type: RelationType::DealCompany,
        link: Link::Mapping(m.clone()),
    });
    let domain = domains.iter().map(|d| CombinedRelationship {
        strategy: Strategy::Domain,
        relation_type: RelationType::ParentChild,
        link: Link::Domain(d.clone()),
    });
    direct.chain(domain).collect()
}

impl CombinedRelationship {
    pub fn confidence(&self) -> u8 {
        match &self.link {
            Link::Mapping(m) => m.confidence,
            Link::Domain(d) => d.confidence,
        }
    }

    /// Fields searched by the free-text filter.
    fn searchable(&self) -> Vec<&str> {
        match &self.link {
            Link::Mapping(m) => vec![m.deal_name.as_str(), m.company_name.as_str(), m.brand.as_str()],
            Link::Domain(d) => vec![d.parent_name.as_str(), d.child_name.as_str()],
        }
    }

    /// Case-insensitive substring match against a lower-cased needle.
    fn matches(&self, needle: &str) -> bool {
        self.searchable()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Free-text filter over the combined sequence. A blank term returns the
/// sequence unchanged.
pub fn filter_relationships(
    relationships: &[CombinedRelationship],
    search: Option<&str>,
) -> Vec<CombinedRelationship> {
    let needle = match search.map(str::trim) {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return relationships.to_vec(),
    };
    relationships
        .iter()
        .filter(|r| r.matches(&needle))
        .cloned()
        .collect()
}
