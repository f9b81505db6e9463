use std::path::PathBuf;

use dealmap_recon::config::{ReconConfig, RunOptions};
use dealmap_recon::engine::{load_csv_records, load_json_records, run};
use dealmap_recon::model::{Link, ReconInput, ReconResult, Strategy};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_input() -> ReconInput {
    ReconInput {
        deals: load_csv_records("deals", &read_fixture("deals.csv")).unwrap(),
        companies: load_csv_records("companies", &read_fixture("companies.csv")).unwrap(),
    }
}

fn run_with(config: &ReconConfig, search: Option<&str>) -> ReconResult {
    let options = RunOptions {
        search: search.map(str::to_string),
    };
    run(config, &load_input(), &options)
}

fn load_and_run() -> ReconResult {
    run_with(&ReconConfig::default(), None)
}

// -------------------------------------------------------------------------
// Direct-ID
// -------------------------------------------------------------------------

#[test]
fn direct_id_partial_coverage() {
    let result = load_and_run();

    let mapped: Vec<&str> = result.mappings.iter().map(|m| m.deal_id.as_str()).collect();
    assert_eq!(mapped, vec!["1", "2", "3", "6"]);
    assert!(result.mappings.iter().all(|m| m.confidence == 100));

    assert_eq!(result.stats.total_deals, 6);
    assert_eq!(result.stats.direct_id_matches, 4);
    assert_eq!(result.stats.unmapped_deals, 2);
    assert!((result.stats.mapping_coverage - 4.0 / 6.0).abs() < 1e-9);

    assert_eq!(result.checks.blank_references, 1);
    assert_eq!(result.checks.dangling_references, 1);
}

#[test]
fn mappings_carry_denormalized_deal_fields() {
    let result = load_and_run();
    let m = &result.mappings[1];
    assert_eq!(m.deal_name, "Summer promo");
    assert_eq!(m.company_name, "Acme Corp");
    assert_eq!(m.amount_cents, 300_000);
    assert_eq!(m.po_cents, 250_000);
    assert_eq!(m.stage, "Closed Lost");
    assert_eq!(m.close_date.map(|d| d.to_string()).as_deref(), Some("2024-06-30"));
    assert!(!m.is_closed_won);
}

// -------------------------------------------------------------------------
// Domain clustering
// -------------------------------------------------------------------------

#[test]
fn domain_groups_and_parent_election() {
    let result = load_and_run();
    let rels = &result.domain_relationships;
    assert_eq!(rels.len(), 2);

    // acme.com: Acme Corp has 2 mapped deals, beating Acme Retail's higher revenue
    assert_eq!(rels[0].root_domain, "acme.com");
    assert_eq!(rels[0].parent_name, "Acme Corp");
    assert_eq!(rels[0].child_name, "Acme Retail");
    assert_eq!(rels[0].parent_deal_count, 2);
    assert_eq!(rels[0].parent_revenue_cents, 1_200_000);

    // Naive root domain: kite.co.uk and orbit.co.uk both cluster under co.uk
    assert_eq!(rels[1].root_domain, "co.uk");
    assert_eq!(rels[1].parent_name, "Kite UK");
    assert_eq!(rels[1].child_name, "Orbit UK");

    assert!(rels.iter().all(|r| r.confidence == 75));
    assert_eq!(result.checks.companies_without_domain, 1);
    assert_eq!(result.checks.companies_sharing_domain, 4);
}

// -------------------------------------------------------------------------
// Brands
// -------------------------------------------------------------------------

#[test]
fn brand_metrics_full_attribution() {
    let result = load_and_run();
    let order: Vec<&str> = result.brand_metrics.iter().map(|b| b.brand.as_str()).collect();
    assert_eq!(order, vec!["Acme", "Zed", "Kite", "Orbit"]);

    let acme = &result.brand_metrics[0];
    assert_eq!(acme.revenue_cents, 800_000);
    assert_eq!(acme.deal_count, 2);
    assert_eq!(acme.company_count, 1);
    assert_eq!(acme.win_rate, 50.0);

    let zed = &result.brand_metrics[1];
    assert_eq!(zed.revenue_cents, 700_000);
    assert_eq!(zed.company_count, 2);
    assert_eq!(zed.pipelines["Renewals"], 1);

    let kite = &result.brand_metrics[2];
    assert_eq!(kite.revenue_cents, 400_000);
    assert_eq!(kite.deal_count, 2);
    assert_eq!(kite.average_deal_cents, 200_000.0);
    assert_eq!(kite.pipelines["Unknown"], 1);

    // Multi-brand deals credit every brand in full
    assert_eq!(result.checks.deal_revenue_cents, 1_500_000);
    assert_eq!(result.checks.brand_revenue_cents, 2_300_000);
    assert_eq!(result.checks.brand_overcount_cents, 800_000);
    assert_eq!(result.checks.multi_brand_deals, 2);
    assert_eq!(result.checks.unbranded_deals, 1);
}

#[test]
fn brand_metrics_split_attribution() {
    let config = ReconConfig::from_toml(&read_fixture("split-by-id.toml")).unwrap();
    let result = run_with(&config, None);

    let revenue = |brand: &str| {
        result
            .brand_metrics
            .iter()
            .find(|b| b.brand == brand)
            .map(|b| b.revenue_cents)
            .unwrap()
    };
    assert_eq!(revenue("Acme"), 550_000);
    assert_eq!(revenue("Zed"), 450_000);
    assert_eq!(revenue("Kite"), 200_000);
    assert_eq!(revenue("Orbit"), 200_000);

    // Only the unbranded deal is missing from the brand total
    assert_eq!(result.checks.brand_overcount_cents, -100_000);
}

// -------------------------------------------------------------------------
// Revenue validator
// -------------------------------------------------------------------------

#[test]
fn revenue_by_name() {
    let result = load_and_run();
    let names: Vec<&str> = result.company_revenue.iter().map(|c| c.company.as_str()).collect();
    assert_eq!(names, vec!["Acme Corp", "Zed Ltd", "Ghost Inc"]);

    let acme = &result.company_revenue[0];
    assert_eq!(acme.budget_cents, 800_000);
    assert_eq!(acme.po_cents, 700_000);
    assert_eq!((acme.won, acme.open, acme.lost), (1, 0, 1));
    assert_eq!(acme.win_rate, 50.0);
    assert_eq!(acme.average_budget_cents, 400_000.0);
    assert!(acme.accuracy.is_none());

    let zed = &result.company_revenue[1];
    assert_eq!(zed.budget_cents, 500_000);
    assert_eq!((zed.won, zed.open, zed.lost), (0, 1, 1));
}

#[test]
fn revenue_by_id_with_accuracy() {
    let config = ReconConfig::from_toml(&read_fixture("split-by-id.toml")).unwrap();
    let result = run_with(&config, None);

    let ids: Vec<&str> = result
        .company_revenue
        .iter()
        .filter_map(|c| c.company_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["10", "13", "12"]);

    let acme = &result.company_revenue[0];
    assert_eq!(acme.budget_cents, 800_000);
    assert_eq!(acme.declared_revenue_cents, Some(1_200_000));
    let accuracy = acme.accuracy.unwrap();
    assert!((accuracy - 200.0 / 3.0).abs() < 1e-9);

    let kite = &result.company_revenue[1];
    assert_eq!(kite.accuracy, Some(0.0));
    // "Closed" without won/lost counts as open for the validator
    assert_eq!(kite.open, 1);

    let zed = &result.company_revenue[2];
    assert_eq!(zed.accuracy, Some(25.0));
}

// -------------------------------------------------------------------------
// Stats
// -------------------------------------------------------------------------

#[test]
fn strategy_stats() {
    let stats = load_and_run().stats;
    assert_eq!(stats.total_companies, 7);
    assert_eq!(stats.domain_matches, 2);
    assert_eq!(stats.total_revenue_cents, 1_500_000);
    assert_eq!(stats.average_revenue_cents, 250_000.0);
    assert_eq!((stats.won, stats.lost, stats.open, stats.closed_other), (2, 1, 2, 1));
    assert!((stats.win_rate - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.pipelines["Sales"], 3);
    assert_eq!(stats.pipelines["Renewals"], 2);
    assert_eq!(stats.pipelines["Unknown"], 1);
    assert_eq!(stats.stages["Closed Won"], 2);
}

// -------------------------------------------------------------------------
// Combined view + search
// -------------------------------------------------------------------------

#[test]
fn combined_order_and_search() {
    let all = load_and_run();
    assert_eq!(all.relationships.len(), 6);
    assert_eq!(all.meta.total_relationships, 6);
    assert!(all.relationships[..4].iter().all(|r| r.strategy == Strategy::EnhancedId));
    assert!(all.relationships[4..].iter().all(|r| r.strategy == Strategy::Domain));

    let acme = run_with(&ReconConfig::default(), Some("ACME"));
    assert_eq!(acme.relationships.len(), 3);
    assert_eq!(acme.meta.total_relationships, 6);

    let uk = run_with(&ReconConfig::default(), Some("uk"));
    assert_eq!(uk.relationships.len(), 2);
    assert!(matches!(uk.relationships[1].link, Link::Domain(_)));

    let none = run_with(&ReconConfig::default(), Some("zzz-no-match"));
    assert!(none.relationships.is_empty());
    // Stats ignore the filter
    assert_eq!(none.stats.direct_id_matches, 4);
}

#[test]
fn result_serializes_for_display() {
    let result = load_and_run();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["revenue_key"], "name");
    assert_eq!(json["meta"]["brand_attribution"], "full");
    assert_eq!(json["relationships"][0]["strategy"], "Enhanced ID");
    assert_eq!(json["relationships"][4]["type"], "parent_child");
    assert_eq!(json["stats"]["total_revenue_cents"], 1_500_000);
    assert!(json["company_revenue"][0].get("accuracy").is_none());
}

#[test]
fn reruns_are_identical() {
    let a = load_and_run();
    let b = load_and_run();
    assert_eq!(a.mappings, b.mappings);
    assert_eq!(a.domain_relationships, b.domain_relationships);
    assert_eq!(a.brand_metrics, b.brand_metrics);
    assert_eq!(a.company_revenue, b.company_revenue);
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.checks, b.checks);
}

// -------------------------------------------------------------------------
// Renamed columns + JSON input
// -------------------------------------------------------------------------

#[test]
fn renamed_columns_from_json() {
    let config = ReconConfig::from_toml(&read_fixture("renamed.toml")).unwrap();
    let input = ReconInput {
        deals: load_json_records("deals", &read_fixture("renamed-deals.json")).unwrap(),
        companies: load_json_records("companies", &read_fixture("renamed-companies.json"))
            .unwrap(),
    };
    let result = run(&config, &input, &RunOptions::default());

    assert_eq!(result.mappings.len(), 1);
    assert_eq!(result.mappings[0].company_name, "Acme Corp");
    assert_eq!(result.mappings[0].amount_cents, 120_050);
    assert_eq!(result.mappings[0].stage, "Unknown");

    assert_eq!(result.domain_relationships.len(), 1);
    assert_eq!(result.domain_relationships[0].parent_id, "7");
    assert_eq!(result.domain_relationships[0].child_id, "8");

    assert_eq!(result.brand_metrics[0].brand, "Acme");
    assert_eq!(result.brand_metrics[0].revenue_cents, 150_050);
    assert_eq!(result.stats.total_revenue_cents, 150_050);
}
