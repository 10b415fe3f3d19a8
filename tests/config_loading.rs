// tests/config_loading.rs
mod common;
use crate::common::fixture;

use std::time::Duration;

use dagsched::config::load_and_validate;
use dagsched::types::{OutputFormat, Traversal};

#[test]
fn sample_config_loads_and_maps_to_search_options() {
    let cfg = load_and_validate(fixture("Dagsched.toml")).unwrap();

    assert_eq!(cfg.output.format, OutputFormat::Triples);

    let opts = cfg.search_options(3);
    assert_eq!(opts.processors, 3);
    assert_eq!(opts.workers, 2);
    assert_eq!(opts.traversal, Traversal::BestFirst);
    assert_eq!(opts.memo_capacity, 100_000);
    assert_eq!(opts.time_budget, Some(Duration::from_secs(60)));
    assert!(opts.validate().is_ok());
}
