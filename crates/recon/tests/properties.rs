// Property-based tests for the reconciliation engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use sheetsift_recon::filter::{self, FilterChain};
use sheetsift_recon::identifier;
use sheetsift_recon::merge::join_by_key;
use sheetsift_recon::project::project_keep;
use sheetsift_recon::reconcile::{dedupe_by_key, exclude_by_key};
use sheetsift_recon::{Table, Value};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn headers() -> Vec<String> {
    vec!["CPF".to_string(), "City".to_string(), "Age".to_string()]
}

/// Identifier in the shapes operators actually paste: punctuated, bare,
/// unpadded numeric, or noise.
fn arb_cpf() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => r"[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}".prop_map(Value::Text),
        3 => r"[0-9]{1,11}".prop_map(Value::Text),
        2 => (0u64..100_000_000_000u64).prop_map(|n| Value::Number(n as f64)),
        1 => r"[a-z/ -]{0,6}".prop_map(Value::Text),
        1 => Just(Value::Empty),
    ]
}

fn arb_city() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::text("Paris")),
        Just(Value::text("Lyon")),
        Just(Value::text("Nice")),
        Just(Value::Empty),
    ]
}

fn arb_row() -> impl Strategy<Value = Vec<Value>> {
    (arb_cpf(), arb_city(), 0i64..100).prop_map(|(cpf, city, age)| vec![cpf, city, Value::from(age)])
}

fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(arb_row(), 0..25).prop_map(|rows| Table::new(headers(), rows).unwrap())
}

fn arb_columns() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(headers(), 0..=3).prop_shuffle()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn projection_is_idempotent(t in arb_table(), cols in arb_columns()) {
        let once = project_keep(&t, &cols).unwrap();
        let twice = project_keep(&once, &cols).unwrap();
        prop_assert_eq!(once.columns(), cols.as_slice());
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn filters_only_remove_rows(t in arb_table(), city in arb_city(), threshold in 0.0f64..100.0) {
        let by_city = filter::filter_equals(&t, "City", &city).unwrap();
        let by_age = filter::filter_greater_than(&by_city, "Age", threshold);
        prop_assert!(by_city.row_count() <= t.row_count());
        prop_assert!(by_city.rows().iter().all(|r| t.rows().contains(r)));
        if let Ok(narrowed) = by_age {
            prop_assert!(narrowed.row_count() <= by_city.row_count());
        }
    }

    #[test]
    fn extending_a_chain_never_adds_rows(
        t in arb_table(),
        order in Just(headers()).prop_shuffle(),
        depth in 0usize..3,
        cpf in arb_cpf(),
        city in arb_city(),
        age in 0i64..100,
    ) {
        let value_for = |column: &str| match column {
            "CPF" => cpf.clone(),
            "City" => city.clone(),
            _ => Value::from(age),
        };
        let chain: FilterChain = order[..depth].iter().map(|c| (c.clone(), value_for(c))).collect();
        let extra = &order[depth];
        prop_assert!(chain.get(extra).is_none());
        let extended = chain.clone().with(extra.clone(), value_for(extra));

        let before = filter::filter_chain(&t, &chain).unwrap();
        let after = filter::filter_chain(&t, &extended).unwrap();
        prop_assert!(after.row_count() <= before.row_count());
        prop_assert!(after.rows().iter().all(|r| before.rows().contains(r)));
    }

    #[test]
    fn chain_matches_fold(t in arb_table(), city in arb_city(), age in 0i64..100) {
        let chain = FilterChain::new().with("City", city.clone()).with("Age", age);
        let folded = filter::filter_equals(&t, "City", &city)
            .and_then(|t| filter::filter_equals(&t, "Age", &Value::from(age)))
            .unwrap();
        prop_assert_eq!(filter::filter_chain(&t, &chain).unwrap(), folded);
    }

    #[test]
    fn normalization_is_stable(cpf in arb_cpf()) {
        let once = identifier::normalize(&cpf);
        prop_assert_eq!(identifier::normalize_str(&once), once.clone());
        prop_assert!(once.bytes().all(|b| b.is_ascii_digit()));

        let formatted = identifier::format(&cpf);
        prop_assert!(formatted.len() >= identifier::CANONICAL_WIDTH);
        prop_assert_eq!(identifier::format_str(&formatted), formatted);
    }

    #[test]
    fn dedupe_leaves_unique_keys(t in arb_table()) {
        let out = dedupe_by_key(&t, "CPF").unwrap();
        let keys: Vec<String> = out.table.column_values("CPF").unwrap().iter().map(|v| v.display_string()).collect();
        let distinct: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(distinct.len(), keys.len());

        let input_keys: HashSet<String> = t.rows().iter().map(|r| identifier::format(&r[0])).collect();
        prop_assert_eq!(keys.len(), input_keys.len());
        prop_assert_eq!(out.counts.before, t.row_count());
    }

    #[test]
    fn exclusion_is_complete(base in arb_table(), removal in arb_table()) {
        let out = exclude_by_key(&base, &removal, "CPF", "CPF").unwrap();
        let removed: HashSet<String> = removal.rows().iter().map(|r| identifier::format(&r[0])).collect();
        for row in out.table.rows() {
            prop_assert!(!removed.contains(&identifier::format(&row[0])));
        }
        let expected = base
            .rows()
            .iter()
            .filter(|r| !removed.contains(&identifier::format(&r[0])))
            .count();
        prop_assert_eq!(out.table.row_count(), expected);
    }

    #[test]
    fn join_pairs_equal_keys(left in arb_table(), right in arb_table()) {
        let out = join_by_key(&left, &right, "CPF", "CPF").unwrap();
        let mut expected = 0;
        for l in left.rows() {
            for r in right.rows() {
                if identifier::normalize(&l[0]) == identifier::normalize(&r[0]) {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(out.row_count(), expected);
        let left_key = out.column_index("CPF_x").unwrap();
        let right_key = out.column_index("CPF_y").unwrap();
        for row in out.rows() {
            prop_assert_eq!(&row[left_key], &row[right_key]);
        }
    }
}
