use gover::core::refs::parse_branch_listing;
use gover::core::version::{compare_versions, parse_version};
use proptest::prelude::*;
use std::cmp::Ordering;

fn version_string() -> impl Strategy<Value = String> {
    (
        prop::option::of(prop_oneof![Just("v"), Just("V")]),
        prop::collection::vec(0u64..1000, 1..5),
        prop::option::of(prop_oneof![Just("-rc"), Just("-beta"), Just("+build")]),
    )
        .prop_map(|(prefix, parts, suffix)| {
            let numbers: Vec<String> = parts.iter().map(u64::to_string).collect();
            format!(
                "{}{}{}",
                prefix.unwrap_or(""),
                numbers.join("."),
                suffix.unwrap_or("")
            )
        })
}

fn branch_name() -> impl Strategy<Value = String> {
    "[a-qs-z][a-z0-9_-]{0,10}(/[a-z0-9_-]{1,8})?"
}

proptest! {
    #[test]
    fn compare_is_reflexive(v in version_string()) {
        prop_assert_eq!(compare_versions(&v, &v), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric(a in version_string(), b in version_string()) {
        prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
    }

    #[test]
    fn leading_v_is_ignored(parts in prop::collection::vec(0u64..1000, 1..4)) {
        let plain: Vec<String> = parts.iter().map(u64::to_string).collect();
        let plain = plain.join(".");
        prop_assert_eq!(compare_versions(&format!("v{plain}"), &plain), Ordering::Equal);
    }

    #[test]
    fn trailing_zero_components_are_ignored(parts in prop::collection::vec(0u64..1000, 1..4)) {
        let short: Vec<String> = parts.iter().map(u64::to_string).collect();
        let short = short.join(".");
        let long = format!("{short}.0.0");
        prop_assert_eq!(compare_versions(&short, &long), Ordering::Equal);
    }

    #[test]
    fn parse_has_at_least_three_components(v in version_string()) {
        prop_assert!(parse_version(&v).len() >= 3);
    }

    #[test]
    fn bumping_a_component_orders_greater(
        parts in prop::collection::vec(0u64..1000, 3..4),
        index in 0usize..3,
    ) {
        let mut bumped = parts.clone();
        bumped[index] += 1;
        let render = |p: &[u64]| p.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
        prop_assert_eq!(compare_versions(&render(&bumped), &render(&parts)), Ordering::Greater);
    }

    #[test]
    fn branch_listing_strips_markers(
        local in prop::collection::vec(branch_name(), 0..8),
        remote in prop::collection::vec(branch_name(), 0..8),
        current in any::<prop::sample::Index>(),
    ) {
        let mut output = String::new();
        let head = if local.is_empty() { None } else { Some(current.index(local.len())) };
        for (i, name) in local.iter().enumerate() {
            let marker = if Some(i) == head { "* " } else { "  " };
            output.push_str(&format!("{marker}{name} 1234567 subject of {name}\n"));
        }
        output.push_str("  remotes/origin/HEAD -> origin/main\n");
        for name in &remote {
            output.push_str(&format!("  remotes/origin/{name} 89abcde remote subject\n"));
        }

        let lines = parse_branch_listing(&output);
        prop_assert_eq!(lines.len(), local.len() + remote.len());
        prop_assert!(lines.iter().all(|l| !l.name.starts_with("remotes/")));
        prop_assert!(lines.iter().all(|l| !l.name.contains("->") && !l.name.ends_with("/HEAD")));
        prop_assert_eq!(lines.iter().filter(|l| l.head).count(), usize::from(head.is_some()));
        prop_assert_eq!(lines.iter().filter(|l| l.remote).count(), remote.len());
        prop_assert!(lines.iter().filter(|l| l.remote).all(|l| l.name.starts_with("origin/")));
    }
}
