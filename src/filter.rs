//! Correlation tag filtering

use crate::rule::Rule;

/// Rules whose description equals `tag`, in snapshot order
pub fn select_by_description<'a>(rules: &'a [Rule], tag: &str) -> Vec<&'a Rule> {
    rules.iter().filter(|rule| rule.description == tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rule, rule_on_port};

    #[test]
    fn selects_exact_matches_in_order() {
        let rules = vec![
            rule_on_port("agent", "1.1.1.1", "22/22"),
            rule("other", "2.2.2.2"),
            rule_on_port("agent", "3.3.3.3", "443/443"),
            rule("agent-2", "4.4.4.4"),
            rule("Agent", "5.5.5.5"),
        ];

        let selected = select_by_description(&rules, "agent");
        let sources: Vec<_> = selected.iter().map(|r| r.source_address.as_str()).collect();
        assert_eq!(sources, vec!["1.1.1.1", "3.3.3.3"]);
    }

    #[test]
    fn selection_is_idempotent() {
        let rules = vec![rule("agent", "1.1.1.1"), rule("x", "2.2.2.2")];
        let once: Vec<Rule> = select_by_description(&rules, "agent")
            .into_iter()
            .cloned()
            .collect();
        let twice = select_by_description(&once, "agent");

        assert_eq!(once.len(), twice.len());
        assert!(once.iter().zip(twice).all(|(a, b)| a == b));
    }

    #[test]
    fn empty_inputs() {
        assert!(select_by_description(&[], "agent").is_empty());
        let rules = vec![rule("other", "1.1.1.1")];
        assert!(select_by_description(&rules, "agent").is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Rules with descriptions from a small alphabet so tags collide often
        fn rules_strategy() -> impl Strategy<Value = Vec<Rule>> {
            prop::collection::vec(("[ab]{0,2}", "[0-9]{1,3}"), 0..40).prop_map(|entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (description, octet))| {
                        let port = format!("{i}/{i}");
                        rule_on_port(&description, &format!("10.0.0.{octet}"), &port)
                    })
                    .collect()
            })
        }

        proptest! {
            /// Selection is exactly the rules tagged `tag`, in snapshot order
            #[test]
            fn selects_exactly_tagged_rules_in_order(
                rules in rules_strategy(),
                tag in "[ab]{0,2}"
            ) {
                let selected = select_by_description(&rules, &tag);
                let expected: Vec<&Rule> =
                    rules.iter().filter(|r| r.description == tag).collect();

                prop_assert_eq!(selected.len(), expected.len());
                for (got, want) in selected.iter().zip(&expected) {
                    prop_assert!(std::ptr::eq(*got, *want));
                }
            }

            /// Selecting an already selected set changes nothing
            #[test]
            fn selection_is_idempotent_for_any_rule_set(
                rules in rules_strategy(),
                tag in "[ab]{0,2}"
            ) {
                let once: Vec<Rule> = select_by_description(&rules, &tag)
                    .into_iter()
                    .cloned()
                    .collect();
                let twice: Vec<Rule> = select_by_description(&once, &tag)
                    .into_iter()
                    .cloned()
                    .collect();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
