use cfchain::{combine, infer, Evidence, Facts, InferenceEngine, Rule, RuleSet};
use proptest::prelude::*;

const FACTS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn arb_rule(index: usize) -> impl Strategy<Value = Rule> {
    (
        proptest::sample::subsequence(FACTS.to_vec(), 1..=3),
        proptest::sample::select(FACTS.to_vec()),
        0.0f64..=1.0,
    )
        .prop_map(move |(premises, conclusion, weight)| {
            Rule::builder(format!("r{index}"))
                .premises(premises)
                .conclusion(conclusion)
                .weight(weight)
                .build()
                .unwrap()
        })
}

fn arb_rules() -> impl Strategy<Value = Vec<Rule>> {
    (1usize..8).prop_flat_map(|n| (0..n).map(arb_rule).collect::<Vec<_>>())
}

fn arb_rules_and_shuffle() -> impl Strategy<Value = (Vec<Rule>, Vec<Rule>)> {
    arb_rules().prop_flat_map(|rules| (Just(rules.clone()), Just(rules).prop_shuffle()))
}

fn arb_evidence() -> impl Strategy<Value = Facts> {
    proptest::sample::subsequence(FACTS.to_vec(), 0..=3)
        .prop_map(|ids| Evidence::from_checked(ids).into_facts())
}

proptest! {
    #[test]
    fn combine_is_commutative(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        prop_assert_eq!(combine(a, b), combine(b, a));
    }

    #[test]
    fn combine_has_zero_identity(a in 0.0f64..=1.0) {
        prop_assert_eq!(combine(a, 0.0), a);
        prop_assert_eq!(combine(0.0, a), a);
    }

    #[test]
    fn combine_is_bounded_and_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0, c in 0.0f64..=1.0) {
        let ab = combine(a, b);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!(ab >= a.max(b) - 1e-12);
        if b <= c {
            prop_assert!(combine(a, b) <= combine(a, c) + 1e-12);
        }
    }

    #[test]
    fn outputs_come_from_inputs_or_fired_rules(rules in arb_rules(), initial in arb_evidence()) {
        let rules = RuleSet::new(rules).unwrap();
        let outcome = InferenceEngine::default().run(&rules, &initial);
        for (id, cf) in outcome.facts.iter() {
            let concluded = rules
                .iter()
                .any(|r| r.conclusion() == id && outcome.has_fired(r.id()));
            prop_assert!(initial.contains(id.as_str()) || concluded);
            prop_assert!((0.0..=1.0).contains(&cf.value()));
        }
    }

    #[test]
    fn each_rule_fires_at_most_once(rules in arb_rules(), initial in arb_evidence()) {
        let rules = RuleSet::new(rules).unwrap();
        let outcome = InferenceEngine::default().run(&rules, &initial);
        let mut fired = outcome.fired.clone();
        fired.sort();
        fired.dedup();
        prop_assert_eq!(fired.len(), outcome.fired.len());
        prop_assert!(outcome.passes <= rules.len());
    }

    #[test]
    fn rule_order_does_not_change_results(
        (rules, shuffled) in arb_rules_and_shuffle(),
        initial in arb_evidence(),
    ) {
        let declared = InferenceEngine::default().run(&RuleSet::new(rules).unwrap(), &initial);
        let reordered = InferenceEngine::default().run(&RuleSet::new(shuffled).unwrap(), &initial);
        prop_assert_eq!(declared.facts, reordered.facts);
        prop_assert_eq!(declared.passes, reordered.passes);
    }

    #[test]
    fn rerun_introduces_no_new_facts(rules in arb_rules(), initial in arb_evidence()) {
        let rules = RuleSet::new(rules).unwrap();
        let first = infer(&rules, &initial);
        let second = infer(&rules, &first);
        prop_assert_eq!(first.ids().collect::<Vec<_>>(), second.ids().collect::<Vec<_>>());
    }

    #[test]
    fn empty_evidence_yields_empty_result(rules in arb_rules()) {
        let rules = RuleSet::new(rules).unwrap();
        prop_assert!(infer(&rules, &Facts::new()).is_empty());
    }
}
