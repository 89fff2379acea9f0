use proptest::prelude::*;

use crate::workflows::prakriti::catalog::QuestionCatalog;
use crate::workflows::prakriti::classifier::{classify, ClassifierConfig, PriorityOrder};
use crate::workflows::prakriti::domain::{Answer, AnswerPair, Dosha};
use crate::workflows::prakriti::normalizer::normalize_answers;
use crate::workflows::prakriti::scoring::aggregate_scores;

fn dosha_strategy() -> impl Strategy<Value = Dosha> {
    prop_oneof![Just(Dosha::Vata), Just(Dosha::Pitta), Just(Dosha::Kapha)]
}

fn pairs_strategy() -> impl Strategy<Value = Vec<AnswerPair>> {
    prop::collection::vec(
        (dosha_strategy(), 0u32..50).prop_map(|(dosha, weight)| AnswerPair { dosha, weight }),
        1..40,
    )
}

proptest! {
    #[test]
    fn percentages_sum_to_one_hundred(pairs in pairs_strategy()) {
        let scores = aggregate_scores(&pairs);
        let expected_total: u64 = pairs.iter().map(|pair| u64::from(pair.weight)).sum();

        prop_assert_eq!(scores.grand_total, expected_total);
        if scores.is_degenerate() {
            prop_assert_eq!(scores.percentage_sum(), 0);
        } else {
            prop_assert_eq!(scores.percentage_sum(), 100);
        }

        for entry in &scores.entries {
            prop_assert!(entry.percentage <= 100);
            if scores.grand_total > 0 {
                // always the floor or ceiling of the exact share
                let scaled = entry.total * 100;
                let floor = scaled / scores.grand_total;
                let value = u64::from(entry.percentage);
                prop_assert!(value == floor || value == floor + 1);
            }
        }
    }

    #[test]
    fn pipeline_is_deterministic(options in prop::collection::vec(1u8..=3, 10)) {
        let catalog = QuestionCatalog::standard();
        let answers: Vec<Answer> = options
            .iter()
            .enumerate()
            .map(|(index, option)| Answer::new(index as u16 + 1, *option))
            .collect();
        let config = ClassifierConfig::default();

        let run = || {
            let pairs = normalize_answers(&answers, &catalog).expect("complete set");
            classify(&aggregate_scores(&pairs), &config)
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn ties_resolve_to_the_first_tied_category_in_priority(
        weight in 1u32..20,
        order in Just(Dosha::ordered().to_vec()).prop_shuffle(),
    ) {
        let pairs: Vec<AnswerPair> = Dosha::ordered()
            .into_iter()
            .map(|dosha| AnswerPair { dosha, weight })
            .collect();
        let priority = PriorityOrder::new(order.clone()).expect("permutation is valid");
        let config = ClassifierConfig::new(priority, 80).expect("valid config");

        let classification = classify(&aggregate_scores(&pairs), &config);
        prop_assert!(classification.tie);
        prop_assert_eq!(classification.dominant, order[0]);
        prop_assert_eq!(classification.secondary, Some(order[1]));
    }
}

#[test]
fn reference_scenario_classifies_as_single_vata() {
    let catalog = QuestionCatalog::standard();
    let answers: Vec<Answer> = [1, 1, 1, 1, 1, 1, 1, 2, 2, 3]
        .iter()
        .enumerate()
        .map(|(index, option)| Answer::new(index as u16 + 1, *option))
        .collect();

    let pairs = normalize_answers(&answers, &catalog).expect("complete set");
    let scores = aggregate_scores(&pairs);
    let classification = classify(&scores, &ClassifierConfig::default());

    assert_eq!(
        [Dosha::Vata, Dosha::Pitta, Dosha::Kapha].map(|dosha| scores.total(dosha)),
        [21, 6, 3]
    );
    assert_eq!(
        [Dosha::Vata, Dosha::Pitta, Dosha::Kapha].map(|dosha| scores.percentage(dosha)),
        [70, 20, 10]
    );
    assert_eq!(classification.dominant, Dosha::Vata);
    assert_eq!(classification.secondary, None);
}
