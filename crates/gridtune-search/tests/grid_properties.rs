use gridtune_core::Searcher;
use gridtune_search::{GridParameter, GridSearcher};
use proptest::prelude::*;
use serde_json::json;

fn axes_strategy() -> impl Strategy<Value = Vec<GridParameter>> {
    prop::collection::vec(prop::collection::vec(0i64..100, 1..4), 1..4).prop_map(|value_lists| {
        let names = ["--alpha", "--beta", "--gamma"];
        value_lists
            .into_iter()
            .enumerate()
            .map(|(index, values)| GridParameter {
                name: names[index].to_string(),
                values: values.into_iter().map(|v| json!(v)).collect(),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn unbound_enumeration_counts_grid_times_runs(
        axes in axes_strategy(),
        runs in 1usize..4,
    ) {
        let expected: usize = axes.iter().map(|a| a.values.len()).product::<usize>() * runs;
        let mut searcher = GridSearcher::new(&axes, runs).unwrap();
        let mut count = 0;
        while searcher.next_config().is_ok() {
            count += 1;
        }
        prop_assert_eq!(count, expected);
        prop_assert!(searcher.next_config().unwrap_err().is_exhausted());
    }

    #[test]
    fn runs_of_one_configuration_are_consecutive(
        axes in axes_strategy(),
        runs in 1usize..4,
    ) {
        let searcher = GridSearcher::new(&axes, runs).unwrap();
        let proposed: Vec<Vec<String>> = searcher
            .map(|config| config.unwrap().tokens().unwrap())
            .collect();
        for chunk in proposed.chunks(runs) {
            prop_assert_eq!(chunk.len(), runs);
            for tokens in chunk {
                prop_assert_eq!(tokens, &chunk[0]);
            }
        }
    }
}
