mod common;

use causal_search_core::{CpcSearch, DSeparationOracle, NodeId, SearchConfig};
use common::vars;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["V0", "V1", "V2", "V3", "V4"];

/// A DAG over `NAMES` whose edges all point from lower to higher index.
fn dag_from_mask(mask: &[bool]) -> (DSeparationOracle, Vec<(usize, usize)>) {
    let mut edges = Vec::new();
    let mut bit = 0;
    for i in 0..NAMES.len() {
        for j in (i + 1)..NAMES.len() {
            if mask[bit] {
                edges.push((i, j));
            }
            bit += 1;
        }
    }
    let named: Vec<(&str, &str)> = edges.iter().map(|&(i, j)| (NAMES[i], NAMES[j])).collect();
    (DSeparationOracle::from_edges(&vars(&NAMES), &named).unwrap(), edges)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_skeleton_is_sound(mask in prop::collection::vec(any::<bool>(), 10)) {
        let (oracle, edges) = dag_from_mask(&mask);
        let outcome = CpcSearch::new(&oracle).with_config(SearchConfig { parallel: false, ..SearchConfig::default() }).search().unwrap();

        // Adjacent in the DAG stays adjacent; everything else was separated by its sepset.
        for x in 0..NAMES.len() {
            for y in (x + 1)..NAMES.len() {
                let (nx, ny) = (NodeId::new(x), NodeId::new(y));
                if edges.contains(&(x, y)) {
                    prop_assert!(outcome.graph.is_adjacent(nx, ny));
                } else {
                    prop_assert!(!outcome.graph.is_adjacent(nx, ny));
                    let record = outcome.sepsets.get(nx, ny).unwrap();
                    prop_assert!(oracle.is_d_separated(nx, ny, &record.set));
                }
            }
        }
    }

    #[test]
    fn prop_orientations_agree_with_the_dag(mask in prop::collection::vec(any::<bool>(), 10)) {
        let (oracle, edges) = dag_from_mask(&mask);
        let outcome = CpcSearch::new(&oracle).search().unwrap();
        for key in outcome.graph.edges() {
            let (lo, hi) = (key.lo(), key.hi());
            // Every DAG edge points up, so no output edge may point down.
            prop_assert!(!outcome.graph.is_directed(hi, lo), "{} --> {} in {:?}", hi, lo, edges);
        }
        prop_assert_eq!(outcome.orientation.collider_conflicts, 0);
    }

    #[test]
    fn prop_parallel_matches_sequential(mask in prop::collection::vec(any::<bool>(), 10)) {
        let (oracle, _) = dag_from_mask(&mask);
        let serial = CpcSearch::new(&oracle).with_config(SearchConfig { parallel: false, ..SearchConfig::default() }).search().unwrap();
        let parallel = CpcSearch::new(&oracle).search().unwrap();
        prop_assert_eq!(serial.to_json().unwrap(), parallel.to_json().unwrap());
    }
}
