//! Lane-parallel and scalar neighbor-degree reductions must agree.

use features::stats::{lane_reduce, scalar_reduce, NeighborDegreeStats};
use proptest::prelude::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
}

fn assert_close(lane: NeighborDegreeStats, scalar: NeighborDegreeStats) -> Result<(), TestCaseError> {
    prop_assert!(close(lane.mean, scalar.mean), "mean {} vs {}", lane.mean, scalar.mean);
    prop_assert!(close(lane.stddev, scalar.stddev), "stddev {} vs {}", lane.stddev, scalar.stddev);
    prop_assert_eq!(lane.max, scalar.max);
    prop_assert_eq!(lane.min, scalar.min);
    Ok(())
}

fn degrees() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec((0u32..5_000).prop_map(|d| d as f32), 0..300)
}

proptest! {
    #[test]
    fn prop_lane_widths_match_scalar(values in degrees()) {
        let scalar = scalar_reduce(&values);
        assert_close(lane_reduce::<1>(&values), scalar)?;
        assert_close(lane_reduce::<4>(&values), scalar)?;
        assert_close(lane_reduce::<8>(&values), scalar)?;
        assert_close(lane_reduce::<16>(&values), scalar)?;
    }

    #[test]
    fn prop_stats_are_bounded(values in degrees()) {
        let stats = lane_reduce::<8>(&values);
        if values.is_empty() {
            prop_assert_eq!(stats, NeighborDegreeStats::default());
        } else {
            prop_assert!(stats.min <= stats.mean + 1e-3);
            prop_assert!(stats.mean <= stats.max + 1e-3);
            prop_assert!(stats.stddev >= 0.0);
            prop_assert!(stats.stddev <= (stats.max - stats.min) + 1e-3);
        }
    }
}
