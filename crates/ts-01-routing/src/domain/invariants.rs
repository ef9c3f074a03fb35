//! # Domain Invariants
//!
//! Rules a cluster topology must satisfy before it is frozen.

use super::entities::Region;
use super::errors::TopologyError;

/// Invariant: regions partition `[0, capacity)` exactly.
///
/// `regions` must be sorted by start. The first region starts at 0, every
/// range is non-empty, and each region starts where the previous one ended,
/// so ranges neither overlap nor leave gaps. Every region also needs at
/// least one master, and every configured slave list at least one endpoint.
pub fn invariant_regions_partition(cluster: &str, regions: &[Region]) -> Result<(), TopologyError> {
    if regions.is_empty() {
        return Err(TopologyError::NoRegions(cluster.to_string()));
    }

    let mut expected = 0u64;
    for (index, region) in regions.iter().enumerate() {
        if region.start != expected {
            return Err(TopologyError::RegionGap {
                cluster: cluster.to_string(),
                index,
                expected,
                found: region.start,
            });
        }
        if region.end <= region.start {
            return Err(TopologyError::EmptyRange {
                cluster: cluster.to_string(),
                index,
                start: region.start,
                end: region.end,
            });
        }
        if region.masters.is_empty() {
            return Err(TopologyError::NoMasters {
                cluster: cluster.to_string(),
                index,
            });
        }
        if let Some(slave) = region.slaves.iter().position(|list| list.is_empty()) {
            return Err(TopologyError::EmptySlaveList {
                cluster: cluster.to_string(),
                index,
                slave,
            });
        }
        expected = region.end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DbEndpoint;
    use std::sync::Arc;

    fn region(start: u64, end: u64) -> Region {
        Region::new(start, end, vec![DbEndpoint::new("db", "mem://db", "db")])
    }

    #[test]
    fn test_valid_partition() {
        assert!(invariant_regions_partition("c1", &[region(0, 50), region(50, 100)]).is_ok());
    }

    #[test]
    fn test_first_region_must_start_at_zero() {
        let err = invariant_regions_partition("c1", &[region(10, 50)]).unwrap_err();
        assert!(matches!(err, TopologyError::RegionGap { expected: 0, found: 10, .. }));
    }

    #[test]
    fn test_gap_rejected() {
        let err = invariant_regions_partition("c1", &[region(0, 50), region(60, 100)]).unwrap_err();
        assert!(matches!(err, TopologyError::RegionGap { index: 1, .. }));
    }

    #[test]
    fn test_overlap_rejected() {
        let err = invariant_regions_partition("c1", &[region(0, 50), region(40, 100)]).unwrap_err();
        assert!(matches!(err, TopologyError::RegionGap { expected: 50, found: 40, .. }));
    }

    #[test]
    fn test_empty_range_rejected() {
        let err = invariant_regions_partition("c1", &[region(0, 0)]).unwrap_err();
        assert!(matches!(err, TopologyError::EmptyRange { .. }));
    }

    #[test]
    fn test_no_regions_rejected() {
        assert_eq!(
            invariant_regions_partition("c1", &[]),
            Err(TopologyError::NoRegions("c1".to_string()))
        );
    }

    #[test]
    fn test_region_without_masters_rejected() {
        let err = invariant_regions_partition("c1", &[Region::new(0, 10, vec![])]).unwrap_err();
        assert!(matches!(err, TopologyError::NoMasters { index: 0, .. }));
    }

    #[test]
    fn test_empty_slave_list_rejected() {
        let r = region(0, 10).with_slaves(Vec::<Arc<DbEndpoint>>::new());
        let err = invariant_regions_partition("c1", &[r]).unwrap_err();
        assert!(matches!(err, TopologyError::EmptySlaveList { slave: 0, .. }));
    }
}
