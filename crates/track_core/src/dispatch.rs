//! Driver ranking for manual order assignment.
//!
//! The dispatcher sees every available driver ordered by great-circle
//! distance from the restaurant; drivers without a known position stay in the
//! list but sort last, in their original order.

use std::cmp::Ordering;

use crate::geo::{distance_km, GeoPoint};

/// One available driver as returned by the driver directory, annotated with
/// the computed distance before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverCandidate {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub last_known_point: Option<GeoPoint>,
    /// `None` whenever the driver's position is unknown.
    pub distance_km: Option<f64>,
}

impl DriverCandidate {
    pub fn new(id: i64, name: impl Into<String>, phone: impl Into<String>, last_known_point: Option<GeoPoint>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            last_known_point,
            distance_km: None,
        }
    }
}

/// Rank candidates by ascending distance from `origin`.
///
/// Pure function over a snapshot: the input is not mutated, annotated copies
/// are returned. Unknown-position candidates get `distance_km = None` and are
/// placed after every known-distance candidate; the sort is stable, so their
/// relative order is preserved.
pub fn rank_drivers(origin: GeoPoint, candidates: &[DriverCandidate]) -> Vec<DriverCandidate> {
    let mut ranked: Vec<DriverCandidate> = candidates
        .iter()
        .cloned()
        .map(|mut candidate| {
            candidate.distance_km = candidate
                .last_known_point
                .map(|point| distance_km(origin, point));
            candidate
        })
        .collect();

    ranked.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("valid point")
    }

    fn candidate(id: i64, position: Option<GeoPoint>) -> DriverCandidate {
        DriverCandidate::new(id, format!("driver-{id}"), format!("+2126000000{id}"), position)
    }

    #[test]
    fn ranks_by_ascending_distance() {
        let origin = point(33.59, -7.61);
        // Offsets due north: ~3.4 km and ~1.2 km of latitude.
        let far = candidate(1, Some(point(33.59 + 3.4 / 111.19, -7.61)));
        let near = candidate(2, Some(point(33.59 + 1.2 / 111.19, -7.61)));
        let unknown = candidate(3, None);

        let ranked = rank_drivers(origin, &[far, near, unknown]);
        let ids: Vec<i64> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        let near_km = ranked[0].distance_km.expect("distance");
        let far_km = ranked[1].distance_km.expect("distance");
        assert!((near_km - 1.2).abs() < 0.05, "near: {near_km}");
        assert!((far_km - 3.4).abs() < 0.05, "far: {far_km}");
        assert_eq!(ranked[2].distance_km, None);
    }

    #[test]
    fn preserves_the_candidate_multiset() {
        let origin = point(33.59, -7.61);
        let input = vec![
            candidate(1, Some(point(33.60, -7.60))),
            candidate(2, None),
            candidate(3, Some(point(33.58, -7.62))),
        ];
        let ranked = rank_drivers(origin, &input);
        assert_eq!(ranked.len(), input.len());
        let mut input_ids: Vec<i64> = input.iter().map(|c| c.id).collect();
        let mut ranked_ids: Vec<i64> = ranked.iter().map(|c| c.id).collect();
        input_ids.sort();
        ranked_ids.sort();
        assert_eq!(input_ids, ranked_ids);
    }

    #[test]
    fn unknown_positions_sort_last_in_original_order() {
        let origin = point(33.59, -7.61);
        let input = vec![
            candidate(10, None),
            candidate(11, Some(point(33.70, -7.61))),
            candidate(12, None),
            candidate(13, None),
        ];
        let ranked = rank_drivers(origin, &input);
        let ids: Vec<i64> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![11, 10, 12, 13]);
    }

    #[test]
    fn known_distances_are_non_decreasing() {
        let origin = point(33.59, -7.61);
        let input = vec![
            candidate(1, Some(point(33.64, -7.55))),
            candidate(2, Some(point(33.59, -7.62))),
            candidate(3, Some(point(33.80, -7.40))),
            candidate(4, Some(point(33.60, -7.61))),
        ];
        let ranked = rank_drivers(origin, &input);
        let distances: Vec<f64> = ranked
            .iter()
            .filter_map(|c| c.distance_km)
            .collect();
        assert_eq!(distances.len(), input.len());
        for pair in distances.windows(2) {
            assert!(pair[0] <= pair[1], "distances out of order: {distances:?}");
        }
    }

    #[test]
    fn input_snapshot_is_left_untouched() {
        let origin = point(33.59, -7.61);
        let input = vec![candidate(1, Some(point(33.60, -7.60)))];
        let _ = rank_drivers(origin, &input);
        assert_eq!(input[0].distance_km, None);
    }
}
