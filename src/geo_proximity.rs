//! Geodesic proximity matching between two sets of located stations
//!
//! Distances are computed on the WGS84 ellipsoid (Karney's geodesic), which
//! stays accurate at the high latitudes the road network reaches. Matching is
//! a plain O(origins × destinations) scan, fine at station-count scale.

use crate::constants::PROXIMITY_RADIUS_M;
use crate::error::{LabelerError, Result};
use crate::models::GeoPoint;
use geo::{Distance, Geodesic, Point};

/// Geodesic distance in metres between two points
pub fn geodesic_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    Geodesic::distance(to_point(a), to_point(b))
}

fn to_point(location: GeoPoint) -> Point<f64> {
    Point::new(location.longitude, location.latitude)
}

/// Finds destinations within a fixed radius of each origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoProximityMatcher {
    radius_m: f64,
}

impl Default for GeoProximityMatcher {
    fn default() -> Self {
        Self::new(PROXIMITY_RADIUS_M)
    }
}

impl GeoProximityMatcher {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Whether `b` lies within the radius of `a`; the boundary is inclusive
    pub fn is_within(&self, a: GeoPoint, b: GeoPoint) -> bool {
        geodesic_distance_m(a, b) <= self.radius_m
    }

    /// Ids of the destinations within the radius of `origin`, in destination order
    ///
    /// # Errors
    /// * `Validation` if `destinations` and `ids` differ in length
    pub fn within_radius<I: Clone>(
        &self,
        origin: GeoPoint,
        destinations: &[GeoPoint],
        ids: &[I],
    ) -> Result<Vec<I>> {
        check_parallel(destinations, ids)?;
        Ok(self.collect_within(origin, destinations, ids))
    }

    /// For every origin, the ids of the destinations within the radius
    ///
    /// The result is aligned with `origins`. Matching is directional: swap the
    /// sets to answer the reverse question.
    pub fn nearby<I: Clone>(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        ids: &[I],
    ) -> Result<Vec<Vec<I>>> {
        check_parallel(destinations, ids)?;
        Ok(origins
            .iter()
            .map(|origin| self.collect_within(*origin, destinations, ids))
            .collect())
    }

    fn collect_within<I: Clone>(&self, origin: GeoPoint, destinations: &[GeoPoint], ids: &[I]) -> Vec<I> {
        destinations
            .iter()
            .zip(ids)
            .filter(|(destination, _)| self.is_within(origin, **destination))
            .map(|(_, id)| id.clone())
            .collect()
    }
}

fn check_parallel<I>(destinations: &[GeoPoint], ids: &[I]) -> Result<()> {
    if destinations.len() != ids.len() {
        return Err(LabelerError::validation(format!(
            "{} destination points but {} destination ids",
            destinations.len(),
            ids.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Destination;

    fn offset(origin: GeoPoint, bearing: f64, metres: f64) -> GeoPoint {
        let moved = Geodesic::destination(to_point(origin), bearing, metres);
        GeoPoint::new(moved.y(), moved.x())
    }

    #[test]
    fn test_distance_is_symmetric() {
        let helsinki = GeoPoint::new(60.1699, 24.9384);
        let oulu = GeoPoint::new(65.0121, 25.4651);
        let forward = geodesic_distance_m(helsinki, oulu);
        let backward = geodesic_distance_m(oulu, helsinki);
        assert!((forward - backward).abs() < 1e-6);
        assert!(forward > 500_000.0 && forward < 560_000.0);
    }

    #[test]
    fn test_radius_boundary_at_any_latitude() {
        let matcher = GeoProximityMatcher::default();
        for latitude in [0.0, 45.0, 60.0, 68.5, 80.0] {
            let origin = GeoPoint::new(latitude, 25.0);
            for bearing in [0.0, 90.0, 225.0] {
                let inside = offset(origin, bearing, 199.0);
                let outside = offset(origin, bearing, 201.0);
                assert!(
                    matcher.is_within(origin, inside),
                    "199 m at lat {} bearing {}",
                    latitude,
                    bearing
                );
                assert!(
                    !matcher.is_within(origin, outside),
                    "201 m at lat {} bearing {}",
                    latitude,
                    bearing
                );
            }
        }
    }

    #[test]
    fn test_degree_offsets_are_not_treated_as_flat() {
        // 0.004 degrees of longitude is ~445 m at the equator but ~150 m at 70N
        let matcher = GeoProximityMatcher::default();
        let equator = GeoPoint::new(0.0, 25.0);
        let arctic = GeoPoint::new(70.0, 25.0);
        assert!(!matcher.is_within(equator, GeoPoint::new(0.0, 25.004)));
        assert!(matcher.is_within(arctic, GeoPoint::new(70.0, 25.004)));
    }

    #[test]
    fn test_nearby_is_aligned_with_origins() {
        let matcher = GeoProximityMatcher::default();
        let a = GeoPoint::new(61.0, 24.0);
        let b = GeoPoint::new(62.0, 24.0);
        let destinations = vec![offset(a, 10.0, 50.0), offset(b, 0.0, 150.0), offset(a, 90.0, 500.0)];
        let ids = vec!["near-a", "near-b", "far"];

        let result = matcher.nearby(&[a, b], &destinations, &ids).unwrap();
        assert_eq!(result, vec![vec!["near-a"], vec!["near-b"]]);

        let empty = matcher.nearby(&[], &destinations, &ids).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_mismatched_ids_are_rejected() {
        let matcher = GeoProximityMatcher::default();
        let point = GeoPoint::new(60.0, 25.0);
        let result = matcher.within_radius(point, &[point, point], &[1]);
        assert!(matches!(result, Err(LabelerError::Validation { .. })));
    }
}
