//! Route request and decoded route entities

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::Coordinate;

/// A request for a driving route between two known coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Where the route starts (the user's location)
    pub origin: Coordinate,
    /// Where the route ends
    pub destination: Coordinate,
}

impl RouteRequest {
    /// Create a request from two known coordinates
    #[must_use]
    pub const fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Build a request from possibly-unknown endpoints
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IncompleteRouteRequest` naming the first missing side.
    pub fn try_new(
        origin: Option<Coordinate>,
        destination: Option<Coordinate>,
    ) -> Result<Self, DomainError> {
        let origin = origin.ok_or(DomainError::IncompleteRouteRequest { missing: "origin" })?;
        let destination = destination.ok_or(DomainError::IncompleteRouteRequest {
            missing: "destination",
        })?;
        Ok(Self::new(origin, destination))
    }

    /// Key with both endpoints quantized to 1e-5 degrees (about 1 m)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // valid coordinates scaled by 1e5 fit in i64
    pub fn quantized(&self) -> [i64; 4] {
        let q = |v: f64| (v * 1e5).round() as i64;
        [
            q(self.origin.latitude()),
            q(self.origin.longitude()),
            q(self.destination.latitude()),
            q(self.destination.longitude()),
        ]
    }
}

/// A decoded, renderable route
///
/// Routes are replaced wholesale; there is no API to mutate the points of an
/// existing route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    /// Create a route from an ordered point sequence
    #[must_use]
    pub const fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Concatenate per-step point sequences into one route
    ///
    /// When a step starts exactly where the previous one ended, the shared
    /// point is kept once.
    #[must_use]
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Vec<Coordinate>>,
    {
        let mut points: Vec<Coordinate> = Vec::new();
        for segment in segments {
            let mut iter = segment.into_iter().peekable();
            if points.last().is_some_and(|last| iter.peek() == Some(last)) {
                iter.next();
            }
            points.extend(iter);
        }
        Self { points }
    }

    /// The ordered point sequence
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// First point of the route
    #[must_use]
    pub fn first(&self) -> Option<&Coordinate> {
        self.points.first()
    }

    /// Last point of the route
    #[must_use]
    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    /// Number of points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the route has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of the great-circle lengths of all segments, in meters
    #[must_use]
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_m(&pair[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid")
    }

    #[test]
    fn try_new_requires_both_sides() {
        let a = c(19.0, -99.0);
        assert!(RouteRequest::try_new(Some(a), Some(a)).is_ok());
        assert_eq!(
            RouteRequest::try_new(None, Some(a)),
            Err(DomainError::IncompleteRouteRequest { missing: "origin" })
        );
        assert_eq!(
            RouteRequest::try_new(Some(a), None),
            Err(DomainError::IncompleteRouteRequest {
                missing: "destination"
            })
        );
    }

    #[test]
    fn quantized_ignores_sub_meter_noise() {
        let a = RouteRequest::new(c(19.432_600_1, -99.133_2), c(20.0, -101.0));
        let b = RouteRequest::new(c(19.432_600_4, -99.133_2), c(20.0, -101.0));
        assert_eq!(a.quantized(), b.quantized());

        let moved = RouteRequest::new(c(19.4327, -99.1332), c(20.0, -101.0));
        assert_ne!(a.quantized(), moved.quantized());
    }

    #[test]
    fn from_segments_drops_shared_joints() {
        let route = Route::from_segments(vec![
            vec![c(1.0, 1.0), c(1.0, 2.0)],
            vec![c(1.0, 2.0), c(1.0, 3.0)],
            vec![c(2.0, 3.0)],
        ]);
        assert_eq!(
            route.points(),
            &[c(1.0, 1.0), c(1.0, 2.0), c(1.0, 3.0), c(2.0, 3.0)]
        );
    }

    #[test]
    fn from_segments_skips_empty_segments() {
        let route = Route::from_segments(vec![vec![], vec![c(1.0, 1.0)], vec![]]);
        assert_eq!(route.len(), 1);
        assert_eq!(route.first(), route.last());
    }

    #[test]
    fn empty_route() {
        let route = Route::default();
        assert!(route.is_empty());
        assert!(route.first().is_none());
        assert!(route.length_m().abs() < f64::EPSILON);
    }

    #[test]
    fn length_sums_segments() {
        let route = Route::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(0.0, 2.0)]);
        let one_degree = c(0.0, 0.0).distance_m(&c(0.0, 1.0));
        assert!((route.length_m() - 2.0 * one_degree).abs() < 1e-6);
    }
}
