//! Distance and area measurement on a spherical Earth.

use crate::core::geo::LatLng;
use geo::{ChamberlainDuquetteArea, HaversineLength};
use geo_types::{Coord, LineString, Polygon};
use std::fmt;

const KILOMETRE: f64 = 1_000.0;
const SQUARE_KILOMETRE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureTool {
    /// Length of a path
    Distance,
    /// Area enclosed by a ring
    Area,
}

impl MeasureTool {
    /// Points needed before the tool yields a measurement.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Distance => 2,
            Self::Area => 3,
        }
    }

    /// Measures `points`, or `None` if there are too few of them.
    pub fn measure(&self, points: &[LatLng]) -> Option<Measurement> {
        match self {
            Self::Distance => Measurement::distance(points),
            Self::Area => Measurement::area(points),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub tool: MeasureTool,
    /// Value in `unit`
    pub value: f64,
    pub unit: &'static str,
}

impl Measurement {
    /// Haversine length of the path through `points`.
    pub fn distance(points: &[LatLng]) -> Option<Self> {
        if points.len() < MeasureTool::Distance.min_points() {
            return None;
        }
        let metres = line(points).haversine_length();
        let (value, unit) = if metres >= KILOMETRE {
            (metres / KILOMETRE, "km")
        } else {
            (metres, "m")
        };
        Some(Self {
            tool: MeasureTool::Distance,
            value,
            unit,
        })
    }

    /// Spherical area of the ring through `points`. The ring is closed
    /// implicitly.
    pub fn area(points: &[LatLng]) -> Option<Self> {
        if points.len() < MeasureTool::Area.min_points() {
            return None;
        }
        let square_metres = Polygon::new(line(points), Vec::new()).chamberlain_duquette_unsigned_area();
        let (value, unit) = if square_metres >= SQUARE_KILOMETRE {
            (square_metres / SQUARE_KILOMETRE, "km²")
        } else {
            (square_metres, "m²")
        };
        Some(Self {
            tool: MeasureTool::Area,
            value,
            unit,
        })
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

fn line(points: &[LatLng]) -> LineString<f64> {
    points
        .iter()
        .map(|p| p.to_coord())
        .collect::<Vec<Coord<f64>>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_points() {
        assert!(Measurement::distance(&[LatLng::new(19.0, 72.8)]).is_none());
        assert!(MeasureTool::Area
            .measure(&[LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)])
            .is_none());
    }

    #[test]
    fn test_short_distance_in_metres() {
        // 0.001 degree of latitude is about 111 m
        let m = Measurement::distance(&[LatLng::new(19.0, 72.8), LatLng::new(19.001, 72.8)]).unwrap();
        assert_eq!(m.unit, "m");
        assert!((m.value - 111.3).abs() < 1.0, "{}", m);
    }

    #[test]
    fn test_long_distance_in_kilometres() {
        let m = MeasureTool::Distance
            .measure(&[
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 1.0),
                LatLng::new(0.0, 2.0),
            ])
            .unwrap();
        assert_eq!(m.tool, MeasureTool::Distance);
        assert_eq!(m.unit, "km");
        assert!((m.value - 222.4).abs() < 1.0, "{}", m);
    }

    #[test]
    fn test_area_units() {
        // 0.001 degree square at the equator is about 12 400 m²
        let small = Measurement::area(&[
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 0.001),
            LatLng::new(0.001, 0.001),
            LatLng::new(0.001, 0.0),
        ])
        .unwrap();
        assert_eq!(small.unit, "m²");
        assert!((small.value - 12_400.0).abs() < 200.0, "{}", small);

        let large = Measurement::area(&[
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(large.unit, "km²");
        assert!((large.value - 12_400.0).abs() < 200.0, "{}", large);
    }

    #[test]
    fn test_display() {
        let m = Measurement {
            tool: MeasureTool::Area,
            value: 1.234,
            unit: "km²",
        };
        assert_eq!(m.to_string(), "1.23 km²");
    }
}
