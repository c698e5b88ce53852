//! Coordinates and great-circle distance.

use std::fmt;

use snafu::{Snafu, ensure};

/// Mean Earth radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const KM_TO_MILES: f64 = 0.621371;
pub const KM_TO_NAUTICAL_MILES: f64 = 0.539957;

const CLOSE_KM: f64 = 100.0;
const FAR_KM: f64 = 10_000.0;

#[derive(Debug, Snafu)]
pub enum CoordinatesError {
    #[snafu(display("Latitude {value} out of range, must be between -90 and 90"))]
    LatitudeOutOfRange { value: f64 },
    #[snafu(display("Longitude {value} out of range, must be between -180 and 180"))]
    LongitudeOutOfRange { value: f64 },
}

/// A validated latitude/longitude pair in decimal degrees.
#[cfg_attr(feature = "bincode", derive(::bincode::Encode, ::bincode::Decode))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        ensure!(
            (-90.0..=90.0).contains(&latitude),
            LatitudeOutOfRangeSnafu { value: latitude }
        );
        ensure!(
            (-180.0..=180.0).contains(&longitude),
            LongitudeOutOfRangeSnafu { value: longitude }
        );
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(self) -> f64 {
        self.latitude
    }

    pub fn longitude(self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two points, in kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceNote {
    Close,
    OppositeSides,
}

/// Distance between two named places, with the unit conversions shown to
/// the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceReport {
    pub from: String,
    pub to: String,
    pub km: f64,
}

impl DistanceReport {
    pub fn new(from: impl Into<String>, to: impl Into<String>, km: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            km,
        }
    }

    pub fn between(
        from: impl Into<String>,
        a: Coordinates,
        to: impl Into<String>,
        b: Coordinates,
    ) -> Self {
        Self::new(from, to, haversine_km(a, b))
    }

    pub fn miles(&self) -> f64 {
        self.km * KM_TO_MILES
    }

    pub fn nautical_miles(&self) -> f64 {
        self.km * KM_TO_NAUTICAL_MILES
    }

    pub fn note(&self) -> Option<DistanceNote> {
        if self.km < CLOSE_KM {
            Some(DistanceNote::Close)
        } else if FAR_KM < self.km {
            Some(DistanceNote::OppositeSides)
        } else {
            None
        }
    }
}

impl fmt::Display for DistanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distance between {} and {}:", self.from, self.to)?;
        writeln!(f, "  {:.2} kilometers", self.km)?;
        writeln!(f, "  {:.2} miles", self.miles())?;
        write!(f, "  {:.2} nautical miles", self.nautical_miles())?;
        match self.note() {
            Some(DistanceNote::Close) => write!(
                f,
                "\n\nNote: These cities are relatively close ({:.1} km apart)",
                self.km
            ),
            Some(DistanceNote::OppositeSides) => write!(
                f,
                "\n\nNote: These cities are on opposite sides of the world ({:.1} km apart)",
                self.km
            ),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            Coordinates::new(90.5, 0.0),
            Err(CoordinatesError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.01),
            Err(CoordinatesError::LongitudeOutOfRange { .. })
        ));
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn london_paris() {
        let km = haversine_km(c(51.5074, -0.1278), c(48.8566, 2.3522));
        assert!((km - 343.5).abs() < 1.0, "{km}");
    }

    #[test]
    fn same_point_is_zero() {
        let p = c(35.6762, 139.6503);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn symmetric() {
        let a = c(40.7128, -74.0060);
        let b = c(-33.8688, 151.2093);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn notes() {
        assert_eq!(
            DistanceReport::new("a", "b", 12.0).note(),
            Some(DistanceNote::Close)
        );
        assert_eq!(DistanceReport::new("a", "b", 5000.0).note(), None);
        let far = DistanceReport::between(
            "New York",
            c(40.7128, -74.0060),
            "Sydney",
            c(-33.8688, 151.2093),
        );
        assert_eq!(far.note(), Some(DistanceNote::OppositeSides));
        assert!(far.to_string().contains("opposite sides of the world"));
    }

    #[test]
    fn display_conversions() {
        let report = DistanceReport::new("A", "B", 1000.0);
        let s = report.to_string();
        assert!(s.contains("1000.00 kilometers"));
        assert!(s.contains("621.37 miles"));
        assert!(s.contains("539.96 nautical miles"));
        assert!(!s.contains("Note"));
    }
}
