use crate::models::common::Distance;
use crate::utils::Float;

const EARTH_RADIUS_METERS: Float = 6_371_000.;

/// A geographic location in degrees. A location with non finite coordinates is treated as unknown:
/// traveling from or to it takes no time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Longitude in degrees.
    pub lon: Float,
    /// Latitude in degrees.
    pub lat: Float,
}

impl Location {
    /// Creates a new location.
    pub fn new(lon: Float, lat: Float) -> Self {
        Self { lon, lat }
    }

    /// Creates an unknown location.
    pub fn unknown() -> Self {
        Self { lon: Float::NAN, lat: Float::NAN }
    }

    /// Returns true if location has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180. ..=180.).contains(&self.lon)
            && (-90. ..=90.).contains(&self.lat)
    }

    /// Returns great circle distance to other location, zero if any of locations is unknown.
    pub fn haversine_distance(&self, other: &Location) -> Distance {
        if !self.is_valid() || !other.is_valid() {
            return 0.;
        }

        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.).sin().powi(2);

        2. * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::unknown()
    }
}
