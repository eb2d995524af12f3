use serde::{Deserialize, Serialize};

/// Sphere radius of the Web Mercator projection, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection, in degrees.
pub const MAX_LAT: f64 = 85.051_128_78;

/// Geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and inside the usual degree ranges.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Project onto the spherical Web Mercator plane.
    pub fn to_east_north(self) -> EastNorth {
        let lat = self.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
        let east = EARTH_RADIUS * self.lon.to_radians();
        let north = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        EastNorth::new(east, north)
    }

    /// Great circle distance in metres (haversine).
    pub fn greatcircle_distance(self, other: LatLon) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS * a.sqrt().min(1.0).asin()
    }
}

/// Coordinate on the projected plane, in metres.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct EastNorth {
    /// Easting.
    pub east: f64,
    /// Northing.
    pub north: f64,
}

impl EastNorth {
    /// Create a projected coordinate.
    pub const fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }

    /// Inverse of [`LatLon::to_east_north`].
    pub fn to_lat_lon(self) -> LatLon {
        let lon = (self.east / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (self.north / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        LatLon::new(lat, lon)
    }

    /// Componentwise sum.
    pub fn add(self, de: f64, dn: f64) -> Self {
        Self::new(self.east + de, self.north + dn)
    }

    /// Euclidean distance on the plane.
    pub fn distance(self, other: EastNorth) -> f64 {
        (other.east - self.east).hypot(other.north - self.north)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/coor.rs"]
mod tests;
