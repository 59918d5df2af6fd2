// WGS-84
const EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const ECCENTRICITY_SQ: f64 = 0.00669437999014;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for GroundStation {
    /// Melbourne, Australia
    fn default() -> Self {
        Self {
            latitude_deg: -37.8136,
            longitude_deg: 144.9631,
            altitude_m: 0.0,
        }
    }
}

impl GroundStation {
    /// Parse `"lat, lon"` in signed decimal degrees or with hemisphere
    /// suffixes, e.g. `"37.8136 S, 144.9631 E"`.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat = parse_angle(parts[0], 'N', 'S')?;
        let lon = parse_angle(parts[1], 'E', 'W')?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = EQUATORIAL_RADIUS_KM / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - ECCENTRICITY_SQ) + alt_km) * sin_lat,
        ]
    }
}

fn parse_angle(s: &str, positive: char, negative: char) -> Option<f64> {
    let upper = s.to_ascii_uppercase();
    if let Some(value) = upper.strip_suffix(positive) {
        value.trim().parse::<f64>().ok().filter(|v| *v >= 0.0)
    } else if let Some(value) = upper.strip_suffix(negative) {
        value.trim().parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| -v)
    } else {
        upper.parse().ok()
    }
}
