use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::tle_loader::TleEntry;
use crate::predict::GroundStation;

/// Topocentric position of a satellite seen from a ground station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// Computes elevation angles of a satellite over a set of instants.
///
/// Implementations must be deterministic: the same elements, station and
/// instants always produce the same series.
pub trait OrbitPropagator<E> {
    fn elevations(
        &self,
        elements: &E,
        station: &GroundStation,
        instants: &[DateTime<Utc>],
    ) -> Result<Vec<f64>, PredictError>;
}

/// SGP4/SDP4 propagation of TLE entries
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl OrbitPropagator<TleEntry> for Sgp4Propagator {
    fn elevations(
        &self,
        entry: &TleEntry,
        station: &GroundStation,
        instants: &[DateTime<Utc>],
    ) -> Result<Vec<f64>, PredictError> {
        instants
            .iter()
            .map(|t| look_angles(station, entry, *t).map(|a| a.elevation_deg))
            .collect()
    }
}

pub fn look_angles(
    station: &GroundStation,
    entry: &TleEntry,
    timestamp: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let minutes = entry
        .elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = entry
        .constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    let sat_ecef = teme_to_ecef_position(prediction.position, sidereal);
    let sta_ecef = station.position_ecef_km();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    Ok(LookAngles {
        azimuth_deg,
        elevation_deg,
        range_km,
    })
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
