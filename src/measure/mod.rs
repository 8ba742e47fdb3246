//! Distance measurement core
//!
//! Everything the map widget needs that does not touch the UI lives here, so it
//! can be driven and tested without a window:
//!
//! - **[`GeoPoint`]**: a validated WGS84 coordinate
//! - **[`distance`]**: haversine distance and display formatting
//! - **[`Selection`]**: the Source -> Destination -> restart click cycle
//! - **[`RouteOverlayManager`]**: the single route overlay and its measurement
//! - **[`routing`]**: the OSRM client and the request dispatcher
//! - **[`MeasureSession`]**: the widget controller tying the above together

pub mod distance;
mod overlay;
pub mod routing;
mod selection;
mod session;

pub use distance::{fmt_coords, fmt_km, great_circle_distance_km, midpoint};
pub use overlay::{
    Measurement, RouteCompletion, RouteMode, RouteOverlay, RouteOverlayManager, RouteRequest,
    RouteStatus,
};
pub use routing::{OsrmRouter, RouteAlternative, RouteDispatcher, RoutingError, RoutingService};
pub use selection::Selection;
pub use session::{MeasurePopup, MeasureSession};

/// Error types for coordinate handling
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeasureError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    InvalidLatitude(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    InvalidLongitude(f64),
}

pub type Result<T> = std::result::Result<T, MeasureError>;

/// A geographic coordinate in degrees (WGS84)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point from map input.
    ///
    /// Latitude is clamped to the poles and longitude is wrapped into
    /// [-180, 180], since a panned map can report clicks past the antimeridian.
    pub fn new(lat: f64, lon: f64) -> Self {
        let lat = lat.clamp(-90.0, 90.0);
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        Self { lat, lon }
    }

    /// Create a point, rejecting out-of-range or non-finite values
    pub fn try_new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(MeasureError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(MeasureError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Position on the walkers map (x = longitude, y = latitude)
    pub fn to_position(self) -> walkers::Position {
        walkers::lat_lon(self.lat, self.lon)
    }

    pub fn from_position(position: walkers::Position) -> Self {
        Self::new(position.y(), position.x())
    }

    /// Coordinate for `geo` geometries (x = longitude, y = latitude)
    pub fn to_coord(self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    pub fn from_coord(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}
