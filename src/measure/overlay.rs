//! Route overlay management
//!
//! The [`RouteOverlayManager`] owns the single overlay attached to the map and
//! the measurement derived from it. It is re-synchronised explicitly after
//! every selection or mode change:
//!
//! - straight-line mode attaches a straight segment and measures it right away
//! - road mode issues a [`RouteRequest`] that the caller dispatches to the
//!   routing service, and the matching [`RouteCompletion`] attaches the road
//!   path later
//!
//! Every request carries a generation number. A completion is only applied
//! while its request is still the pending one, so a late response for an old
//! selection or mode is dropped instead of overwriting newer state.

use super::distance::{great_circle_distance_km, lon_near};
use super::routing::{RouteAlternative, RoutingError};
use super::{GeoPoint, Selection};
use geo::{BoundingRect, LineString};

/// How the distance between the two points is obtained
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteMode {
    /// Great-circle distance, no network involved
    #[default]
    StraightLine,
    /// Road-network distance from the routing service
    Road,
}

impl RouteMode {
    pub fn from_road_toggle(use_road_route: bool) -> Self {
        if use_road_route {
            Self::Road
        } else {
            Self::StraightLine
        }
    }

    pub fn is_road(self) -> bool {
        self == Self::Road
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StraightLine => "Straight line",
            Self::Road => "Road route",
        }
    }
}

/// A measured distance and what it was computed from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub km: f64,
    pub mode: RouteMode,
    pub source: GeoPoint,
    pub destination: GeoPoint,
}

/// The route representation attached to the map
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOverlay {
    pub mode: RouteMode,
    /// Path in (x = longitude, y = latitude)
    pub path: LineString<f64>,
}

impl RouteOverlay {
    /// Segment along the shorter longitude arc. The destination vertex may lie
    /// past ±180° so the line crosses the antimeridian instead of the globe.
    pub fn straight(source: GeoPoint, destination: GeoPoint) -> Self {
        let end = geo::Coord {
            x: lon_near(source.lon(), destination.lon()),
            y: destination.lat(),
        };
        Self {
            mode: RouteMode::StraightLine,
            path: LineString::new(vec![source.to_coord(), end]),
        }
    }

    pub fn road(path: LineString<f64>) -> Self {
        Self {
            mode: RouteMode::Road,
            path,
        }
    }

    /// Map positions of the path vertices, without longitude wrapping
    pub fn positions(&self) -> impl Iterator<Item = walkers::Position> + '_ {
        self.path.coords().map(|c| walkers::lat_lon(c.y, c.x))
    }

    /// South-west and north-east corners of the path
    pub fn bounds(&self) -> Option<(GeoPoint, GeoPoint)> {
        self.path.bounding_rect().map(|rect| {
            (
                GeoPoint::from_coord(rect.min()),
                GeoPoint::from_coord(rect.max()),
            )
        })
    }
}

/// A road-route request, tagged with the state it was issued for
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteRequest {
    generation: u64,
    pub source: GeoPoint,
    pub destination: GeoPoint,
}

impl RouteRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The routing service's answer to a [`RouteRequest`]
#[derive(Debug)]
pub struct RouteCompletion {
    pub request: RouteRequest,
    pub result: Result<Vec<RouteAlternative>, RoutingError>,
}

/// Progress of the current road-route request
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RouteStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    /// The last request failed or found no route
    Unavailable(String),
}

/// Owner of the map's route overlay and the current measurement
#[derive(Debug, Default)]
pub struct RouteOverlayManager {
    overlay: Option<RouteOverlay>,
    measurement: Option<Measurement>,
    status: RouteStatus,
    pending: Option<RouteRequest>,
    generation: u64,
}

impl RouteOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the overlay in line with `selection` and `mode`.
    ///
    /// Returns the road-route request to dispatch, if one is needed.
    pub fn sync(&mut self, selection: &Selection, mode: RouteMode) -> Option<RouteRequest> {
        profiling::scope!("RouteOverlayManager::sync");

        self.invalidate();
        self.release();
        self.measurement = None;
        self.status = RouteStatus::Idle;

        let (source, destination) = selection.pair()?;

        match mode {
            RouteMode::StraightLine => {
                self.attach(RouteOverlay::straight(source, destination));
                self.measurement = Some(Measurement {
                    km: great_circle_distance_km(source, destination),
                    mode,
                    source,
                    destination,
                });
                self.status = RouteStatus::Ready;
                None
            }
            RouteMode::Road => {
                let request = RouteRequest {
                    generation: self.generation,
                    source,
                    destination,
                };
                tracing::debug!(
                    generation = request.generation,
                    "Requesting road route ({:.5}, {:.5}) -> ({:.5}, {:.5})",
                    source.lat(),
                    source.lon(),
                    destination.lat(),
                    destination.lon()
                );
                self.pending = Some(request);
                self.status = RouteStatus::Pending;
                Some(request)
            }
        }
    }

    /// Apply a routing completion. Returns `false` when it was stale and dropped.
    pub fn complete(&mut self, completion: RouteCompletion) -> bool {
        let RouteCompletion { request, result } = completion;

        if self.pending != Some(request) {
            tracing::debug!(
                generation = request.generation,
                current = self.generation,
                "Discarding stale route response"
            );
            return false;
        }
        self.pending = None;

        let first = result.and_then(|routes| {
            routes
                .into_iter()
                .next()
                .ok_or(RoutingError::NoRoute)
        });

        match first {
            Ok(route) => {
                let km = route.distance_m / 1000.0;
                tracing::info!("Road route found: {km:.3} km");
                self.attach(RouteOverlay::road(route.geometry));
                self.measurement = Some(Measurement {
                    km,
                    mode: RouteMode::Road,
                    source: request.source,
                    destination: request.destination,
                });
                self.status = RouteStatus::Ready;
            }
            Err(e) => {
                tracing::warn!("Road route unavailable: {e}");
                self.release();
                self.measurement = None;
                self.status = RouteStatus::Unavailable(e.to_string());
            }
        }
        true
    }

    /// Drop the overlay, the measurement and any pending request
    pub fn reset(&mut self) {
        self.invalidate();
        self.release();
        self.measurement = None;
        self.status = RouteStatus::Idle;
    }

    /// Forget the measurement without touching the overlay
    pub fn clear_measurement(&mut self) {
        self.measurement = None;
    }

    /// Detach the current overlay, if any
    pub fn release(&mut self) -> Option<RouteOverlay> {
        let released = self.overlay.take();
        if let Some(overlay) = &released {
            tracing::trace!("Released {} overlay", overlay.mode.label());
        }
        released
    }

    fn attach(&mut self, overlay: RouteOverlay) {
        self.release();
        self.overlay = Some(overlay);
    }

    /// Make every outstanding request stale
    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    pub fn overlay(&self) -> Option<&RouteOverlay> {
        self.overlay.as_ref()
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    pub fn status(&self) -> &RouteStatus {
        &self.status
    }

    pub fn pending(&self) -> Option<&RouteRequest> {
        self.pending.as_ref()
    }

    /// Number of overlays attached to the map (0 or 1)
    pub fn attached_count(&self) -> usize {
        usize::from(self.overlay.is_some())
    }
}
