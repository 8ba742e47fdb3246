//! Measure widget controller
//!
//! [`MeasureSession`] owns the selection, the routing mode, the overlay and the
//! popup flag, and exposes one method per user action. Each action updates
//! the state first and then re-synchronises the overlay explicitly; when that
//! needs a road route, the request is returned for the caller to dispatch.

use super::distance::{fmt_coords, fmt_km, midpoint};
use super::overlay::{
    Measurement, RouteCompletion, RouteMode, RouteOverlay, RouteOverlayManager, RouteRequest,
    RouteStatus,
};
use super::{GeoPoint, Selection};

/// Distance popup anchored between the two points
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurePopup {
    pub anchor: GeoPoint,
    pub title: &'static str,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct MeasureSession {
    selection: Selection,
    mode: RouteMode,
    overlays: RouteOverlayManager,
    popup_visible: bool,
}

impl MeasureSession {
    pub fn new(mode: RouteMode) -> Self {
        Self {
            selection: Selection::Empty,
            mode,
            overlays: RouteOverlayManager::new(),
            popup_visible: false,
        }
    }

    /// A click on the map surface
    pub fn on_map_click(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        self.overlays.clear_measurement();
        self.popup_visible = false;
        self.selection.click(point);
        tracing::debug!("Selection is now {:?}", self.selection);
        self.overlays.sync(&self.selection, self.mode)
    }

    /// Switch between straight-line and road distance
    pub fn set_mode(&mut self, mode: RouteMode) -> Option<RouteRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        tracing::debug!("Routing mode: {}", mode.label());
        if !self.selection.is_complete() {
            return None;
        }
        self.overlays.sync(&self.selection, self.mode)
    }

    /// The "Measure Distance" action. Only possible with both points selected.
    pub fn measure(&mut self) -> bool {
        if !self.can_measure() {
            return false;
        }
        self.popup_visible = true;
        true
    }

    pub fn can_measure(&self) -> bool {
        self.selection.is_complete()
    }

    /// Back to no points, no overlay and no measurement
    pub fn reset(&mut self) {
        self.selection.reset();
        self.popup_visible = false;
        self.overlays.reset();
    }

    /// Feed a routing completion back in. Returns `false` if it was stale.
    pub fn complete(&mut self, completion: RouteCompletion) -> bool {
        self.overlays.complete(completion)
    }

    /// Release everything held on the map
    pub fn teardown(&mut self) {
        self.overlays.reset();
        self.popup_visible = false;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn overlay(&self) -> Option<&RouteOverlay> {
        self.overlays.overlay()
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.overlays.measurement()
    }

    pub fn route_status(&self) -> &RouteStatus {
        self.overlays.status()
    }

    pub fn attached_overlays(&self) -> usize {
        self.overlays.attached_count()
    }

    /// Readout text for the distance chip
    pub fn distance_label(&self) -> String {
        if let Some(measurement) = self.measurement() {
            return fmt_km(measurement.km);
        }
        match self.route_status() {
            RouteStatus::Pending => "Routing…".to_string(),
            RouteStatus::Unavailable(_) => "Route unavailable".to_string(),
            RouteStatus::Idle | RouteStatus::Ready => "—".to_string(),
        }
    }

    /// The popup, when it was requested and a measurement is available
    pub fn popup(&self) -> Option<MeasurePopup> {
        if !self.popup_visible {
            return None;
        }
        let (source, destination) = self.selection.pair()?;
        let measurement = self.measurement()?;
        Some(MeasurePopup {
            anchor: midpoint(source, destination),
            title: "Measure Distance",
            text: format!(
                "Distance between Point {} and Point {} = {}",
                fmt_coords(source),
                fmt_coords(destination),
                fmt_km(measurement.km)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::routing::{RouteAlternative, RoutingError};
    use geo::LineString;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    fn completion_for(request: RouteRequest, distance_m: f64) -> RouteCompletion {
        RouteCompletion {
            request,
            result: Ok(vec![RouteAlternative {
                distance_m,
                duration_s: 60.0,
                geometry: LineString::new(vec![
                    request.source.to_coord(),
                    request.destination.to_coord(),
                ]),
            }]),
        }
    }

    #[test]
    fn test_three_clicks_restart_cycle() {
        let mut session = MeasureSession::default();
        let (p1, p2, p3) = (p(12.9, 77.5), p(13.0, 80.2), p(10.0, 76.0));

        assert!(session.on_map_click(p1).is_none());
        assert!(session.measurement().is_none());

        assert!(session.on_map_click(p2).is_none());
        assert!(session.measurement().is_some());

        assert!(session.on_map_click(p3).is_none());
        assert_eq!(session.selection(), &Selection::HasSource { source: p3 });
        assert!(session.measurement().is_none());
        assert_eq!(session.attached_overlays(), 0);
    }

    #[test]
    fn test_click_hides_popup() {
        let mut session = MeasureSession::default();
        session.on_map_click(p(1.0, 1.0));
        session.on_map_click(p(2.0, 2.0));
        assert!(session.measure());
        assert!(session.popup().is_some());

        session.on_map_click(p(3.0, 3.0));
        assert!(session.popup().is_none());
        session.on_map_click(p(4.0, 4.0));
        // The popup stays hidden until measured again
        assert!(session.popup().is_none());
    }

    #[test]
    fn test_measure_requires_both_points() {
        let mut session = MeasureSession::default();
        assert!(!session.measure());
        session.on_map_click(p(1.0, 1.0));
        assert!(!session.can_measure());
        assert!(!session.measure());
        assert!(session.popup().is_none());
    }

    #[test]
    fn test_popup_text_and_anchor() {
        let mut session = MeasureSession::default();
        session.on_map_click(p(12.9716, 77.5946));
        session.on_map_click(p(13.0827, 80.2707));
        session.measure();

        let popup = session.popup().unwrap();
        assert_eq!(popup.title, "Measure Distance");
        assert!(popup.text.starts_with(
            "Distance between Point 12.97160, 77.59460 and Point 13.08270, 80.27070 = "
        ));
        assert!(popup.text.ends_with(" km"));
        assert!((popup.anchor.lat() - 13.02715).abs() < 1e-9);
    }

    #[test]
    fn test_mode_change_without_points_does_nothing() {
        let mut session = MeasureSession::default();
        assert!(session.set_mode(RouteMode::Road).is_none());
        session.on_map_click(p(1.0, 1.0));
        assert!(session.set_mode(RouteMode::StraightLine).is_none());
        assert_eq!(session.attached_overlays(), 0);
    }

    #[test]
    fn test_road_toggle_on_off_on() {
        let mut session = MeasureSession::default();
        session.on_map_click(p(12.9716, 77.5946));
        session.on_map_click(p(13.0827, 80.2707));
        assert_eq!(session.attached_overlays(), 1);

        let first = session.set_mode(RouteMode::Road).unwrap();
        assert!(session.attached_overlays() <= 1);
        assert!(session.set_mode(RouteMode::StraightLine).is_none());
        assert_eq!(session.attached_overlays(), 1);
        let second = session.set_mode(RouteMode::Road).unwrap();
        assert!(session.attached_overlays() <= 1);
        assert_eq!(session.distance_label(), "Routing…");

        assert!(session.complete(completion_for(second, 350_000.0)));
        assert!(!session.complete(completion_for(first, 1_000.0)));

        assert_eq!(session.attached_overlays(), 1);
        assert_eq!(session.overlay().unwrap().mode, RouteMode::Road);
        assert_eq!(session.distance_label(), "350 km");
    }

    #[test]
    fn test_route_failure_reports_unavailable() {
        let mut session = MeasureSession::new(RouteMode::Road);
        session.on_map_click(p(0.0, 0.0));
        let request = session.on_map_click(p(0.0, 1.0)).unwrap();
        session.measure();

        assert!(session.complete(RouteCompletion {
            request,
            result: Err(RoutingError::NoRoute),
        }));
        assert_eq!(session.distance_label(), "Route unavailable");
        assert!(session.popup().is_none());
        assert_eq!(session.attached_overlays(), 0);
    }

    #[test]
    fn test_teardown_releases_overlay_and_drops_late_route() {
        let mut session = MeasureSession::new(RouteMode::Road);
        session.on_map_click(p(12.9716, 77.5946));
        let pending = session.on_map_click(p(13.0827, 80.2707)).unwrap();
        assert_eq!(session.route_status(), &RouteStatus::Pending);

        session.teardown();
        assert_eq!(session.attached_overlays(), 0);
        assert!(!session.complete(completion_for(pending, 350_000.0)));
        assert_eq!(session.attached_overlays(), 0);
        assert!(session.measurement().is_none());
        assert!(session.popup().is_none());

        // Straight overlays are released as well
        let mut session = MeasureSession::default();
        session.on_map_click(p(1.0, 1.0));
        session.on_map_click(p(2.0, 2.0));
        session.measure();
        session.teardown();
        assert_eq!(session.attached_overlays(), 0);
        assert!(session.popup().is_none());
    }

    #[test]
    fn test_popup_anchored_across_antimeridian() {
        let mut session = MeasureSession::default();
        session.on_map_click(GeoPoint::from_position(walkers::lat_lon(0.0, 179.0)));
        session.on_map_click(GeoPoint::from_position(walkers::lat_lon(0.0, 181.0)));
        assert!(session.measure());

        let km = session.measurement().unwrap().km;
        assert!((km - 222.4).abs() < 0.1, "got {km}");

        let popup = session.popup().unwrap();
        assert!((popup.anchor.lon().abs() - 180.0).abs() < 1e-9);

        let lons: Vec<f64> = session.overlay().unwrap().positions().map(|p| p.x()).collect();
        assert_eq!(lons, [179.0, 181.0]);
    }

    #[test]
    fn test_reset_from_any_state() {
        for clicks in 0..4 {
            for mode in [RouteMode::StraightLine, RouteMode::Road] {
                let mut session = MeasureSession::new(mode);
                for i in 0..clicks {
                    session.on_map_click(p(i as f64, i as f64));
                }
                session.measure();
                session.reset();

                assert_eq!(session.selection(), &Selection::Empty);
                assert!(session.measurement().is_none());
                assert!(session.popup().is_none());
                assert_eq!(session.attached_overlays(), 0);
                assert_eq!(session.distance_label(), "—");
            }
        }
    }
}
