//! Road routing through an OSRM-compatible HTTP service
//!
//! [`RoutingService`] is the seam between the widget and the network: the
//! production implementation is [`OsrmRouter`], tests plug in their own.
//! [`RouteDispatcher`] runs requests on the async runtime and hands the
//! completions back to the UI loop through a channel, so the UI never awaits.

use super::overlay::{RouteCompletion, RouteRequest};
use super::GeoPoint;
use crate::entrypoints::async_runtime::{self, MaybeSend, MaybeSync};
use geo::LineString;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Public OSRM demo server
pub const DEFAULT_SERVICE_URL: &str = "https://router.project-osrm.org/route/v1";

/// OSRM routing profile used by default
pub const DEFAULT_PROFILE: &str = "driving";

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Routing service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid routing response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Routing service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("No route found")]
    NoRoute,

    #[error("Invalid route geometry: {0}")]
    InvalidGeometry(String),
}

pub type RoutingResult<T> = std::result::Result<T, RoutingError>;

/// One route alternative returned by the service
#[derive(Clone, Debug, PartialEq)]
pub struct RouteAlternative {
    /// Total distance in meters
    pub distance_m: f64,
    /// Expected travel time in seconds
    pub duration_s: f64,
    /// Road path (x = longitude, y = latitude)
    pub geometry: LineString<f64>,
}

/// Anything that can compute a road route between two points
pub trait RoutingService: MaybeSend + MaybeSync + 'static {
    /// Route alternatives between `source` and `destination`, best first
    fn route(
        &self,
        source: GeoPoint,
        destination: GeoPoint,
    ) -> impl Future<Output = RoutingResult<Vec<RouteAlternative>>> + MaybeSend;
}

/// Connection settings for [`OsrmRouter`]
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Base URL up to and including the service version, e.g. `.../route/v1`
    pub service_url: String,
    pub profile: String,
    pub timeout: std::time::Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: std::time::Duration::from_secs(20),
        }
    }
}

/// OSRM `route` service client
#[derive(Clone, Debug)]
pub struct OsrmRouter {
    client: reqwest::Client,
    config: RouterConfig,
}

impl OsrmRouter {
    pub fn new(config: RouterConfig) -> RoutingResult<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(config.timeout)
            .user_agent(concat!("navapp/", env!("CARGO_PKG_VERSION")));
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Request URL for a two-waypoint route. OSRM expects `lon,lat` pairs.
    pub fn route_url(&self, source: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{}/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson&alternatives=false&steps=false",
            self.config.service_url.trim_end_matches('/'),
            self.config.profile,
            source.lon(),
            source.lat(),
            destination.lon(),
            destination.lat()
        )
    }
}

impl RoutingService for OsrmRouter {
    fn route(
        &self,
        source: GeoPoint,
        destination: GeoPoint,
    ) -> impl Future<Output = RoutingResult<Vec<RouteAlternative>>> + MaybeSend {
        let client = self.client.clone();
        let url = self.route_url(source, destination);
        async move {
            tracing::debug!("GET {url}");
            let response = client.get(&url).send().await?;
            let status = response.status();
            let body = response.text().await?;

            // OSRM reports failures such as `NoRoute` with a JSON body and a 4xx status
            match parse_osrm_response(&body) {
                Err(RoutingError::Json(e)) if !status.is_success() => {
                    tracing::debug!("Unparseable error body ({e})");
                    Err(RoutingError::Status(status.as_u16()))
                }
                other => other,
            }
        }
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    #[serde(default)]
    duration: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON LineString
#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Parse the body of an OSRM `route` response
pub fn parse_osrm_response(body: &str) -> RoutingResult<Vec<RouteAlternative>> {
    let response: OsrmResponse = serde_json::from_str(body)?;

    match response.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Err(RoutingError::NoRoute),
        _ => {
            return Err(RoutingError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }
    }

    if response.routes.is_empty() {
        return Err(RoutingError::NoRoute);
    }

    response
        .routes
        .into_iter()
        .map(|route| {
            if route.geometry.coordinates.len() < 2 {
                return Err(RoutingError::InvalidGeometry(format!(
                    "expected at least 2 coordinates, got {}",
                    route.geometry.coordinates.len()
                )));
            }
            if !route.distance.is_finite() || route.distance < 0.0 {
                return Err(RoutingError::InvalidGeometry(format!(
                    "invalid distance {}",
                    route.distance
                )));
            }
            let coords = route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| GeoPoint::new(lat, lon).to_coord())
                .collect::<Vec<_>>();
            Ok(RouteAlternative {
                distance_m: route.distance,
                duration_s: route.duration,
                geometry: LineString::new(coords),
            })
        })
        .collect()
}

/// Runs route requests in the background and queues their completions
pub struct RouteDispatcher<R: RoutingService> {
    router: Arc<R>,
    tx: mpsc::UnboundedSender<RouteCompletion>,
    rx: mpsc::UnboundedReceiver<RouteCompletion>,
}

impl<R: RoutingService> RouteDispatcher<R> {
    pub fn new(router: R) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            router: Arc::new(router),
            tx,
            rx,
        }
    }

    /// Fire off `request`. `notify` runs once the completion is queued
    /// (used to wake up the UI).
    pub fn dispatch<N>(&self, request: RouteRequest, notify: N)
    where
        N: Fn() + MaybeSend + 'static,
    {
        let router = Arc::clone(&self.router);
        let tx = self.tx.clone();
        async_runtime::spawn(async move {
            let result = router.route(request.source, request.destination).await;
            if tx.send(RouteCompletion { request, result }).is_err() {
                // The widget is gone, nobody is waiting for this route
                tracing::trace!("Dropping route completion after teardown");
                return;
            }
            notify();
        });
    }

    /// Next queued completion, without blocking
    pub fn try_next(&mut self) -> Option<RouteCompletion> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    async fn next(&mut self) -> Option<RouteCompletion> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{RouteMode, RouteOverlayManager, Selection};
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    const OK_BODY: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 346211.4,
            "duration": 17220.5,
            "geometry": {
                "type": "LineString",
                "coordinates": [[77.5946, 12.9716], [78.9, 12.9], [80.2707, 13.0827]]
            }
        }],
        "waypoints": []
    }"#;

    fn bengaluru() -> GeoPoint {
        GeoPoint::new(12.9716, 77.5946)
    }

    fn chennai() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    #[test]
    fn test_parse_ok_response() {
        let routes = parse_osrm_response(OK_BODY).unwrap();
        assert_eq!(routes.len(), 1);
        assert_relative_eq!(routes[0].distance_m, 346211.4);
        assert_relative_eq!(routes[0].duration_s, 17220.5);

        // GeoJSON is [lon, lat]
        let first = routes[0].geometry.0[0];
        assert_relative_eq!(first.x, 77.5946);
        assert_relative_eq!(first.y, 12.9716);
    }

    #[test]
    fn test_parse_no_route() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert!(matches!(
            parse_osrm_response(body),
            Err(RoutingError::NoRoute)
        ));

        let body = r#"{"code": "Ok", "routes": []}"#;
        assert!(matches!(
            parse_osrm_response(body),
            Err(RoutingError::NoRoute)
        ));
    }

    #[test]
    fn test_parse_service_error() {
        let body = r#"{"code": "InvalidQuery", "message": "Query string malformed"}"#;
        match parse_osrm_response(body) {
            Err(RoutingError::Service { code, message }) => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_osrm_response("<html>Bad gateway</html>"),
            Err(RoutingError::Json(_))
        ));

        let body = r#"{"code": "Ok", "routes": [{"distance": 5.0, "geometry": {"coordinates": [[1.0, 2.0]]}}]}"#;
        assert!(matches!(
            parse_osrm_response(body),
            Err(RoutingError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_route_url() {
        let router = OsrmRouter::new(RouterConfig {
            service_url: "https://osrm.example.org/route/v1/".to_string(),
            profile: "driving".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            router.route_url(bengaluru(), chennai()),
            "https://osrm.example.org/route/v1/driving/77.594600,12.971600;80.270700,13.082700\
             ?overview=full&geometries=geojson&alternatives=false&steps=false"
        );
    }

    /// Answers every request with a straight two-point "road" of fixed length
    struct FixedRouter {
        distance_m: f64,
    }

    impl RoutingService for FixedRouter {
        fn route(
            &self,
            source: GeoPoint,
            destination: GeoPoint,
        ) -> impl Future<Output = RoutingResult<Vec<RouteAlternative>>> + MaybeSend {
            let distance_m = self.distance_m;
            async move {
                Ok(vec![RouteAlternative {
                    distance_m,
                    duration_s: 0.0,
                    geometry: LineString::new(vec![source.to_coord(), destination.to_coord()]),
                }])
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_completion() {
        let mut dispatcher = RouteDispatcher::new(FixedRouter {
            distance_m: 12_500.0,
        });
        let mut manager = RouteOverlayManager::new();
        let selection = Selection::HasBoth {
            source: bengaluru(),
            destination: chennai(),
        };

        let request = manager.sync(&selection, RouteMode::Road).unwrap();
        dispatcher.dispatch(request, || {});

        let completion = dispatcher.next().await.unwrap();
        assert_eq!(completion.request, request);
        assert!(manager.complete(completion));
        assert_relative_eq!(manager.measurement().unwrap().km, 12.5);
    }

    /// Holds every request until the gate opens
    struct GatedRouter {
        gate: Arc<tokio::sync::Notify>,
        routed: Arc<AtomicBool>,
    }

    impl RoutingService for GatedRouter {
        fn route(
            &self,
            _source: GeoPoint,
            _destination: GeoPoint,
        ) -> impl Future<Output = RoutingResult<Vec<RouteAlternative>>> + MaybeSend {
            let gate = Arc::clone(&self.gate);
            let routed = Arc::clone(&self.routed);
            async move {
                gate.notified().await;
                routed.store(true, Ordering::SeqCst);
                Err(RoutingError::NoRoute)
            }
        }
    }

    #[tokio::test]
    async fn test_completion_after_dispatcher_dropped_is_discarded() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let routed = Arc::new(AtomicBool::new(false));
        let notified = Arc::new(AtomicBool::new(false));

        let dispatcher = RouteDispatcher::new(GatedRouter {
            gate: Arc::clone(&gate),
            routed: Arc::clone(&routed),
        });
        let mut manager = RouteOverlayManager::new();
        let selection = Selection::HasBoth {
            source: bengaluru(),
            destination: chennai(),
        };
        let request = manager.sync(&selection, RouteMode::Road).unwrap();

        let flag = Arc::clone(&notified);
        dispatcher.dispatch(request, move || flag.store(true, Ordering::SeqCst));
        drop(dispatcher);

        gate.notify_one();
        for _ in 0..100 {
            if routed.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        tokio::task::yield_now().await;

        assert!(routed.load(Ordering::SeqCst));
        assert!(!notified.load(Ordering::SeqCst));
    }
}
