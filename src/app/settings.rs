use crate::entrypoints::cli::parse_args;
use crate::measure::GeoPoint;
use crate::measure::routing::{DEFAULT_PROFILE, DEFAULT_SERVICE_URL, RouterConfig};
use clap::Parser;
use std::time::Duration;

const DEFAULT_CENTER_LAT: f64 = 12.9716;
const DEFAULT_CENTER_LON: f64 = 77.5946;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// NavApp - Landing page with an interactive map to measure straight-line and road distances
pub struct Settings {
    /// Base URL of the OSRM route service
    #[clap(long, default_value = DEFAULT_SERVICE_URL)]
    pub router_url: String,

    /// OSRM routing profile (driving, walking, cycling...)
    #[clap(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Initial map center latitude
    #[clap(long, default_value_t = DEFAULT_CENTER_LAT, allow_negative_numbers = true)]
    pub center_lat: f64,

    /// Initial map center longitude
    #[clap(long, default_value_t = DEFAULT_CENTER_LON, allow_negative_numbers = true)]
    pub center_lon: f64,

    /// Initial map zoom level
    #[clap(long, default_value = "14")]
    pub zoom: f64,

    /// Timeout for a single routing request, in seconds
    #[clap(long, default_value = "20")]
    pub request_timeout_secs: u64,

    /// Start with road routing enabled instead of straight lines
    #[clap(long, default_value = "false")]
    pub road_route: bool,

    /// Ignore the persisted theme and start with the light theme
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::parse_from([crate::entrypoints::APP_NAME])
    }
}

impl Settings {
    /// Parse the settings from argv (native) or the page URL (web)
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::default()
                }
            }
        }
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            service_url: self.router_url.trim_end_matches('/').to_string(),
            profile: self.profile.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    /// Initial map center. Out-of-range values fall back to the default center.
    pub fn center(&self) -> walkers::Position {
        match GeoPoint::try_new(self.center_lat, self.center_lon) {
            Ok(point) => point.to_position(),
            Err(e) => {
                tracing::warn!("Invalid map center: {e}, using the default");
                walkers::lat_lon(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON)
            }
        }
    }
}
