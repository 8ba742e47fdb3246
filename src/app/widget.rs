//! The interactive measure map
//!
//! [`MeasureWidget`] owns the [`MeasureSession`], the routing dispatcher, the
//! tile caches and the theme subscription. Each frame it drains finished
//! routing requests, follows theme changes, draws the map and turns map clicks
//! into session actions.

use crate::app::plugin::{ClickSlot, MeasurePlugin};
use crate::app::settings::Settings;
use crate::app::theme::{ThemePreference, ThemeStore};
use crate::measure::{
    GeoPoint, MeasureSession, OsrmRouter, RouteCompletion, RouteDispatcher, RouteMode,
    RouteRequest, RoutingError,
};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// CARTO dark basemap, used with the dark theme
pub struct CartoDark;

impl TileSource for CartoDark {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://a.basemaps.cartocdn.com/dark_all/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        20
    }
}

pub struct MeasureWidget {
    session: MeasureSession,
    /// `None` if the HTTP client could not be created; road requests then fail fast
    dispatcher: Option<RouteDispatcher<OsrmRouter>>,
    tiles_light: HttpTiles,
    tiles_dark: HttpTiles,
    map_memory: MapMemory,
    home: walkers::Position,
    clicks: ClickSlot,
    theme_rx: Option<watch::Receiver<ThemePreference>>,
    theme: ThemePreference,
    ctx: egui::Context,
}

impl MeasureWidget {
    pub fn new(settings: &Settings, theme: &ThemeStore, ctx: &egui::Context) -> Self {
        let dispatcher = match OsrmRouter::new(settings.router_config()) {
            Ok(router) => Some(RouteDispatcher::new(router)),
            Err(e) => {
                tracing::error!("Road routing disabled, could not create HTTP client: {e}");
                None
            }
        };

        let home = settings.center();
        let mut map_memory = MapMemory::default();
        map_memory.center_at(home);
        if map_memory.set_zoom(settings.zoom).is_err() {
            tracing::warn!("Invalid initial zoom {}, using the default", settings.zoom);
        }

        let theme_rx = theme.subscribe();
        let current = *theme_rx.borrow();

        tracing::debug!(
            "Measure widget mounted at ({:.4}, {:.4})",
            settings.center_lat,
            settings.center_lon
        );

        Self {
            session: MeasureSession::new(RouteMode::from_road_toggle(settings.road_route)),
            dispatcher,
            tiles_light: HttpTiles::new(OpenStreetMap, ctx.clone()),
            tiles_dark: HttpTiles::new(CartoDark, ctx.clone()),
            map_memory,
            home,
            clicks: Arc::new(Mutex::new(None)),
            theme_rx: Some(theme_rx),
            theme: current,
            ctx: ctx.clone(),
        }
    }

    pub fn session(&self) -> &MeasureSession {
        &self.session
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    /// "Measure Distance". Returns whether the popup is now shown.
    pub fn measure(&mut self) -> bool {
        self.session.measure()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn set_road_route(&mut self, enabled: bool) {
        let request = self.session.set_mode(RouteMode::from_road_toggle(enabled));
        self.dispatch(request);
    }

    pub fn click(&mut self, point: GeoPoint) {
        let request = self.session.on_map_click(point);
        self.dispatch(request);
    }

    fn dispatch(&mut self, request: Option<RouteRequest>) {
        let Some(request) = request else {
            return;
        };
        tracing::debug!(
            "Requesting road route #{} {:?} -> {:?}",
            request.generation(),
            request.source,
            request.destination
        );
        match &self.dispatcher {
            Some(dispatcher) => {
                let ctx = self.ctx.clone();
                dispatcher.dispatch(request, move || ctx.request_repaint());
            }
            None => {
                self.apply(RouteCompletion {
                    request,
                    result: Err(RoutingError::Service {
                        code: "ClientUnavailable".into(),
                        message: "HTTP client could not be created".into(),
                    }),
                });
            }
        }
    }

    fn apply(&mut self, completion: RouteCompletion) {
        let generation = completion.request.generation();
        if !self.session.complete(completion) {
            tracing::debug!("Discarded stale road route #{generation}");
            return;
        }
        if self
            .session
            .overlay()
            .is_some_and(|overlay| overlay.mode.is_road())
        {
            self.fit_to_route();
        }
    }

    /// Drain finished routing requests
    fn poll_routes(&mut self) {
        let mut finished = Vec::new();
        if let Some(dispatcher) = &mut self.dispatcher {
            while let Some(completion) = dispatcher.try_next() {
                finished.push(completion);
            }
        }
        for completion in finished {
            self.apply(completion);
        }
    }

    /// Pick up theme changes. Only the tiles and colours change.
    fn poll_theme(&mut self) {
        let Some(rx) = &mut self.theme_rx else {
            return;
        };
        match rx.has_changed() {
            Ok(true) => {
                self.theme = *rx.borrow_and_update();
                tracing::trace!("Map theme is now {}", self.theme.as_str());
            }
            Ok(false) => {}
            Err(_) => {
                // Store dropped, keep the last theme
                self.theme_rx = None;
            }
        }
    }

    /// Fit the map view to the bounding box of the current route
    fn fit_to_route(&mut self) {
        let Some((south_west, north_east)) = self.session.overlay().and_then(|o| o.bounds())
        else {
            return;
        };
        let center = walkers::lat_lon(
            (south_west.lat() + north_east.lat()) / 2.0,
            (south_west.lon() + north_east.lon()) / 2.0,
        );
        let lat_span = (north_east.lat() - south_west.lat()).abs();
        let lon_span = (north_east.lon() - south_west.lon()).abs();
        let zoom = zoom_for_span(lat_span.max(lon_span));

        self.map_memory.center_at(center);
        let _ = self.map_memory.set_zoom(zoom);
        tracing::trace!("Fitted map to route, zoom {zoom:.1}");
    }

    /// Draw the map with the given size. `pulse` is the measuring pulse strength.
    pub fn show(&mut self, ui: &mut egui::Ui, size: egui::Vec2, pulse: f32) {
        profiling::scope!("MeasureWidget::show");

        self.poll_routes();
        self.poll_theme();

        let plugin = MeasurePlugin::new(&self.session, self.theme, pulse, self.clicks.clone());
        let (tiles, attribution): (&mut HttpTiles, &str) = if self.theme.is_dark() {
            (&mut self.tiles_dark, CartoDark.attribution().text)
        } else {
            (&mut self.tiles_light, OpenStreetMap.attribution().text)
        };

        let map = Map::new(Some(tiles), &mut self.map_memory, self.home).with_plugin(plugin);
        let response = ui.add_sized(size, map);

        ui.painter().text(
            response.rect.center_bottom() + egui::vec2(0.0, -5.0),
            egui::Align2::CENTER_BOTTOM,
            attribution,
            egui::FontId::proportional(10.0),
            if self.theme.is_dark() {
                egui::Color32::from_white_alpha(180)
            } else {
                egui::Color32::from_black_alpha(180)
            },
        );

        let clicked = match self.clicks.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                tracing::warn!("Click slot poisoned: {e}");
                None
            }
        };
        if let Some(point) = clicked {
            self.click(point);
        }
    }
}

impl Drop for MeasureWidget {
    fn drop(&mut self) {
        self.session.teardown();
        // Unsubscribe before the store goes away
        self.theme_rx = None;
        tracing::debug!("Measure widget torn down");
    }
}

/// Zoom level that fits a span of `max_span` degrees
fn zoom_for_span(max_span: f64) -> f64 {
    if max_span > 0.0 {
        ((4.0 * 360.0 / max_span).log2() - 0.5).clamp(1.0, 18.0)
    } else {
        14.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::storage::MemoryStorage;
    use crate::measure::RouteStatus;

    fn widget_with_store() -> (MeasureWidget, ThemeStore) {
        let store = ThemeStore::new(Box::new(MemoryStorage::new()), false);
        let widget = MeasureWidget::new(&Settings::default(), &store, &egui::Context::default());
        (widget, store)
    }

    #[test]
    fn test_theme_change_keeps_measurement() {
        let (mut widget, store) = widget_with_store();
        assert_eq!(widget.theme(), ThemePreference::Light);

        widget.click(GeoPoint::new(12.9716, 77.5946));
        widget.click(GeoPoint::new(13.0827, 80.2707));
        assert!(widget.measure());
        let selection = *widget.session().selection();
        let measurement = *widget.session().measurement().unwrap();
        let overlay = widget.session().overlay().cloned();
        let popup = widget.session().popup();

        store.toggle();
        widget.poll_theme();

        assert_eq!(widget.theme(), ThemePreference::Dark);
        let session = widget.session();
        assert_eq!(session.selection(), &selection);
        assert_eq!(session.measurement(), Some(&measurement));
        assert_eq!(session.overlay().cloned(), overlay);
        assert_eq!(session.attached_overlays(), 1);
        assert_eq!(session.popup(), popup);
        assert_eq!(session.route_status(), &RouteStatus::Ready);

        store.toggle();
        widget.poll_theme();
        assert_eq!(widget.theme(), ThemePreference::Light);
        assert_eq!(widget.session().measurement(), Some(&measurement));
    }

    #[test]
    fn test_drop_unsubscribes_from_theme() {
        let (widget, store) = widget_with_store();
        assert_eq!(store.subscriber_count(), 1);

        drop(widget);
        assert_eq!(store.subscriber_count(), 0);
        // The store keeps working without subscribers
        assert_eq!(store.toggle(), ThemePreference::Dark);
    }

    #[test]
    fn test_zoom_for_span() {
        assert_eq!(zoom_for_span(0.0), 14.0);
        assert_eq!(zoom_for_span(360.0), 1.5);
        assert_eq!(zoom_for_span(1e-9), 18.0);
        assert!(zoom_for_span(0.1) > zoom_for_span(2.0));
    }

    #[test]
    fn test_carto_dark_url() {
        let url = CartoDark.tile_url(TileId {
            x: 1,
            y: 2,
            zoom: 3,
        });
        assert_eq!(url, "https://a.basemaps.cartocdn.com/dark_all/3/1/2.png");
    }
}
