//! Walkers plugin drawing the measurement on the map
//!
//! The plugin is rebuilt every frame from a snapshot of the [`MeasureSession`].
//! It draws the route overlay, the two markers and the distance popup, and
//! reports primary clicks on the map back through a [`ClickSlot`].

use crate::app::theme::ThemePreference;
use crate::measure::{GeoPoint, MeasurePopup, MeasureSession};
use egui::{Color32, Pos2, Stroke};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Last click on the map, taken by the widget after the map is drawn
pub type ClickSlot = Arc<Mutex<Option<GeoPoint>>>;

pub const SOURCE_COLOR: Color32 = Color32::from_rgb(0x4c, 0x9a, 0xff);
pub const DESTINATION_COLOR: Color32 = Color32::from_rgb(0x34, 0xd3, 0x99);

const HALO_WIDTH: f32 = 10.0;
const HALO_OPACITY: f32 = 0.25;
const LINE_WIDTH: f32 = 4.0;
const LINE_OPACITY: f32 = 0.95;

const MARKER_RADIUS: f32 = 7.0;
const MARKER_RING: f32 = 2.5;
const POPUP_WIDTH: f32 = 260.0;

pub struct MeasurePlugin {
    route: Vec<walkers::Position>,
    source: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    popup: Option<MeasurePopup>,
    route_color: Color32,
    /// 0.0..=1.0, grows the marker halos while the measuring pulse runs
    pulse: f32,
    clicks: ClickSlot,
}

impl MeasurePlugin {
    pub fn new(
        session: &MeasureSession,
        theme: ThemePreference,
        pulse: f32,
        clicks: ClickSlot,
    ) -> Self {
        Self {
            route: session
                .overlay()
                .map(|overlay| overlay.positions().collect())
                .unwrap_or_default(),
            source: session.selection().source(),
            destination: session.selection().destination(),
            popup: session.popup(),
            route_color: theme.route_color(),
            pulse: pulse.clamp(0.0, 1.0),
            clicks,
        }
    }

    fn draw_route(&self, painter: &egui::Painter, projector: &Projector) {
        if self.route.len() < 2 {
            return;
        }
        let screen_points: Vec<Pos2> = self
            .route
            .iter()
            .map(|p| projector.project(*p).to_pos2())
            .collect();

        painter.add(egui::Shape::line(
            screen_points.clone(),
            Stroke::new(HALO_WIDTH, self.route_color.gamma_multiply(HALO_OPACITY)),
        ));
        painter.add(egui::Shape::line(
            screen_points,
            Stroke::new(LINE_WIDTH, self.route_color.gamma_multiply(LINE_OPACITY)),
        ));
    }

    fn draw_marker(
        &self,
        painter: &egui::Painter,
        projector: &Projector,
        point: GeoPoint,
        color: Color32,
    ) {
        let center = projector.project(point.to_position()).to_pos2();
        painter.circle_filled(center, halo_radius(self.pulse), color.gamma_multiply(0.3));
        painter.circle_filled(center, MARKER_RADIUS + MARKER_RING, Color32::WHITE);
        painter.circle_filled(center, MARKER_RADIUS, color);
    }

    fn draw_popup(&self, ui: &egui::Ui, projector: &Projector, popup: &MeasurePopup) {
        let painter = ui.painter();
        let visuals = ui.visuals();
        let tip = projector.project(popup.anchor.to_position()).to_pos2();

        let title = painter.layout(
            popup.title.to_string(),
            egui::FontId::proportional(14.0),
            visuals.strong_text_color(),
            POPUP_WIDTH,
        );
        let body = painter.layout(
            popup.text.clone(),
            egui::FontId::proportional(13.0),
            visuals.text_color(),
            POPUP_WIDTH,
        );

        let padding = egui::vec2(10.0, 8.0);
        let gap = 4.0;
        let size = egui::vec2(
            title.size().x.max(body.size().x),
            title.size().y + gap + body.size().y,
        ) + padding * 2.0;
        let arrow = 8.0;
        let rect = egui::Rect::from_min_size(
            Pos2::new(tip.x - size.x / 2.0, tip.y - arrow - size.y),
            size,
        );

        let fill = visuals.window_fill;
        let stroke = visuals.window_stroke;
        painter.add(egui::Shape::convex_polygon(
            vec![
                Pos2::new(tip.x - arrow, rect.bottom() - 1.0),
                Pos2::new(tip.x + arrow, rect.bottom() - 1.0),
                tip,
            ],
            fill,
            stroke,
        ));
        painter.rect_filled(rect, 8.0, fill);
        painter.rect_stroke(rect, 8.0, stroke, egui::StrokeKind::Inside);

        let text_pos = rect.min + padding;
        let body_pos = text_pos + egui::vec2(0.0, title.size().y + gap);
        painter.galley(text_pos, title, visuals.text_color());
        painter.galley(body_pos, body, visuals.text_color());
    }
}

/// Halo radius of a marker for a given pulse strength
fn halo_radius(pulse: f32) -> f32 {
    (MARKER_RADIUS + MARKER_RING) * (1.6 + pulse)
}

impl Plugin for MeasurePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("MeasurePlugin::run");

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pos) = response.interact_pointer_pos()
        {
            let position = projector.unproject(pos.to_vec2());
            match self.clicks.lock() {
                Ok(mut slot) => *slot = Some(GeoPoint::from_position(position)),
                Err(e) => tracing::warn!("Dropping map click: {e}"),
            }
        }

        let painter = ui.painter();
        self.draw_route(painter, projector);
        if let Some(source) = self.source {
            self.draw_marker(painter, projector, source, SOURCE_COLOR);
        }
        if let Some(destination) = self.destination {
            self.draw_marker(painter, projector, destination, DESTINATION_COLOR);
        }
        if let Some(popup) = &self.popup {
            self.draw_popup(ui, projector, popup);
        }
    }
}
