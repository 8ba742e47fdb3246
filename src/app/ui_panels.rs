//! UI panels for the application
//!
//! Navigation bar, hero section, the measure section around the map, and the
//! help window.

use crate::app::plugin::{DESTINATION_COLOR, SOURCE_COLOR};
use crate::app::state::{NAV_LINKS, ShellState};
use crate::app::theme::ThemeStore;
use crate::app::widget::MeasureWidget;
use crate::entrypoints::logging::Profiler;
use crate::measure::fmt_coords;
use egui::{Color32, Pos2, RichText, Stroke, Ui};

const BRAND_BLUE: Color32 = Color32::from_rgb(0x2d, 0x7b, 0xf0);
const MAX_CONTENT_WIDTH: f32 = 1120.0;

/// Top navigation bar. Collapses into a burger menu on narrow viewports.
pub fn navbar(ctx: &egui::Context, shell: &mut ShellState, theme: &ThemeStore) {
    let narrow = ShellState::is_narrow(ctx.content_rect().width());
    if !narrow {
        shell.menu_open = false;
    }

    egui::TopBottomPanel::top("navbar")
        .frame(
            egui::Frame::side_top_panel(&ctx.style())
                .inner_margin(egui::Margin::symmetric(16, 10)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(BRAND_BLUE).size(18.0));
                if ui
                    .add(
                        egui::Label::new(RichText::new("NavApp").strong().size(20.0))
                            .sense(egui::Sense::click()),
                    )
                    .on_hover_text("NavApp Home")
                    .clicked()
                {
                    shell.activate_link(&NAV_LINKS[0]);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if narrow {
                        let icon = if shell.menu_open { "✕" } else { "☰" };
                        if ui
                            .button(RichText::new(icon).size(18.0))
                            .on_hover_text("Toggle menu")
                            .clicked()
                        {
                            shell.toggle_menu();
                        }
                    }

                    let current = theme.current();
                    if ui
                        .button(RichText::new(current.toggle_icon()).size(18.0))
                        .on_hover_text("Toggle theme")
                        .clicked()
                    {
                        let next = theme.toggle();
                        tracing::debug!("Theme switched to {}", next.as_str());
                    }

                    if !narrow {
                        ui.add_space(12.0);
                        for link in NAV_LINKS.iter().rev() {
                            if ui.link(link.label).clicked() {
                                shell.activate_link(link);
                            }
                            ui.add_space(8.0);
                        }
                    }
                });
            });
        });

    if narrow && shell.menu_open {
        egui::TopBottomPanel::top("mobile_menu").show(ctx, |ui| {
            ui.vertical(|ui| {
                for link in NAV_LINKS.iter() {
                    if ui
                        .add_sized(
                            [ui.available_width(), 32.0],
                            egui::Button::new(link.label).frame(false),
                        )
                        .clicked()
                    {
                        shell.activate_link(link);
                    }
                }
            });
        });
    }
}

/// Landing hero with a painted globe
pub fn hero(ui: &mut Ui, shell: &mut ShellState) {
    let wide = ui.available_width() > 860.0;
    if wide {
        ui.columns(2, |columns| {
            hero_text(&mut columns[0], shell);
            paint_globe(&mut columns[1]);
        });
    } else {
        hero_text(ui, shell);
        ui.add_space(16.0);
        paint_globe(ui);
    }
}

fn hero_text(ui: &mut Ui, shell: &mut ShellState) {
    ui.add_space(24.0);
    ui.label(RichText::new("✨ Navigation as a Service").color(BRAND_BLUE).strong());
    ui.add_space(8.0);
    ui.label(RichText::new("Ship navigation experiences charters love.").size(34.0).strong());
    ui.add_space(12.0);
    ui.label(
        "NavApp is a lightweight toolkit to embed location, routing and discovery into your \
         product. Designed for speed, themed for clarity, and built with a clean UI, so your \
         team ships faster.",
    );
    ui.add_space(12.0);

    for bullet in [
        "Zero-config theming with a bluish UI that just works.",
        "Realtime pins, routes and clusters with tiny payloads.",
        "Client-friendly.",
    ] {
        ui.horizontal(|ui| {
            ui.label(RichText::new("✔").color(BRAND_BLUE));
            ui.label(bullet);
        });
    }

    ui.add_space(16.0);
    ui.horizontal(|ui| {
        let primary = egui::Button::new(RichText::new("Get Started").color(Color32::WHITE).strong())
            .fill(BRAND_BLUE)
            .min_size(egui::vec2(120.0, 36.0));
        if ui.add(primary).clicked() {
            shell.scroll_to_demo = true;
        }
        let ghost = egui::Button::new("Explore").min_size(egui::vec2(100.0, 36.0));
        if ui.add(ghost).on_hover_text("See live demo").clicked() {
            shell.scroll_to_demo = true;
        }
    });

    ui.add_space(16.0);
    ui.horizontal(|ui| {
        for initials in ["VD", "MB", "GA", "DAF"] {
            avatar(ui, initials);
        }
        ui.add_space(8.0);
        ui.label(RichText::new("Trusted by teams shipping location features worldwide.").weak());
    });
}

fn avatar(ui: &mut Ui, initials: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(30.0, 30.0), egui::Sense::hover());
    let painter = ui.painter();
    painter.circle(
        rect.center(),
        14.0,
        BRAND_BLUE.gamma_multiply(0.2),
        Stroke::new(1.5, ui.visuals().panel_fill),
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        initials,
        egui::FontId::proportional(if initials.len() > 2 { 9.0 } else { 11.0 }),
        ui.visuals().strong_text_color(),
    );
}

/// Stylised globe: grid ellipses, a few route arcs and pins
fn paint_globe(ui: &mut Ui) {
    profiling::scope!("paint_globe");

    let side = ui.available_width().min(420.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(side, side * 0.7), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    // Drawn in a 600x400 box, scaled to fit
    let scale = rect.width() / 600.0;
    let at = |x: f32, y: f32| rect.min + egui::vec2(x * scale, y * scale);
    let center = at(300.0, 200.0);
    let muted = ui.visuals().weak_text_color().gamma_multiply(0.5);

    painter.circle_filled(center, 180.0 * scale, BRAND_BLUE.gamma_multiply(0.08));
    painter.circle(
        center,
        160.0 * scale,
        BRAND_BLUE.gamma_multiply(0.08),
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color),
    );

    for (angle, radii) in [
        (0.0_f32, &[(140.0_f32, 70.0_f32), (120.0, 50.0), (90.0, 30.0)][..]),
        (25.0, &[(140.0, 70.0), (120.0, 50.0), (90.0, 30.0)][..]),
        (-25.0, &[(140.0, 70.0), (120.0, 50.0)][..]),
    ] {
        for &(rx, ry) in radii {
            let points = ellipse_points(center, rx * scale, ry * scale, angle.to_radians(), 64);
            painter.add(egui::Shape::closed_line(points, Stroke::new(1.0, muted)));
        }
    }

    for (from, ctrl1, ctrl2, to, opacity) in [
        ((160.0, 170.0), (240.0, 120.0), (360.0, 120.0), (440.0, 170.0), 1.0),
        ((220.0, 250.0), (260.0, 210.0), (340.0, 210.0), (380.0, 250.0), 0.8),
        ((260.0, 190.0), (290.0, 160.0), (380.0, 160.0), (420.0, 200.0), 0.7),
    ] {
        let curve = egui::epaint::CubicBezierShape::from_points_stroke(
            [at(from.0, from.1), at(ctrl1.0, ctrl1.1), at(ctrl2.0, ctrl2.1), at(to.0, to.1)],
            false,
            Color32::TRANSPARENT,
            Stroke::new(2.5, BRAND_BLUE.gamma_multiply(opacity)),
        );
        painter.add(curve);
    }

    for (x, y) in [(160.0, 170.0), (300.0, 200.0), (440.0, 170.0), (380.0, 250.0)] {
        painter.circle_filled(at(x, y), 8.0 * scale.max(0.6), BRAND_BLUE.gamma_multiply(0.25));
        painter.circle_filled(at(x, y), 5.0 * scale.max(0.6), BRAND_BLUE);
    }
}

fn ellipse_points(center: Pos2, rx: f32, ry: f32, rotation: f32, segments: usize) -> Vec<Pos2> {
    let (sin_r, cos_r) = rotation.sin_cos();
    (0..segments)
        .map(|i| {
            let t = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (x, y) = (rx * t.cos(), ry * t.sin());
            center + egui::vec2(x * cos_r - y * sin_r, x * sin_r + y * cos_r)
        })
        .collect()
}

/// Controls, readout and the map itself
pub fn measure_section(ui: &mut Ui, widget: &mut MeasureWidget, shell: &mut ShellState) {
    let heading = ui.label(RichText::new("Distance • Routing").color(BRAND_BLUE).strong());
    if std::mem::take(&mut shell.scroll_to_demo) {
        heading.scroll_to_me(Some(egui::Align::TOP));
    }
    ui.label(RichText::new("Measure distance on the map").size(26.0).strong());
    ui.label(
        "Click once for Source, click again for Destination. Toggle \u{201c}Use Road Route \
         (OSRM)\u{201d} to snap to roads, or keep it off for straight-line.",
    );
    ui.add_space(6.0);
    for hint in [
        "Easy Route Calculation",
        "OpenStreetMap gives vibrant highlights.",
        "Direct & Road Route Distance",
    ] {
        ui.label(RichText::new(format!("• {hint}")).weak());
    }
    ui.add_space(10.0);

    measure_controls(ui, widget, shell);
    ui.add_space(8.0);
    measure_readout(ui, widget);
    ui.add_space(6.0);
    legend(ui, widget.theme().route_color());
    ui.add_space(10.0);

    let height = (ui.ctx().content_rect().height() * 0.75).max(320.0);
    let size = egui::vec2(ui.available_width(), height);
    let pulse = shell.pulse.strength_at(instant::Instant::now());
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::ZERO)
        .corner_radius(12.0)
        .show(ui, |ui| {
            widget.show(ui, size, pulse);
        });
}

fn measure_controls(ui: &mut Ui, widget: &mut MeasureWidget, shell: &mut ShellState) {
    ui.horizontal_wrapped(|ui| {
        let can_measure = widget.session().can_measure();
        let measure = egui::Button::new(
            RichText::new("Measure Distance")
                .color(Color32::WHITE)
                .strong(),
        )
        .fill(if can_measure {
            BRAND_BLUE
        } else {
            BRAND_BLUE.gamma_multiply(0.4)
        });
        if ui
            .add_enabled(can_measure, measure)
            .on_disabled_hover_text("Pick a source and a destination on the map first")
            .clicked()
            && widget.measure()
        {
            shell.pulse.start();
        }

        if ui.button("Reset").clicked() {
            widget.reset();
        }

        let mut road = widget.session().mode().is_road();
        if ui.checkbox(&mut road, "Use Road Route (OSRM)").changed() {
            widget.set_road_route(road);
        }
    });
}

fn measure_readout(ui: &mut Ui, widget: &MeasureWidget) {
    let selection = widget.session().selection();
    let source = selection.source().map(fmt_coords).unwrap_or_else(|| "—".into());
    let destination = selection
        .destination()
        .map(fmt_coords)
        .unwrap_or_else(|| "—".into());

    ui.horizontal_wrapped(|ui| {
        chip(ui, Some(SOURCE_COLOR), &format!("Source: {source}"), false);
        chip(ui, Some(DESTINATION_COLOR), &format!("Destination: {destination}"), false);
        chip(
            ui,
            None,
            &format!("Distance: {}", widget.session().distance_label()),
            true,
        );
    });
}

fn chip(ui: &mut Ui, dot: Option<Color32>, text: &str, accent: bool) {
    let fill = if accent {
        BRAND_BLUE.gamma_multiply(0.15)
    } else {
        ui.visuals().faint_bg_color
    };
    egui::Frame::new()
        .fill(fill)
        .corner_radius(16.0)
        .inner_margin(egui::Margin::symmetric(10, 4))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if let Some(color) = dot {
                    dot_icon(ui, color);
                }
                let text = RichText::new(text);
                ui.label(if accent { text.strong() } else { text });
            });
        });
}

fn dot_icon(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
}

fn legend(ui: &mut Ui, route_color: Color32) {
    ui.horizontal(|ui| {
        dot_icon(ui, SOURCE_COLOR);
        ui.label(RichText::new("Source").small());
        ui.add_space(8.0);
        dot_icon(ui, DESTINATION_COLOR);
        ui.label(RichText::new("Destination").small());
        ui.add_space(8.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(22.0, 12.0), egui::Sense::hover());
        ui.painter().line_segment(
            [rect.left_center(), rect.right_center()],
            Stroke::new(4.0, route_color),
        );
        ui.label(RichText::new("Route").small());
    });
}

/// Centre the page content up to a maximum width
pub fn centered_column(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui)) {
    let width = ui.available_width().min(MAX_CONTENT_WIDTH);
    let margin = ((ui.available_width() - width) / 2.0).max(0.0);
    ui.horizontal(|ui| {
        ui.add_space(margin);
        ui.vertical(|ui| {
            ui.set_width(width);
            add_contents(ui);
        });
    });
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool, profiler: &mut Profiler) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("NavApp");
            ui.label(RichText::new(crate::entrypoints::short_version_info()).small().weak());
            ui.add_space(8.0);

            ui.label(RichText::new("Measuring").strong());
            ui.label("• Click the map once for the source, again for the destination");
            ui.label("• A third click starts over from a new source");
            ui.label("• 'Measure Distance' shows the distance popup");
            ui.label("• 'Use Road Route (OSRM)' measures along roads");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll wheel or pinch to zoom");
            ui.label("• Click and drag to pan");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(8.0);

            ui.label(RichText::new("Debug").strong());
            profiler.ui(ui);
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}
