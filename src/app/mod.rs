//! Application module
//!
//! A single scrolling page:
//! - Navigation bar with the theme toggle (burger menu on narrow screens)
//! - Hero section
//! - Measure section with the interactive map
//! - Help window (F1) with the profiler toggle

mod plugin;
pub(crate) mod settings;
mod state;
mod storage;
mod theme;
mod ui_panels;
mod widget;

use crate::app::settings::Settings;
use crate::app::state::ShellState;
use crate::app::storage::default_storage_backend;
use crate::app::theme::{ThemePreference, ThemeStore};
use crate::app::widget::MeasureWidget;
use crate::entrypoints::logging::Profiler;
use eframe::egui;
use tokio::sync::watch;

/// Main application structure
pub struct NavApp {
    /// Dropped first so it unsubscribes before the store goes away
    widget: MeasureWidget,

    /// Persisted light/dark preference
    theme: ThemeStore,

    /// Mirrors the theme onto the egui visuals
    visuals_rx: watch::Receiver<ThemePreference>,

    shell: ShellState,

    profiler: Profiler,
}

impl NavApp {
    pub fn new(settings: Settings, cc: &eframe::CreationContext<'_>) -> Self {
        let theme = ThemeStore::new(default_storage_backend(), settings.ignore_persisted);
        let mut visuals_rx = theme.subscribe();
        let current = *visuals_rx.borrow_and_update();
        cc.egui_ctx.set_visuals(current.visuals());

        let widget = MeasureWidget::new(&settings, &theme, &cc.egui_ctx);

        tracing::info!(
            "Started with the {} theme, routing via {} ({})",
            current.as_str(),
            settings.router_url,
            settings.profile
        );

        Self {
            widget,
            theme,
            visuals_rx,
            shell: ShellState::default(),
            profiler: Profiler::default(),
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.visuals_rx.has_changed().unwrap_or(false) {
            let preference = *self.visuals_rx.borrow_and_update();
            ctx.set_visuals(preference.visuals());
        }
    }
}

#[profiling::all_functions]
impl eframe::App for NavApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.shell.show_help = !self.shell.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.shell.show_help = !self.shell.show_help;
            }
        });

        self.apply_theme(ctx);

        ui_panels::navbar(ctx, &mut self.shell, &self.theme);

        if self.shell.show_help {
            ui_panels::help_overlay(ctx, &mut self.shell.show_help, &mut self.profiler);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui_panels::centered_column(ui, |ui| {
                        ui_panels::hero(ui, &mut self.shell);
                        ui.add_space(32.0);
                        ui.separator();
                        ui.add_space(24.0);
                        ui_panels::measure_section(ui, &mut self.widget, &mut self.shell);
                        ui.add_space(24.0);
                    });
                });
        });

        let now = instant::Instant::now();
        self.shell.pulse.expire(now);
        if self.shell.pulse.is_active_at(now) {
            ctx.request_repaint();
        }

        self.profiler.finish_frame();
    }
}
