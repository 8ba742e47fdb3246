//! Page shell state
//!
//! Everything around the map that is not the measurement itself: the mobile
//! menu, the help window and the short "measuring" pulse.

use instant::{Duration, Instant};

/// How long the "measuring" pulse stays on after "Measure Distance"
pub const PULSE_DURATION: Duration = Duration::from_millis(800);

/// Below this width the navbar collapses into the burger menu
pub const NARROW_WIDTH: f32 = 720.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAV_LINKS: [NavLink; 4] = [
    NavLink {
        label: "Home",
        href: "/",
    },
    NavLink {
        label: "Features",
        href: "/features",
    },
    NavLink {
        label: "Pricing",
        href: "/pricing",
    },
    NavLink {
        label: "About",
        href: "/about",
    },
];

/// The "measuring" flag. Purely visual, clears itself after [`PULSE_DURATION`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MeasurePulse {
    started_at: Option<Instant>,
}

impl MeasurePulse {
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        self.strength_at(now) > 0.0
    }

    /// 1.0 right after starting, fading linearly to 0.0
    pub fn strength_at(&self, now: Instant) -> f32 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };
        if now < started_at {
            return 1.0;
        }
        let elapsed = now.duration_since(started_at);
        if elapsed >= PULSE_DURATION {
            0.0
        } else {
            1.0 - elapsed.as_secs_f32() / PULSE_DURATION.as_secs_f32()
        }
    }

    /// Drop the timestamp once the pulse has run out
    pub fn expire(&mut self, now: Instant) {
        if self.started_at.is_some() && !self.is_active_at(now) {
            self.started_at = None;
        }
    }
}

#[derive(Debug, Default)]
pub struct ShellState {
    pub menu_open: bool,
    pub show_help: bool,
    pub pulse: MeasurePulse,
    /// Set by the hero buttons, consumed when the measure section is laid out
    pub scroll_to_demo: bool,
}

impl ShellState {
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Following a navbar link always closes the mobile menu
    pub fn activate_link(&mut self, link: &NavLink) {
        tracing::debug!("Navigating to {}", link.href);
        self.menu_open = false;
        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window()
            && let Err(e) = window.location().set_href(link.href)
        {
            tracing::warn!("Navigation to {} failed: {e:?}", link.href);
        }
    }

    /// Narrow viewports get the burger menu instead of inline links
    pub fn is_narrow(width: f32) -> bool {
        width < NARROW_WIDTH
    }
}
