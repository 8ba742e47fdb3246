//! Light/dark theme preference
//!
//! [`ThemeStore`] is the only writer of the persisted `nav-theme` value.
//! Everything else observes it through a `watch` subscription.

use crate::app::storage::StorageBackend;
use egui::Color32;
use tokio::sync::watch;

/// Storage key of the persisted preference
pub const THEME_STORAGE_KEY: &str = "nav-theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// Icon of the navbar toggle: shows the theme you switch to
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Self::Light => "🌑",
            Self::Dark => "☀",
        }
    }

    pub fn route_color(self) -> Color32 {
        match self {
            Self::Light => Color32::from_rgb(0x2d, 0x7b, 0xf0),
            Self::Dark => Color32::from_rgb(0x4c, 0x9a, 0xff),
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            Self::Light => egui::Visuals::light(),
            Self::Dark => egui::Visuals::dark(),
        }
    }
}

pub struct ThemeStore {
    backend: Box<dyn StorageBackend>,
    tx: watch::Sender<ThemePreference>,
}

impl ThemeStore {
    /// With `ignore_persisted` the store starts on light, but still saves changes.
    pub fn new(backend: Box<dyn StorageBackend>, ignore_persisted: bool) -> Self {
        let (tx, _) = watch::channel(ThemePreference::default());
        let store = Self { backend, tx };
        if ignore_persisted {
            tracing::info!("Ignoring persisted theme (--ignore-persisted flag)");
        } else {
            store.tx.send_replace(store.get_preference());
        }
        tracing::debug!("Initial theme: {}", store.current().as_str());
        store
    }

    /// The persisted preference. Light when missing, malformed or unreadable.
    pub fn get_preference(&self) -> ThemePreference {
        read_preference(self.backend.as_ref())
    }

    /// Persist `preference` and publish it to subscribers
    pub fn set_preference(&self, preference: ThemePreference) {
        if let Err(e) = self
            .backend
            .set_string(THEME_STORAGE_KEY, preference.as_str())
        {
            tracing::warn!("Failed to persist theme preference: {e}");
        }
        self.tx.send_replace(preference);
    }

    pub fn toggle(&self) -> ThemePreference {
        let next = self.current().toggled();
        self.set_preference(next);
        next
    }

    /// Last published value
    pub fn current(&self) -> ThemePreference {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemePreference> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

fn read_preference(backend: &dyn StorageBackend) -> ThemePreference {
    match backend.get_string(THEME_STORAGE_KEY) {
        Ok(Some(value)) => ThemePreference::parse(&value).unwrap_or_else(|| {
            tracing::debug!("Ignoring malformed theme value {value:?}");
            ThemePreference::default()
        }),
        Ok(None) => ThemePreference::default(),
        Err(e) => {
            tracing::debug!("Could not read theme preference: {e}");
            ThemePreference::default()
        }
    }
}
