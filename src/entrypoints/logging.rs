/*!
Logging and profiling setup.

- Native logging goes through `tracing-subscriber` with an `EnvFilter`. When
  `RUST_LOG` is unset a default filter is used that keeps map tile and HTTP
  connection chatter out of debug output.
- Web logging is set up by [`WebHandle::new`](super::web::WebHandle::new).
- With the `profiling` feature, a puffin HTTP server can be switched on and off
  at runtime from the help window.
*/

/// Filter used when `RUST_LOG` is not set
#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,eframe::native=warn,egui::context=warn,walkers=info,hyper_util=info,reqwest::connect=info"
    } else {
        "info,eframe::native=warn,egui::context=warn"
    }
}

/// Install the global tracing subscriber. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Runtime toggle for the puffin profiling server
#[derive(Default)]
pub struct Profiler {
    #[cfg(feature = "profiling")]
    server: Option<puffin_http::Server>,
}

impl Profiler {
    /// Address the puffin viewer connects to
    #[cfg(feature = "profiling")]
    const ADDR: &'static str = "127.0.0.1:8585";

    #[cfg(feature = "profiling")]
    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    #[cfg(feature = "profiling")]
    fn start(&mut self) {
        puffin::set_scopes_on(true);
        match puffin_http::Server::new(Self::ADDR) {
            Ok(server) => {
                tracing::info!(
                    "Profiling enabled, to view: cargo install puffin_viewer && puffin_viewer --url {}",
                    Self::ADDR
                );
                self.server = Some(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {e}");
                puffin::set_scopes_on(false);
            }
        }
    }

    #[cfg(feature = "profiling")]
    fn stop(&mut self) {
        puffin::set_scopes_on(false);
        // Dropping the server closes it
        self.server = None;
        tracing::info!("Profiling disabled");
    }

    /// Mark the end of a frame for the profiler
    pub fn finish_frame(&self) {
        #[cfg(feature = "profiling")]
        if self.is_running() {
            profiling::finish_frame!();
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        #[cfg(feature = "profiling")]
        {
            egui::warn_if_debug_build(ui);
            let mut enabled = self.is_running();
            if ui
                .checkbox(&mut enabled, "Enable Profiling Server")
                .changed()
            {
                if enabled {
                    self.start();
                } else {
                    self.stop();
                }
            }
        }
        #[cfg(not(feature = "profiling"))]
        {
            ui.label("Profiling feature is disabled in this build.");
        }
    }
}
