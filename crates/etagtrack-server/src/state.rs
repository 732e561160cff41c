use std::sync::Arc;

use tera::Tera;

use etagtrack_core::{config::Config, record::RecordStore};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Identifier → record map. Owns all client records; internally locked.
    pub store: RecordStore,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Compiled templates. `index.html` is embedded at build time so the
    /// binary works without a templates directory on disk; the `.html` name
    /// keeps Tera's HTML autoescaping on, which is what makes reflecting the
    /// stored note safe.
    pub templates: Tera,
}

impl AppState {
    /// Construct a new `AppState` around the given config.
    ///
    /// Fails only if the embedded template does not parse, which a unit test
    /// pins down.
    pub fn new(config: Config) -> Result<Self, tera::Error> {
        let mut templates = Tera::default();
        templates.add_raw_template("index.html", include_str!("../templates/index.html"))?;
        Ok(Self {
            store: RecordStore::new(),
            config: Arc::new(config),
            templates,
        })
    }
}
