/// Placeholder secret shipped in the binary. Deployments must override it via
/// `ETAGTRACK_SECRET` or first-contact identifiers become recomputable by
/// anyone who reads the source.
pub const DEFAULT_SECRET: &str = "etagtrack-dev-secret-override-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Server secret folded into first-contact identifier derivation.
    pub secret: String,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("ETAGTRACK_PORT")
                .unwrap_or_else(|_| "8090".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            secret: std::env::var("ETAGTRACK_SECRET")
                .unwrap_or_else(|_| DEFAULT_SECRET.to_string()),
            static_dir: std::env::var("ETAGTRACK_STATIC_DIR")
                .unwrap_or_else(|_| "./static".to_string()),
        })
    }

    /// True when the deployer has not overridden the built-in secret.
    pub fn secret_is_default(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}
