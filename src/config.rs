use std::env;

pub const DEFAULT_NDBC_BASE_URL: &str = "https://www.ndbc.noaa.gov/data/realtime2";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub ndbc_base_url: String,
    pub odo_model_path: String,
    pub multi_output_model_path: String,
    pub normalize_sentinels: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: var_or("SERVER_HOST", "0.0.0.0")?,
            server_port: var_or("SERVER_PORT", "8080")?.parse().unwrap_or(8080),
            ndbc_base_url: var_or("NDBC_BASE_URL", DEFAULT_NDBC_BASE_URL)?,
            odo_model_path: var_or("ODO_MODEL_PATH", "models/odo_model.json")?,
            multi_output_model_path: var_or(
                "MULTI_OUTPUT_MODEL_PATH",
                "models/multi_output_model.json",
            )?,
            normalize_sentinels: matches!(
                var_or("NORMALIZE_SENTINELS", "false")?
                    .to_ascii_lowercase()
                    .as_str(),
                "1" | "true" | "yes"
            ),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Reads an environment variable, falling back to `default` when it is unset.
/// A variable that is set but not valid unicode is still an error.
fn var_or(name: &str, default: &str) -> Result<String, env::VarError> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e),
    }
}
