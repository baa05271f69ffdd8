use std::collections::HashMap;

pub const DEFAULT_PATH: &str = "/etc/sendgrid/sendgrid.toml";
const ENV_PREFIX: &str = "SENDGRID_";

/// Loads sender config from filesystem and merges it with any
/// environment variables prefixed with SENDGRID_.
///
/// This function will panic on error.
///
/// The only required key is `api_key`.
pub fn load_config(path: Option<&str>) -> HashMap<String, String> {
    let mut settings = config::Config::default();

    settings
        .merge(config::File::with_name(path.unwrap_or(DEFAULT_PATH)))
        .unwrap()
        .merge(config::Environment::with_prefix(ENV_PREFIX))
        .unwrap();

    settings.try_into::<HashMap<String, String>>().unwrap()
}
