use crate::domain::metrics::WindowConfig;
use crate::domain::selection::{Choice, ResultsSlider};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub ebird: EbirdSettings,
    pub twelvedata: TwelveDataSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8050".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_seconds: 15 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SnapshotSettings {
    pub mode: SnapshotMode,
    pub path: PathBuf,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self::file("data/snapshot.csv")
    }
}

impl SnapshotSettings {
    fn file(path: &str) -> Self {
        Self {
            mode: SnapshotMode::File,
            path: PathBuf::from(path),
        }
    }
}

/// Provider field names for one observation object. The upstream contract is
/// not pinned down, so every name can be overridden.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BirdFieldMap {
    pub species_code: String,
    pub common_name: String,
    pub scientific_name: String,
    pub location_name: String,
    pub observed_at: String,
    pub how_many: String,
    pub lat: String,
    pub lng: String,
}

impl Default for BirdFieldMap {
    fn default() -> Self {
        Self {
            species_code: "speciesCode".to_string(),
            common_name: "comName".to_string(),
            scientific_name: "sciName".to_string(),
            location_name: "locName".to_string(),
            observed_at: "obsDt".to_string(),
            how_many: "howMany".to_string(),
            lat: "lat".to_string(),
            lng: "lng".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EbirdSettings {
    pub base_url: String,
    pub api_key: String,
    pub token_header: String,
    pub path_template: String,
    pub fields: BirdFieldMap,
    pub regions: Vec<Choice>,
    pub default_region: String,
    pub results: ResultsSlider,
    pub snapshot: SnapshotSettings,
}

impl Default for EbirdSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.ebird.org/v2/data/obs/".to_string(),
            api_key: String::new(),
            token_header: "X-eBirdApiToken".to_string(),
            path_template: "${region}/recent".to_string(),
            fields: BirdFieldMap::default(),
            regions: vec![
                Choice::new("US-NY", "New York"),
                Choice::new("US-CA", "California"),
                Choice::new("US-TX", "Texas"),
                Choice::new("US-FL", "Florida"),
                Choice::new("US-PA", "Pennsylvania"),
                Choice::new("US-MA", "Massachusetts"),
                Choice::new("US-WA", "Washington"),
                Choice::new("US-OH", "Ohio"),
                Choice::new("US-CO", "Colorado"),
                Choice::new("US-VA", "Virginia"),
            ],
            default_region: "US-NY".to_string(),
            results: ResultsSlider::default(),
            snapshot: SnapshotSettings::file("data/bird_data.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TwelveDataSettings {
    pub base_url: String,
    pub api_key: String,
    pub interval: String,
    pub output_size: u32,
    pub symbols: Vec<Choice>,
    pub default_symbol: String,
    pub windows: WindowConfig,
    pub refresh_seconds: u64,
    pub snapshot: SnapshotSettings,
}

impl Default for TwelveDataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twelvedata.com".to_string(),
            api_key: String::new(),
            interval: "1day".to_string(),
            output_size: 365,
            symbols: vec![
                Choice::new("AAPL", "Apple"),
                Choice::new("TSLA", "Tesla"),
                Choice::new("MSFT", "Microsoft"),
                Choice::new("AMZN", "Amazon"),
                Choice::new("GOOGL", "Google"),
            ],
            default_symbol: "AAPL".to_string(),
            windows: WindowConfig::default(),
            refresh_seconds: 60,
            snapshot: SnapshotSettings::file("data/stock_data.csv"),
        }
    }
}

impl AppConfig {
    /// Region preselected in the dropdown; falls back to the first configured one.
    pub fn default_region(&self) -> anyhow::Result<Choice> {
        default_choice(&self.ebird.regions, &self.ebird.default_region)
            .context("ebird.regions must not be empty")
    }

    pub fn default_symbol(&self) -> anyhow::Result<Choice> {
        default_choice(&self.twelvedata.symbols, &self.twelvedata.default_symbol)
            .context("twelvedata.symbols must not be empty")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let results = &self.ebird.results;
        if results.min > results.max {
            bail!(
                "ebird.results.min ({}) is greater than ebird.results.max ({})",
                results.min,
                results.max
            );
        }
        if self.twelvedata.refresh_seconds == 0 {
            bail!("twelvedata.refresh_seconds must be positive");
        }
        if self.ebird.api_key.is_empty() {
            tracing::warn!("ebird.api_key is not set; bird requests will be rejected upstream");
        }
        if self.twelvedata.api_key.is_empty() {
            tracing::warn!("twelvedata.api_key is not set; stock requests will be rejected upstream");
        }
        self.default_region()?;
        self.default_symbol()?;
        Ok(())
    }
}

fn default_choice(choices: &[Choice], code: &str) -> Option<Choice> {
    Choice::find(choices, code).or_else(|| choices.first()).cloned()
}

/// Load `<path>` (TOML/YAML/JSON, optional) layered under `DASHBOARD__*`
/// environment variables, e.g. `DASHBOARD__EBIRD__API_KEY`.
pub fn load_app_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

/// Replace template variables in a URL or query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("region".to_string(), "US-NY".to_string());

        let path = prepare_query("${region}/recent", &vars);

        assert_eq!(path, "US-NY/recent");
    }

    #[test]
    fn test_default_options() {
        let config = AppConfig::default();

        assert_eq!(config.ebird.regions.len(), 10);
        assert_eq!(config.default_region().unwrap().code, "US-NY");
        assert_eq!(config.default_symbol().unwrap().code, "AAPL");
        assert_eq!(config.ebird.results.default, 60);
        assert_eq!(config.twelvedata.output_size, 365);
        assert_eq!(config.twelvedata.windows.long_ma, 200);
        assert_eq!(config.twelvedata.refresh_seconds, 60);
    }

    #[test]
    fn test_unknown_default_falls_back_to_first() {
        let mut config = AppConfig::default();
        config.twelvedata.default_symbol = "NOPE".to_string();

        assert_eq!(config.default_symbol().unwrap().code, "AAPL");
    }

    #[test]
    fn test_empty_regions_is_rejected() {
        let mut config = AppConfig::default();
        config.ebird.regions.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[ebird]
api_key = "secret"
default_region = "US-CA"

[ebird.results]
max = 100

[twelvedata.windows]
volatility = 10

[twelvedata.snapshot]
mode = "memory"
path = "unused.csv"
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = load_app_config(&path).unwrap();

        assert_eq!(config.ebird.api_key, "secret");
        assert_eq!(config.default_region().unwrap().name, "California");
        assert_eq!(config.ebird.results.max, 100);
        assert_eq!(config.ebird.results.min, 10);
        assert_eq!(config.twelvedata.windows.volatility, 10);
        assert_eq!(config.twelvedata.windows.short_ma, 50);
        assert_eq!(config.twelvedata.snapshot.mode, SnapshotMode::Memory);
        assert_eq!(config.ebird.snapshot.mode, SnapshotMode::File);
    }
}
