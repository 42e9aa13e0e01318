use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub bench: BenchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding the persisted catalog
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BenchConfig {
    pub sizes: Vec<usize>,
    pub lookup_samples: usize,
    pub range_min: f64,
    pub range_max: f64,
    pub top_n: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Config {
    /// Load relative to the current working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| base.join("config").join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .set_default("storage.path", "data/catalog.json")?
            .set_default("logging.filter", "pricewatch_bench=info,pricewatch_catalog=info")?
            .set_default("bench.sizes", vec![10_000i64, 50_000, 100_000])?
            .set_default("bench.lookup_samples", 1_000i64)?
            .set_default("bench.range_min", 100_000.0)?
            .set_default("bench.range_max", 500_000.0)?
            .set_default("bench.top_n", 100i64)?
            // Every file is optional; the defaults above are complete
            .add_source(config::File::with_name(&file("default")).required(false))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg.. `PRICEWATCH_BENCH__TOP_N=10` sets `bench.top_n`
            .add_source(config::Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
