use anyhow::Context;
use pricewatch_bench::{run_size, Measurement, CSV_HEADER};
use pricewatch_catalog::Catalog;
use pricewatch_store::{Config, JsonFileRepository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut rng = match config.bench.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("{}", CSV_HEADER);

    // Time hydrating the persisted catalog, if there is one
    if config.storage.path.exists() {
        let start = Instant::now();
        let repository = JsonFileRepository::open(&config.storage.path)
            .with_context(|| format!("Failed to open {}", config.storage.path.display()))?;
        let catalog = Catalog::open(repository).context("Failed to hydrate catalog")?;
        let row = Measurement {
            structure: "Catalog",
            operation: "hydrate",
            n: catalog.len(),
            elapsed: start.elapsed(),
        };
        tracing::info!(sizes = ?catalog.index_sizes(), "Persisted catalog loaded");
        println!("{}", row.csv_row());
    }

    for &n in &config.bench.sizes {
        tracing::info!("Generating {} mock records", n);
        for row in run_size(n, &config.bench, &mut rng) {
            println!("{}", row.csv_row());
        }
    }

    Ok(())
}
