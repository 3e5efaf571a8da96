use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use cabinetkit::{
    init_logging, AppEvent, Config, DesignerState, DirectoryProductSource, EventCategory,
    EventFilter, InMemoryProductSource, ProductSchema, ProductSource,
};

const USAGE: &str = "usage: cabinetkit <room.json> [products.json | products-dir]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(room_path) = args.next() else {
        bail!(USAGE);
    };
    let products_path = args.next();

    let config = match Config::default_path() {
        Ok(path) => Config::load_or_default(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        Err(_) => Config::default(),
    };
    init_logging(&config.logging)?;

    tracing::info!(
        "CabinetKit {} (built {})",
        cabinetkit::VERSION,
        cabinetkit::BUILD_DATE
    );

    let source: Arc<dyn ProductSource> = match products_path {
        Some(path) if path.is_dir() => {
            tracing::debug!("Reading product schemas from {}", path.display());
            Arc::new(DirectoryProductSource::new(path))
        }
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read products from {}", path.display()))?;
            let products = serde_json::from_str::<Vec<ProductSchema>>(&content)
                .with_context(|| format!("Failed to parse products in {}", path.display()))?;
            tracing::debug!("Loaded {} product schemas", products.len());
            Arc::new(InMemoryProductSource::with_products(products))
        }
        None => Arc::new(InMemoryProductSource::default()),
    };

    let mut state = DesignerState::new(&config, source);
    state.events.subscribe(
        EventFilter::Categories(vec![EventCategory::Notice]),
        |event| {
            if let AppEvent::Notice(notice) = event {
                println!("[{}] {}", notice.level, notice.message);
            }
        },
    );
    let Some(report) = state.load_from_file(&room_path).await? else {
        bail!("Another restore is already running");
    };

    let scene = state.scene.read();
    println!("Room:        {}", scene.room.name);
    println!("Cabinets:    {}", report.created.len());
    println!("Skipped:     {}", report.skipped.len());
    println!("Views:       {}", scene.views.len());
    println!("Dropped refs: {}", report.dropped_references());
    if !report.catalog.failed.is_empty() {
        println!("Missing products: {}", report.catalog.failed_ids().join(", "));
    }

    Ok(())
}
