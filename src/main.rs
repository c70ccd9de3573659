use anyhow::{bail, Context, Result};
use clap::Parser;
use geosearch_map::{
    sdk::config::{renderer_config_from_env, SearchConfig},
    sdk::map::{MemoryCanvas, ResultRenderer},
    sdk::search::{ConsolePage, PageLocation, SearchClient, SearchOrchestrator},
    sdk::util::log::init_logging,
    InteractionMode,
};
use std::{fs::File, io::Write, path::PathBuf};

/// Run a map search headlessly and dump the resulting map state
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Form field to submit as `name=value` (repeatable, e.g. --field q=cafes --field radius=5)
    #[arg(short, long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Simulate loading this page location instead of submitting a form (e.g. "/results/?q=cafes")
    #[arg(long, conflicts_with_all = ["fields", "embedded", "reset"])]
    location: Option<String>,

    /// Render a pre-embedded SearchResponse JSON file without contacting the server
    #[arg(long, conflicts_with_all = ["fields", "reset"])]
    embedded: Option<PathBuf>,

    /// Trigger the reset control
    #[arg(long, conflicts_with = "fields")]
    reset: bool,

    /// Submit by navigating to the results page instead of fetching in place
    #[arg(long)]
    navigate: bool,

    /// Where to write the final map state
    #[arg(short, long, default_value = "map_state.json")]
    output: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Map canvas size in pixels, as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x768", value_parser = parse_size)]
    size: (u32, u32),
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{}`", raw))
}

fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{}`", raw))?;
    let w = w.parse().map_err(|e| format!("bad width: {}", e))?;
    let h = h.parse().map_err(|e| format!("bad height: {}", e))?;
    Ok((w, h))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    // --- 1. Configuration ---
    let mut config = SearchConfig::from_env().context("Invalid search configuration")?;
    if cli.navigate {
        config.mode = InteractionMode::Navigate;
    }
    let renderer_config = renderer_config_from_env().context("Invalid renderer configuration")?;
    log::info!("Using search endpoint {}{}", config.base_url, config.query_path);

    // --- 2. Wiring ---
    let (width, height) = cli.size;
    let canvas = MemoryCanvas::new(width, height, renderer_config.default_view);
    let renderer = ResultRenderer::new(canvas, renderer_config);
    let client = SearchClient::new(&config.base_url, &config.query_path)
        .context("Failed to build HTTP client")?;
    let orchestrator = SearchOrchestrator::new(client, renderer, ConsolePage, config);

    // --- 3. Exactly one trigger per run ---
    if let Some(path) = &cli.embedded {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read embedded results from {}", path.display()))?;
        orchestrator.render_embedded(&json);
    } else if let Some(location) = &cli.location {
        let location = PageLocation::parse(location);
        if orchestrator.on_page_load(&location).await.is_none() {
            log::warn!("{} is not a results page with a query; nothing fetched", location.path);
        }
    } else if cli.reset {
        orchestrator.reset();
    } else if !cli.fields.is_empty() {
        let phase = orchestrator.submit_form(cli.fields.clone()).await;
        log::info!("Search finished in phase {:?}", phase);
    } else {
        bail!("Nothing to do: pass --field, --location, --embedded or --reset");
    }

    // --- 4. Output ---
    let snapshot = orchestrator.renderer().canvas().snapshot();
    let json_output = serde_json::to_string_pretty(&snapshot)?;
    let mut file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    file.write_all(json_output.as_bytes())?;
    log::info!(
        "Map state with {} layers written to {}",
        snapshot.layers.len(),
        cli.output.display()
    );

    Ok(())
}
