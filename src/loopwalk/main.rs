use anyhow::{Context, Result, bail};
use clap::Parser;
use loopwalk::loops::{NoopObserver, SearchLimits, WalkEnumerator, select_walks};
use loopwalk::street_graph::{build_graph, node_visualisation_query, simplify_graph};
use loopwalk::ways::Way;
use loopwalk::{
    ConfigurationError, LoopError, NodeId, ScoredWalk, ScoringPolicy, StreetGraph,
    WalkConstraints, WalkSettings,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cache;
mod export;
mod follow;
mod input;
mod way_filter;

use cache::{WalkCache, cache_key};
use follow::Follower;
use way_filter::WayFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Finds straight circular walks from home", long_about = None)]
struct Args {
    /// RON settings file; command line values override its fields.
    #[arg(long, env = "LOOPWALK_SETTINGS")]
    settings: Option<PathBuf>,

    /// OSM node id where every walk starts and ends.
    #[arg(long, env = "LOOPWALK_HOME")]
    home: Option<String>,

    /// Maximum walk length in meters.
    #[arg(long, env = "LOOPWALK_MAX_DISTANCE")]
    max_distance: Option<f64>,

    /// Number of walks to keep.
    #[arg(long, env = "LOOPWALK_NUM_WALKS")]
    num_walks: Option<i64>,

    /// `distance` or `turning`.
    #[arg(long, env = "LOOPWALK_SCORING")]
    scoring: Option<ScoringPolicy>,

    /// Hand back the kept walks in random order.
    #[arg(long)]
    randomize: bool,

    /// JSON array of ways.
    #[arg(long, env = "LOOPWALK_WAYS", conflicts_with = "osm_pbf")]
    ways: Option<PathBuf>,

    /// OSM PBF extract containing the neighbourhood.
    #[arg(long, env = "LOOPWALK_OSM_PBF")]
    osm_pbf: Option<PathBuf>,

    /// Meters around home to read from the PBF extract.
    #[arg(long, default_value_t = 500.0)]
    radius: f64,

    /// Print the node query of every kept walk.
    #[arg(long)]
    overpass: bool,

    /// Write the kept walks as a GeoJSON FeatureCollection.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Directory for cached enumeration results.
    #[arg(long, env = "LOOPWALK_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Pause before every expansion of the search.
    #[arg(long)]
    follow: bool,

    #[arg(long)]
    max_expansions: Option<usize>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let constraints = resolve_settings(&args)?.validate()?;
    info!(
        "Looking for {} walks from {} within {} m, scored by {}",
        constraints.num_walks, constraints.home_node, constraints.max_distance, constraints.scoring
    );

    let filter = WayFilter::default();
    let (ways, input_path, radius) = match (&args.ways, &args.osm_pbf) {
        (Some(path), _) => (input::load_json_ways(path, &filter)?, path, None),
        (None, Some(path)) => (
            input::load_pbf_ways(path, &filter, constraints.home_node, args.radius)?,
            path,
            Some(args.radius),
        ),
        (None, None) => bail!("no map data: pass --ways or --osm-pbf"),
    };

    let graph = reduce(&ways, constraints.home_node)?;

    let walks = enumerate(&args, &graph, &constraints, input_path, radius)?;

    let selected = select_walks(walks, constraints.num_walks, constraints.order, &mut rand::rng());
    if selected.is_empty() {
        info!("No walk fits within {} m", constraints.max_distance);
    }

    let mut stdout = io::stdout().lock();
    for (i, scored) in selected.iter().enumerate() {
        info!(
            "#{} score {:.6} distance {:.0} m: {:?}",
            i + 1,
            scored.score,
            scored.walk.distance,
            scored.walk.nodes
        );
        if args.overpass {
            let expanded = scored.walk.expand(&graph)?;
            writeln!(stdout, "{}", node_visualisation_query(&expanded))?;
        }
    }

    if let Some(path) = &args.export {
        let collection = export::walks_to_features(&graph, &selected)?;
        export::write_geojson(path, &collection)?;
        info!("Wrote {} walks to {}", selected.len(), path.display());
    }

    Ok(())
}

/// Settings file first, then command line and environment on top.
fn resolve_settings(args: &Args) -> Result<WalkSettings> {
    let base = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Some(WalkSettings::from_ron(&text)?)
        }
        None => None,
    };

    let home_node = args
        .home
        .clone()
        .or_else(|| base.as_ref().map(|b| b.home_node.clone()))
        .context("no home node: pass --home or set it in the settings file")?;
    let max_distance = args
        .max_distance
        .or(base.as_ref().map(|b| b.max_distance))
        .context("no maximum distance: pass --max-distance or set it in the settings file")?;
    let num_walks = args
        .num_walks
        .or(base.as_ref().map(|b| b.num_walks))
        .unwrap_or(1);

    Ok(WalkSettings {
        home_node,
        max_distance,
        num_walks,
        scoring: args
            .scoring
            .or(base.as_ref().map(|b| b.scoring))
            .unwrap_or_default(),
        randomize: args.randomize || base.as_ref().is_some_and(|b| b.randomize),
    })
}

/// Builds and simplifies the street graph around home.
fn reduce(ways: &[Way], home: NodeId) -> Result<StreetGraph, LoopError> {
    let mut graph = build_graph(ways)?;
    if !graph.contains_node(home) {
        return Err(ConfigurationError::HomeNotInGraph(home).into());
    }
    simplify_graph(&mut graph, ways, home);
    Ok(graph)
}

fn enumerate(
    args: &Args,
    graph: &StreetGraph,
    constraints: &WalkConstraints,
    input_path: &Path,
    radius: Option<f64>,
) -> Result<Vec<ScoredWalk>> {
    let cache = match &args.cache_dir {
        Some(dir) if !args.follow => {
            let key = cache_key(input_path, radius, constraints)?;
            let cache = WalkCache::new(dir)?;
            if let Some(walks) = cache.load(key) {
                return Ok(walks);
            }
            Some((cache, key))
        }
        _ => None,
    };

    let limits = SearchLimits {
        max_expansions: args.max_expansions,
        deadline: args
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    };
    let enumerator = WalkEnumerator::new(graph, constraints.home_node, constraints.max_distance)?
        .with_scoring(constraints.scoring)
        .with_limits(limits);

    let result = if args.follow {
        let stdin = io::stdin();
        enumerator.run_with(&mut Follower::new(stdin.lock(), io::stderr()))
    } else {
        enumerator.run_with(&mut NoopObserver)
    };

    if result.truncated {
        warn!(
            "Search stopped early after {} expansions, results are partial",
            result.expansions
        );
    } else if let Some((cache, key)) = cache {
        cache.store(key, &result.walks)?;
    }

    Ok(result.walks)
}
