use crate::way_filter::WayFilter;
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result, bail};
use loopwalk::NodeId;
use loopwalk::geometry::geodesic_distance;
use loopwalk::ways::{Way, WayNode};
use osmpbfreader::{OsmObj, OsmPbfReader};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Reads a JSON array of ways and keeps the walkable ones.
pub fn load_json_ways(path: &Path, filter: &WayFilter) -> Result<Vec<Way>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let ways: Vec<Way> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing ways from {}", path.display()))?;

    let total = ways.len();
    let ways = filter.retain(ways);
    info!("Loaded {} of {} ways from {}", ways.len(), total, path.display());
    Ok(ways)
}

struct RawWay {
    id: i64,
    tags: BTreeMap<String, String>,
    nodes: Vec<NodeId>,
}

/// Reads the walkable ways around `home` from an OSM PBF extract.
///
/// Two passes: the first collects accepted ways and the nodes they reference,
/// the second resolves coordinates. Only ways with at least one node within
/// `radius` meters of home are kept.
pub fn load_pbf_ways(
    path: &Path,
    filter: &WayFilter,
    home: NodeId,
    radius: f64,
) -> Result<Vec<Way>> {
    info!("Loading OSM ways from {}", path.display());

    let (raw_ways, mut wanted) = pbf_pass1_ways(path, filter)?;
    wanted.insert(home);
    info!(
        "Pass 1 complete: {} ways, {} referenced nodes",
        raw_ways.len(),
        wanted.len()
    );

    let coordinates = pbf_pass2_nodes(path, &wanted)?;
    info!("Pass 2 complete: {} nodes loaded", coordinates.len());

    let Some(&(home_lat, home_lon)) = coordinates.get(&home) else {
        bail!("home node {home} is not in {}", path.display());
    };

    let mut ways = Vec::new();
    for raw in raw_ways {
        let near_home = raw.nodes.iter().any(|id| {
            coordinates.get(id).is_some_and(|&(lat, lon)| {
                geodesic_distance(home_lat, home_lon, lat, lon) <= radius
            })
        });
        if near_home {
            ways.extend(resolve_way(raw, &coordinates));
        }
    }

    info!("Kept {} ways within {} m of {}", ways.len(), radius, home);
    Ok(ways)
}

fn pbf_pass1_ways(path: &Path, filter: &WayFilter) -> Result<(Vec<RawWay>, AHashSet<NodeId>)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = OsmPbfReader::new(BufReader::new(file));

    let mut ways = Vec::new();
    let mut node_ids = AHashSet::new();

    for obj in reader.iter() {
        if let OsmObj::Way(way) = obj? {
            if !filter.accepts(&way.tags) {
                continue;
            }
            let nodes: Vec<NodeId> = way.nodes.iter().map(|n| n.0).collect();
            node_ids.extend(nodes.iter().copied());
            ways.push(RawWay {
                id: way.id.0,
                tags: way
                    .tags
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                nodes,
            });
        }
    }

    Ok((ways, node_ids))
}

fn pbf_pass2_nodes(
    path: &Path,
    wanted: &AHashSet<NodeId>,
) -> Result<AHashMap<NodeId, (f64, f64)>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = OsmPbfReader::new(BufReader::new(file));

    let mut coordinates = AHashMap::with_capacity(wanted.len());
    for obj in reader.iter() {
        if let OsmObj::Node(node) = obj? {
            if wanted.contains(&node.id.0) {
                coordinates.insert(node.id.0, (node.lat(), node.lon()));
            }
        }
    }

    Ok(coordinates)
}

/// Ways cut by the extract boundary reference nodes without coordinates; each
/// resolvable stretch becomes its own way.
fn resolve_way(raw: RawWay, coordinates: &AHashMap<NodeId, (f64, f64)>) -> Vec<Way> {
    let mut pieces: Vec<Vec<WayNode>> = vec![Vec::new()];
    for id in &raw.nodes {
        match coordinates.get(id) {
            Some(&(lat, lon)) => {
                if let Some(piece) = pieces.last_mut() {
                    piece.push(WayNode { id: *id, lat, lon });
                }
            }
            None => pieces.push(Vec::new()),
        }
    }

    pieces
        .into_iter()
        .filter(|nodes| nodes.len() >= 2)
        .map(|nodes| Way {
            id: raw.id,
            tags: raw.tags.clone(),
            nodes,
        })
        .collect()
}
