use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, JsonValue};
use loopwalk::errors::DataError;
use loopwalk::street_graph::path_coordinates;
use loopwalk::{ScoredWalk, StreetGraph};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One LineString feature per walk, in the given order, along every node walked.
pub fn walks_to_features(
    graph: &StreetGraph,
    walks: &[ScoredWalk],
) -> Result<FeatureCollection, DataError> {
    let features = walks
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let rank = i + 1;
            let expanded = scored.walk.expand(graph)?;
            let line = path_coordinates(graph, &expanded)?
                .into_iter()
                .map(|(lon, lat)| vec![lon, lat])
                .collect();

            let mut properties: serde_json::map::Map<String, JsonValue> =
                serde_json::map::Map::new();
            properties.insert(String::from("rank"), JsonValue::from(rank));
            properties.insert(String::from("score"), JsonValue::from(scored.score));
            properties.insert(
                String::from("distance_m"),
                JsonValue::from(scored.walk.distance),
            );

            Ok(Feature {
                bbox: None,
                geometry: Some(geojson::Geometry {
                    bbox: None,
                    value: geojson::Value::LineString(line),
                    foreign_members: None,
                }),
                id: Some(geojson::feature::Id::Number(rank.into())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<Feature>, DataError>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), collection)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
