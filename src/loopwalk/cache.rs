//! Enumeration results stored on disk, keyed by a SipHash-2-4 content hash.

use loopwalk::{ScoredWalk, WalkConstraints};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const BUFFER_SIZE: usize = 8192;

// Fixed zero key: the hash identifies content, it does not authenticate it.
const SIPHASH_ZERO_KEY: [u8; 16] = [0u8; 16];

const CACHE_FILE: &str = "walks.bincode";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error accessing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode cached walks: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

macro_rules! io_err {
    ($path:expr, $err:expr) => {
        CacheError::Io {
            path: $path.to_path_buf(),
            source: $err,
        }
    };
}

#[derive(Serialize, Deserialize)]
struct CachedWalks {
    key: u64,
    walks: Vec<ScoredWalk>,
}

/// Hash of everything the enumeration depends on: the input file, how it was
/// cut around home, the search settings and the crate version.
pub fn cache_key(
    input: &Path,
    radius: Option<f64>,
    constraints: &WalkConstraints,
) -> Result<u64, CacheError> {
    let mut file = File::open(input).map_err(|e| io_err!(input, e))?;
    let mut hasher = SipHasher24::new_with_key(&SIPHASH_ZERO_KEY);
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let n = file.read(&mut buffer).map_err(|e| io_err!(input, e))?;
        if n == 0 {
            break;
        }
        hasher.write(&buffer[..n]);
    }

    radius.map(f64::to_bits).hash(&mut hasher);
    constraints.home_node.hash(&mut hasher);
    constraints.max_distance.to_bits().hash(&mut hasher);
    constraints.scoring.hash(&mut hasher);
    env!("CARGO_PKG_VERSION").hash(&mut hasher);

    Ok(hasher.finish())
}

pub struct WalkCache {
    path: PathBuf,
}

impl WalkCache {
    pub fn new(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir).map_err(|e| io_err!(dir, e))?;
        Ok(Self {
            path: dir.join(CACHE_FILE),
        })
    }

    /// Cached walks for `key`. A missing, unreadable or stale file is a miss.
    pub fn load(&self, key: u64) -> Option<Vec<ScoredWalk>> {
        let bytes = std::fs::read(&self.path).ok()?;
        let config = bincode::config::standard();

        match bincode::serde::decode_from_slice::<CachedWalks, _>(&bytes, config) {
            Ok((cached, _)) if cached.key == key => {
                info!("Using {} cached walks from {}", cached.walks.len(), self.path.display());
                Some(cached.walks)
            }
            Ok(_) => {
                info!("Cached walks in {} are stale", self.path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn store(&self, key: u64, walks: &[ScoredWalk]) -> Result<(), CacheError> {
        let cached = CachedWalks {
            key,
            walks: walks.to_vec(),
        };
        let bytes = bincode::serde::encode_to_vec(&cached, bincode::config::standard())?;
        std::fs::write(&self.path, bytes).map_err(|e| io_err!(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopwalk::loops::Walk;
    use loopwalk::street_graph::EdgeId;
    use loopwalk::{ScoringPolicy, SelectionOrder};

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("loopwalk-{}-{}", name, std::process::id()))
    }

    fn constraints(max_distance: f64) -> WalkConstraints {
        WalkConstraints {
            home_node: 42,
            max_distance,
            num_walks: 3,
            scoring: ScoringPolicy::TurningPerDistance,
            order: SelectionOrder::Ranked,
        }
    }

    #[test]
    fn test_key_tracks_input_and_settings() {
        let dir = scratch("key");
        std::fs::create_dir_all(&dir).expect("scratch dir");
        let input = dir.join("ways.json");
        std::fs::write(&input, "[]").expect("write input");

        let base = cache_key(&input, None, &constraints(1000.0)).expect("hash");
        assert_eq!(base, cache_key(&input, None, &constraints(1000.0)).expect("hash"));
        assert_ne!(base, cache_key(&input, None, &constraints(1500.0)).expect("hash"));
        assert_ne!(base, cache_key(&input, Some(500.0), &constraints(1000.0)).expect("hash"));

        std::fs::write(&input, "[ ]").expect("rewrite input");
        assert_ne!(base, cache_key(&input, None, &constraints(1000.0)).expect("hash"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_store_then_load_and_invalidate() {
        let dir = scratch("store");
        let cache = WalkCache::new(&dir).expect("cache dir");
        let walks = vec![ScoredWalk {
            walk: Walk {
                nodes: vec![1, 2, 1],
                edges: vec![EdgeId(0), EdgeId(0)],
                distance: 240.0,
                turning: 0.0,
            },
            score: 0.0,
        }];

        assert!(cache.load(7).is_none());
        cache.store(7, &walks).expect("stores");
        assert_eq!(cache.load(7), Some(walks));
        assert!(cache.load(8).is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
