use loopwalk::ways::Way;

/// Anything with OSM style key/value tags.
pub trait TagLookup {
    fn tag_value(&self, key: &str) -> Option<&str>;
}

impl TagLookup for Way {
    fn tag_value(&self, key: &str) -> Option<&str> {
        self.tag(key)
    }
}

impl TagLookup for osmpbfreader::Tags {
    fn tag_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|s| s.as_str())
    }
}

/// A banned tag; `None` bans the key whatever its value.
pub type BannedTag = (&'static str, Option<&'static str>);

#[derive(Debug, Clone)]
pub struct WayFilter {
    pub banned: Vec<BannedTag>,
    pub required: Vec<&'static str>,
}

impl Default for WayFilter {
    /// Walkable streets: no buildings, sidewalks drawn as separate ways,
    /// service roads, lawns, sports pitches or parking aisles.
    fn default() -> Self {
        Self {
            banned: vec![
                ("building", None),
                ("footway", None),
                ("highway", Some("service")),
                ("landuse", Some("grass")),
                ("leisure", Some("pitch")),
                ("service", Some("parking_aisle")),
            ],
            required: vec!["highway"],
        }
    }
}

impl WayFilter {
    pub fn accepts<T: TagLookup + ?Sized>(&self, tags: &T) -> bool {
        let banned = self.banned.iter().any(|(key, value)| match tags.tag_value(key) {
            Some(found) => value.is_none_or(|v| v == found),
            None => false,
        });
        if banned {
            return false;
        }
        self.required.iter().all(|key| tags.tag_value(key).is_some())
    }

    pub fn retain(&self, ways: Vec<Way>) -> Vec<Way> {
        ways.into_iter().filter(|w| self.accepts(w)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn way() -> Way {
        Way::new(1, Vec::new())
    }

    #[test]
    fn test_requires_highway() {
        let filter = WayFilter::default();
        assert!(!filter.accepts(&way()));
        assert!(!filter.accepts(&way().with_tag("name", "Rue Saint-Denis")));
        assert!(filter.accepts(&way().with_tag("highway", "residential")));
    }

    #[test]
    fn test_banned_keys_and_values() {
        let filter = WayFilter::default();
        let street = || way().with_tag("highway", "footway");

        assert!(filter.accepts(&street()));
        assert!(!filter.accepts(&street().with_tag("footway", "sidewalk")));
        assert!(!filter.accepts(&street().with_tag("building", "yes")));
        assert!(!filter.accepts(&way().with_tag("highway", "service")));
        assert!(!filter.accepts(&street().with_tag("service", "parking_aisle")));
        assert!(filter.accepts(&street().with_tag("service", "alley")));
        assert!(!filter.accepts(&street().with_tag("leisure", "pitch")));
        assert!(filter.accepts(&street().with_tag("leisure", "park")));
        assert!(!filter.accepts(&street().with_tag("landuse", "grass")));
    }

    #[test]
    fn test_retain() {
        let ways = vec![
            way().with_tag("highway", "residential"),
            way().with_tag("building", "house"),
        ];
        assert_eq!(WayFilter::default().retain(ways).len(), 1);
    }
}
