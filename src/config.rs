use crate::errors::ConfigurationError;
use crate::loops::{ScoringPolicy, SelectionOrder};
use crate::street_graph::NodeId;

/// Walk settings as written by the user, either in a RON file or assembled
/// from command line arguments. Nothing here is trusted until [`validate`].
///
/// ```ron
/// (
///     home_node: "4586102951",
///     max_distance: 3000.0,
///     num_walks: 5,
///     scoring: turning_per_distance,
///     randomize: false,
/// )
/// ```
///
/// [`validate`]: WalkSettings::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSettings {
    pub home_node: String,
    /// Meters.
    pub max_distance: f64,
    pub num_walks: i64,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub randomize: bool,
}

/// Validated settings handed to the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkConstraints {
    pub home_node: NodeId,
    pub max_distance: f64,
    pub num_walks: usize,
    pub scoring: ScoringPolicy,
    pub order: SelectionOrder,
}

impl WalkSettings {
    pub fn from_ron(text: &str) -> Result<Self, ConfigurationError> {
        ron::from_str(text).map_err(|e| ConfigurationError::Unparsable(e.to_string()))
    }

    pub fn validate(&self) -> Result<WalkConstraints, ConfigurationError> {
        let home_node = self
            .home_node
            .trim()
            .parse::<NodeId>()
            .map_err(|_| ConfigurationError::InvalidHomeNode(self.home_node.clone()))?;

        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(ConfigurationError::InvalidMaxDistance(self.max_distance));
        }

        let num_walks = usize::try_from(self.num_walks)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigurationError::InvalidWalkCount(self.num_walks))?;

        Ok(WalkConstraints {
            home_node,
            max_distance: self.max_distance,
            num_walks,
            scoring: self.scoring,
            order: if self.randomize {
                SelectionOrder::Randomized
            } else {
                SelectionOrder::Ranked
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> WalkSettings {
        WalkSettings {
            home_node: "4586102951".to_string(),
            max_distance: 3000.0,
            num_walks: 5,
            scoring: ScoringPolicy::default(),
            randomize: false,
        }
    }

    #[test]
    fn test_valid_settings() {
        let constraints = settings().validate().expect("valid");
        assert_eq!(constraints.home_node, 4586102951);
        assert_eq!(constraints.num_walks, 5);
        assert_eq!(constraints.order, SelectionOrder::Ranked);
        assert_eq!(constraints.scoring, ScoringPolicy::TurningPerDistance);
    }

    #[test]
    fn test_rejects_non_numeric_home() {
        let mut s = settings();
        s.home_node = "home".to_string();
        assert_eq!(
            s.validate(),
            Err(ConfigurationError::InvalidHomeNode("home".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_distance_and_count() {
        for bad in [0.0, -10.0, f64::INFINITY] {
            let mut s = settings();
            s.max_distance = bad;
            assert!(matches!(
                s.validate(),
                Err(ConfigurationError::InvalidMaxDistance(_))
            ));
        }
        let mut s = settings();
        s.max_distance = f64::NAN;
        assert!(s.validate().is_err());

        for bad in [0, -3] {
            let mut s = settings();
            s.num_walks = bad;
            assert_eq!(s.validate(), Err(ConfigurationError::InvalidWalkCount(bad)));
        }
    }

    #[test]
    fn test_from_ron() {
        let parsed = WalkSettings::from_ron(
            r#"(
                home_node: "42",
                max_distance: 1500.0,
                num_walks: 3,
                scoring: distance,
                randomize: true,
            )"#,
        )
        .expect("parses");
        let constraints = parsed.validate().expect("valid");
        assert_eq!(constraints.home_node, 42);
        assert_eq!(constraints.scoring, ScoringPolicy::Distance);
        assert_eq!(constraints.order, SelectionOrder::Randomized);

        let defaults = WalkSettings::from_ron(
            r#"(home_node: "42", max_distance: 1500.0, num_walks: 3)"#,
        )
        .expect("parses");
        assert!(!defaults.randomize);
        assert_eq!(defaults.scoring, ScoringPolicy::TurningPerDistance);

        assert!(matches!(
            WalkSettings::from_ron("(home_node: 42"),
            Err(ConfigurationError::Unparsable(_))
        ));
    }
}
