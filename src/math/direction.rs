//! Cardinal directions and the two angle conventions used around pasting

use crate::core::error::Error;
use crate::core::types::Result;

/// Half-width of the snap window around each cardinal heading, in degrees
const SNAP_WINDOW: f32 = 22.5;

/// Facing of an in-world reference object. Four values only; intermediate
/// headings are rejected by the classifier, never coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardinalDirection {
    North,
    South,
    East,
    West,
}

impl CardinalDirection {
    /// Classify a continuous yaw angle into a cardinal direction.
    ///
    /// Yaw is normalized to [0, 360). Headings follow the in-game yaw
    /// convention: 0° ≈ South, 90° ≈ West, 180° ≈ North, 270° ≈ East.
    /// Yaw further than 22.5° from every cardinal heading returns `None`.
    pub fn classify_yaw(yaw_degrees: f32) -> Option<Self> {
        let yaw = yaw_degrees.rem_euclid(360.0);
        let headings = [
            (0.0, CardinalDirection::South),
            (90.0, CardinalDirection::West),
            (180.0, CardinalDirection::North),
            (270.0, CardinalDirection::East),
        ];
        for (heading, direction) in headings {
            let mut delta = (yaw - heading).abs();
            if delta > 180.0 {
                delta = 360.0 - delta;
            }
            if delta < SNAP_WINDOW {
                return Some(direction);
            }
        }
        None
    }

    /// Rotation applied to a pasted structure for this facing, in degrees:
    /// North 0, East 90, South 180, West 270.
    ///
    /// This is the paste-side convention. It is intentionally distinct from
    /// the yaw-classification convention above; downstream structure
    /// orientation depends on both tables staying separate and literal.
    pub fn rotation_degrees(self) -> f32 {
        match self {
            CardinalDirection::North => 0.0,
            CardinalDirection::East => 90.0,
            CardinalDirection::South => 180.0,
            CardinalDirection::West => 270.0,
        }
    }

    /// Parse a facing keyword ("north", "south", "east", "west")
    pub fn parse(keyword: &str) -> Result<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "north" => Ok(CardinalDirection::North),
            "south" => Ok(CardinalDirection::South),
            "east" => Ok(CardinalDirection::East),
            "west" => Ok(CardinalDirection::West),
            other => Err(Error::InvalidOrientation(format!(
                "unrecognized facing '{}'",
                other
            ))),
        }
    }

    /// Lowercase facing name
    pub fn name(self) -> &'static str {
        match self {
            CardinalDirection::North => "north",
            CardinalDirection::South => "south",
            CardinalDirection::East => "east",
            CardinalDirection::West => "west",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CardinalDirection::*;

    #[test]
    fn test_classify_cardinal_fixtures() {
        assert_eq!(CardinalDirection::classify_yaw(0.0), Some(South));
        assert_eq!(CardinalDirection::classify_yaw(90.0), Some(West));
        assert_eq!(CardinalDirection::classify_yaw(180.0), Some(North));
        assert_eq!(CardinalDirection::classify_yaw(270.0), Some(East));
    }

    #[test]
    fn test_classify_snap_window() {
        assert_eq!(CardinalDirection::classify_yaw(22.49), Some(South));
        assert_eq!(CardinalDirection::classify_yaw(22.51), None);
        assert_eq!(CardinalDirection::classify_yaw(90.0 - 22.49), Some(West));
        assert_eq!(CardinalDirection::classify_yaw(45.0), None);
        assert_eq!(CardinalDirection::classify_yaw(135.0), None);
    }

    #[test]
    fn test_classify_normalizes_yaw() {
        // Wrap-around near 0/360
        assert_eq!(CardinalDirection::classify_yaw(350.0), Some(South));
        assert_eq!(CardinalDirection::classify_yaw(-10.0), Some(South));
        assert_eq!(CardinalDirection::classify_yaw(360.0), Some(South));
        assert_eq!(CardinalDirection::classify_yaw(450.0), Some(West));
    }

    #[test]
    fn test_classify_total_on_range() {
        let mut yaw = 0.0f32;
        while yaw < 360.0 {
            // Never panics; always one of 4 directions or None
            let _ = CardinalDirection::classify_yaw(yaw);
            yaw += 0.25;
        }
    }

    #[test]
    fn test_rotation_degrees_table() {
        assert_eq!(North.rotation_degrees(), 0.0);
        assert_eq!(East.rotation_degrees(), 90.0);
        assert_eq!(South.rotation_degrees(), 180.0);
        assert_eq!(West.rotation_degrees(), 270.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(CardinalDirection::parse("north").unwrap(), North);
        assert_eq!(CardinalDirection::parse("WEST").unwrap(), West);
        assert!(matches!(
            CardinalDirection::parse("up"),
            Err(Error::InvalidOrientation(_))
        ));
    }
}
