use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Spring parameters of an animated transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringConfig {
    pub mass: f64,
    pub tension: f64,
    pub friction: f64,
    pub clamp: bool,
    pub precision: f64,
    pub velocity: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            tension: 170.0,
            friction: 26.0,
            clamp: false,
            precision: 0.01,
            velocity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreset {
    Default,
    #[default]
    Gentle,
    Wobbly,
    Stiff,
    Slow,
    Molasses,
}

impl MotionPreset {
    #[must_use]
    pub fn spring(self) -> SpringConfig {
        let (tension, friction) = match self {
            Self::Default => (170.0, 26.0),
            Self::Gentle => (120.0, 14.0),
            Self::Wobbly => (180.0, 12.0),
            Self::Stiff => (210.0, 20.0),
            Self::Slow => (280.0, 60.0),
            Self::Molasses => (280.0, 120.0),
        };
        SpringConfig {
            tension,
            friction,
            ..SpringConfig::default()
        }
    }
}

/// Transition settings: a preset name or explicit spring parameters.
///
/// The chart is carried to hosts that animate; frames themselves are always
/// drawn at their final state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionConfig {
    Preset(MotionPreset),
    Spring(SpringConfig),
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::Preset(MotionPreset::Gentle)
    }
}

impl MotionConfig {
    #[must_use]
    pub fn spring(self) -> SpringConfig {
        match self {
            Self::Preset(preset) => preset.spring(),
            Self::Spring(spring) => spring,
        }
    }
}

impl Serialize for MotionConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Preset(preset) => preset.serialize(serializer),
            Self::Spring(spring) => spring.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MotionConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Preset(MotionPreset),
            Spring(SpringConfig),
        }

        match Raw::deserialize(deserializer) {
            Ok(Raw::Preset(preset)) => Ok(Self::Preset(preset)),
            Ok(Raw::Spring(spring)) => Ok(Self::Spring(spring)),
            Err(_) => Err(D::Error::custom(
                "expected a motion preset name or a spring object",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MotionConfig, MotionPreset};

    #[test]
    fn presets_and_springs_deserialize() {
        let preset: MotionConfig = serde_json::from_str(r#""wobbly""#).expect("preset");
        assert_eq!(preset, MotionConfig::Preset(MotionPreset::Wobbly));
        assert_eq!(preset.spring().tension, 180.0);

        let spring: MotionConfig =
            serde_json::from_str(r#"{"tension": 300, "friction": 10}"#).expect("spring");
        assert_eq!(spring.spring().friction, 10.0);
        assert_eq!(spring.spring().mass, 1.0);

        assert!(serde_json::from_str::<MotionConfig>(r#""bouncy""#).is_err());
    }

    #[test]
    fn gentle_is_the_default_preset() {
        let spring = MotionConfig::default().spring();
        assert_eq!((spring.tension, spring.friction), (120.0, 14.0));
    }
}
