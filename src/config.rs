use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::ConfigError, input::InputTuning, orientation::LookTuning, physics::Hull,
    physics::MotionTuning,
};

/// Every tunable constant of the controller. Missing tables or keys fall
/// back to their defaults, so an empty file is a valid configuration.
///
/// ```toml
/// [motion]
/// walk_speed = 5.0
/// scale_gravity_by_dt = true
///
/// [look]
/// drag_sensitivity = 150.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub motion: MotionTuning,
    pub look: LookTuning,
    pub hull: Hull,
    pub input: InputTuning,
    /// Half-size of the block box handed to the picker, in blocks.
    pub pick_radius: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            motion: MotionTuning::default(),
            look: LookTuning::default(),
            hull: Hull::default(),
            input: InputTuning::default(),
            pick_radius: 4,
        }
    }
}

impl Tuning {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Self = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "loaded tuning");
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.motion;
        let l = &self.look;
        let h = &self.hull;

        let finite = [
            ("motion.walk_speed", m.walk_speed),
            ("motion.jump_velocity", m.jump_velocity),
            ("motion.gravity_kick", m.gravity_kick),
            ("motion.ground_stick_impulse", m.ground_stick_impulse),
            ("motion.flight_stick_impulse", m.flight_stick_impulse),
            ("look.smoothing_rate", l.smoothing_rate),
            ("look.stick_speed", l.stick_speed),
            ("look.click_slop", l.click_slop),
            ("hull.eye_height", h.eye_height),
            ("hull.head_probe_scale", h.head_probe_scale),
            ("input.dead_zone", self.input.dead_zone),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite",
                });
            }
        }

        let positive = [
            ("motion.ground_damping", m.ground_damping),
            ("motion.air_damping", m.air_damping),
            ("motion.flight_damping", m.flight_damping),
            ("look.drag_sensitivity", l.drag_sensitivity),
            ("hull.footprint_size", h.footprint_size),
            ("hull.face_half_width", h.face_half_width),
            ("hull.height", h.height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        if h.footprint_size >= 1.0 || h.face_half_width >= 0.5 {
            return Err(ConfigError::Invalid {
                field: "hull",
                reason: "the actor must fit inside a single block column",
            });
        }
        if !(0.0..1.0).contains(&self.input.dead_zone) {
            return Err(ConfigError::Invalid {
                field: "input.dead_zone",
                reason: "must be in [0, 1)",
            });
        }
        if self.pick_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "pick_radius",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Tuning;
    use crate::error::ConfigError;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Tuning::from_toml_str("").unwrap(), Tuning::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let tuning = Tuning::from_toml_str(
            "pick_radius = 6\n[motion]\nwalk_speed = 5.5\nscale_gravity_by_dt = true\n",
        )
        .unwrap();
        assert_eq!(tuning.pick_radius, 6);
        assert_eq!(tuning.motion.walk_speed, 5.5);
        assert!(tuning.motion.scale_gravity_by_dt);
        assert_eq!(tuning.motion.jump_velocity, 8.0);
        assert_eq!(tuning.look, Default::default());
    }

    #[test]
    fn zero_damping_is_rejected() {
        let err = Tuning::from_toml_str("[motion]\nground_damping = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "motion.ground_damping",
                ..
            }
        ));
    }

    #[test]
    fn oversized_hull_is_rejected() {
        let err = Tuning::from_toml_str("[hull]\nfootprint_size = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "hull", .. }));
    }

    #[test]
    fn syntax_errors_surface_as_parse_errors() {
        assert!(matches!(
            Tuning::from_toml_str("[motion\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Tuning::load("/nonexistent/voxwalk.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
