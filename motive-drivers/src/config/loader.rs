//! Routine file loading

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use motive_core::config::ProfileConfig;
use motive_core::traits::{Clock, PidController};
use motive_core::{ProfileError, StepSequencer, StepSpec, TravelDirection, MAX_STEPS};

/// Routine loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// File could not be read
    Io(std::io::ErrorKind),
    /// TOML syntax or type error
    Toml(toml::de::Error),
    /// Routine does not fit the sequencer
    Profile(ProfileError),
    /// `kind` is not one of move, turn, pause, curve
    UnknownStepKind { index: usize },
    /// A field the step kind needs is absent
    MissingField {
        index: usize,
        field: &'static str,
    },
}

impl From<toml::de::Error> for LoadError {
    fn from(e: toml::de::Error) -> Self {
        LoadError::Toml(e)
    }
}

impl From<ProfileError> for LoadError {
    fn from(e: ProfileError) -> Self {
        LoadError::Profile(e)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.kind())
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(kind) => write!(f, "cannot read routine file: {kind}"),
            LoadError::Toml(e) => write!(f, "invalid routine file: {e}"),
            LoadError::Profile(ProfileError::CapacityExceeded) => {
                write!(f, "routine has more than {MAX_STEPS} steps")
            }
            LoadError::UnknownStepKind { index } => write!(f, "step {index}: unknown kind"),
            LoadError::MissingField { index, field } => {
                write!(f, "step {index}: missing field `{field}`")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

/// Raw `[[step]]` entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepEntry {
    kind: String,
    direction: Option<TravelDirection>,
    distance: Option<f32>,
    heading: Option<f32>,
    duration_ms: Option<u32>,
    ratio: Option<f32>,
}

impl StepEntry {
    fn to_spec(&self, index: usize) -> Result<StepSpec, LoadError> {
        let require = |value: Option<f32>, field| value.ok_or(LoadError::MissingField { index, field });
        let direction = self.direction.unwrap_or_default();

        match self.kind.as_str() {
            "move" => Ok(StepSpec::Move {
                direction,
                distance: require(self.distance, "distance")?,
            }),
            "turn" => Ok(StepSpec::Turn {
                heading: require(self.heading, "heading")?,
            }),
            "pause" => Ok(StepSpec::Pause {
                duration_ms: self.duration_ms.ok_or(LoadError::MissingField {
                    index,
                    field: "duration_ms",
                })?,
            }),
            "curve" => Ok(StepSpec::Curve {
                direction,
                distance: require(self.distance, "distance")?,
                ratio: require(self.ratio, "ratio")?,
            }),
            _ => Err(LoadError::UnknownStepKind { index }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoutineFile {
    #[serde(default)]
    profile: ProfileConfig,
    #[serde(default, rename = "step")]
    steps: Vec<StepEntry>,
}

/// A parsed routine file
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub profile: ProfileConfig,
    pub steps: Vec<StepSpec>,
}

impl Routine {
    /// Install the configuration and steps into a sequencer
    ///
    /// Replaces whatever routine the sequencer held and marks it loaded.
    pub fn load_into<P: PidController, C: Clock>(
        &self,
        sequencer: &mut StepSequencer<P, C>,
    ) -> Result<usize, LoadError> {
        *sequencer.config_mut() = self.profile;
        let count = sequencer.load_routine(&self.steps)?;
        sequencer.set_continuous(self.profile.continuous);
        Ok(count)
    }
}

/// Parse a routine document
pub fn parse_routine(source: &str) -> Result<Routine, LoadError> {
    let file: RoutineFile = toml::from_str(source).map_err(|e| {
        warn!("routine parse error");
        LoadError::from(e)
    })?;

    if file.steps.len() > MAX_STEPS {
        return Err(LoadError::Profile(ProfileError::CapacityExceeded));
    }

    let steps = file
        .steps
        .iter()
        .enumerate()
        .map(|(index, entry)| entry.to_spec(index))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("parsed routine: {} steps", steps.len());
    Ok(Routine {
        profile: file.profile,
        steps,
    })
}

/// Read and parse a routine file
pub fn read_routine(path: impl AsRef<Path>) -> Result<Routine, LoadError> {
    let source = std::fs::read_to_string(path)?;
    parse_routine(&source)
}
