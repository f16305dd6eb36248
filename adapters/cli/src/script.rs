//! Scripted input replayed by headless runs.
//!
//! A script is a comma separated list of `FRAME:ACTION[:ARGS]` steps, for
//! example `0:activate:S1,80:dismiss,90:orbit:0.3:0.1`. Steps fire before the
//! frame with the given index is ticked.

use std::{error::Error, fmt};

use grove_core::SprintId;

const STEP_DELIMITER: char = ',';
const FIELD_DELIMITER: char = ':';

/// Input injected by a script step.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ScriptAction {
    /// Activates the node with the provided id.
    Activate(SprintId),
    /// Uses the popup close control.
    Dismiss,
    /// Orbits the camera by the provided yaw and pitch in radians.
    Orbit {
        /// Turn around the vertical axis.
        yaw: f32,
        /// Tilt toward the pole.
        pitch: f32,
    },
    /// Simulates losing the drawing surface.
    LoseSurface,
    /// Simulates the drawing surface coming back.
    RestoreSurface,
}

/// Action scheduled for a frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScriptStep {
    /// Frame before which the action is applied.
    pub(crate) frame: u64,
    /// Input to apply.
    pub(crate) action: ScriptAction,
}

/// Parses a script into steps ordered by frame, keeping the written order of
/// steps that share a frame.
pub(crate) fn parse_script(value: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut steps = trimmed
        .split(STEP_DELIMITER)
        .map(|step| parse_step(step.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    steps.sort_by_key(|step| step.frame);
    Ok(steps)
}

fn parse_step(step: &str) -> Result<ScriptStep, ScriptError> {
    if step.is_empty() {
        return Err(ScriptError::EmptyStep);
    }

    let mut fields = step.splitn(3, FIELD_DELIMITER);
    let frame = fields.next().unwrap_or_default();
    let frame = frame
        .trim()
        .parse::<u64>()
        .map_err(|_| ScriptError::InvalidFrame(frame.to_owned()))?;
    let action = fields
        .next()
        .map(str::trim)
        .ok_or_else(|| ScriptError::MissingAction(step.to_owned()))?;
    let arguments = fields.next().map(str::trim);

    let action = match (action, arguments) {
        ("activate", Some(id)) if !id.is_empty() => ScriptAction::Activate(SprintId::new(id)),
        ("activate", _) => return Err(ScriptError::MissingArgument("activate")),
        ("dismiss", None) => ScriptAction::Dismiss,
        ("lose", None) => ScriptAction::LoseSurface,
        ("restore", None) => ScriptAction::RestoreSurface,
        ("orbit", Some(angles)) => parse_orbit(angles)?,
        ("orbit", None) => return Err(ScriptError::MissingArgument("orbit")),
        ("dismiss" | "lose" | "restore", Some(_)) => {
            return Err(ScriptError::UnexpectedArgument(action.to_owned()))
        }
        (other, _) => return Err(ScriptError::UnknownAction(other.to_owned())),
    };

    Ok(ScriptStep { frame, action })
}

fn parse_orbit(angles: &str) -> Result<ScriptAction, ScriptError> {
    let (yaw, pitch) = angles
        .split_once(FIELD_DELIMITER)
        .ok_or(ScriptError::MissingArgument("orbit"))?;
    let parse = |angle: &str| {
        angle
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|angle| angle.is_finite())
            .ok_or_else(|| ScriptError::InvalidAngle(angle.to_owned()))
    };
    Ok(ScriptAction::Orbit {
        yaw: parse(yaw)?,
        pitch: parse(pitch)?,
    })
}

/// Errors that can occur while parsing scripts.
#[derive(Debug, PartialEq)]
pub(crate) enum ScriptError {
    /// Two delimiters followed each other without a step between them.
    EmptyStep,
    /// The frame index was not a non-negative integer.
    InvalidFrame(String),
    /// The step named no action.
    MissingAction(String),
    /// The action requires arguments that were not provided.
    MissingArgument(&'static str),
    /// The action takes no arguments but some were provided.
    UnexpectedArgument(String),
    /// The action is not known.
    UnknownAction(String),
    /// An orbit angle was not a finite number.
    InvalidAngle(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStep => write!(f, "script contains an empty step"),
            Self::InvalidFrame(frame) => write!(f, "could not parse frame index '{frame}'"),
            Self::MissingAction(step) => write!(f, "script step '{step}' names no action"),
            Self::MissingArgument(action) => {
                write!(f, "script action '{action}' is missing its arguments")
            }
            Self::UnexpectedArgument(action) => {
                write!(f, "script action '{action}' takes no arguments")
            }
            Self::UnknownAction(action) => write!(f, "script action '{action}' is not supported"),
            Self::InvalidAngle(angle) => write!(f, "could not parse orbit angle '{angle}'"),
        }
    }
}

impl Error for ScriptError {}
