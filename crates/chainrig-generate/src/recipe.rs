//! Compact constraint recipes.
//!
//! A recipe is a run of steps, each `<KIND><influence>[<spaces>|<axis>][<head_tail>]`:
//!
//! | code | constraint       |
//! |------|------------------|
//! | `CL` | copy-location    |
//! | `CR` | copy-rotation    |
//! | `CS` | copy-scale       |
//! | `CT` | copy-transforms  |
//! | `DT` | damped-track     |
//! | `ST` | stretch-to       |
//!
//! Spaces are an owner/target pair of `W` (world), `L` (local) or `P` (pose).
//! Damped-track takes a track axis instead, `X`/`Y`/`Z` with an optional `N`
//! for the negative axis. So `CL0.5LL0.0` is a half-strength local-space
//! copy-location at the target's head, and `DT1.0Y0.0` tracks the target head
//! along +Y.

use std::sync::OnceLock;

use chainrig_armature::{Constraint, ConstraintHandle, PosePhase, Space, TrackAxis};
use regex::Regex;

use crate::error::{ConfigError, GenerateResult};

static STEP_PATTERN: OnceLock<Regex> = OnceLock::new();

fn step_pattern() -> &'static Regex {
    STEP_PATTERN.get_or_init(|| {
        Regex::new(r"(CL|CR|CS|CT|DT|ST)(\d*\.?\d+)([WLP]{2}|N?[XYZ])?(\d*\.?\d+)?")
            .expect("valid regex")
    })
}

/// Constraint kind named by a recipe code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    CopyLocation,
    CopyRotation,
    CopyScale,
    CopyTransforms,
    DampedTrack,
    StretchTo,
}

impl RecipeKind {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "CL" => Some(Self::CopyLocation),
            "CR" => Some(Self::CopyRotation),
            "CS" => Some(Self::CopyScale),
            "CT" => Some(Self::CopyTransforms),
            "DT" => Some(Self::DampedTrack),
            "ST" => Some(Self::StretchTo),
            _ => None,
        }
    }
}

/// One parsed recipe step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeStep {
    pub kind: RecipeKind,
    pub influence: f64,
    pub spaces: Option<(Space, Space)>,
    pub track: Option<TrackAxis>,
    pub head_tail: Option<f64>,
}

impl RecipeStep {
    /// Builds the constraint this step describes, aimed at `target`.
    pub fn to_constraint(&self, target: &str) -> Constraint {
        let mut c = match self.kind {
            RecipeKind::CopyLocation => Constraint::copy_location(target),
            RecipeKind::CopyRotation => Constraint::copy_rotation(target),
            RecipeKind::CopyScale => Constraint::copy_scale(target),
            RecipeKind::CopyTransforms => Constraint::copy_transforms(target),
            RecipeKind::DampedTrack => Constraint::damped_track(target),
            RecipeKind::StretchTo => Constraint::stretch_to(target),
        }
        .with_influence(self.influence);
        if let Some((owner, target_space)) = self.spaces {
            c = c.in_space(owner, target_space);
        }
        if let Some(track) = self.track {
            c = c.with_track(track);
        }
        if let Some(head_tail) = self.head_tail {
            c = c.with_head_tail(head_tail);
        }
        c
    }
}

fn space(code: char) -> Space {
    match code {
        'L' => Space::Local,
        'P' => Space::Pose,
        _ => Space::World,
    }
}

fn track_axis(code: &str) -> TrackAxis {
    match code {
        "X" => TrackAxis::X,
        "Z" => TrackAxis::Z,
        "NX" => TrackAxis::NegX,
        "NY" => TrackAxis::NegY,
        "NZ" => TrackAxis::NegZ,
        _ => TrackAxis::Y,
    }
}

fn number(recipe: &str, text: &str) -> Result<f64, ConfigError> {
    text.parse()
        .map_err(|_| ConfigError::invalid_recipe(recipe, format!("bad number '{}'", text)))
}

/// Parses a recipe. The whole string must be made of steps.
pub fn parse_recipe(recipe: &str) -> Result<Vec<RecipeStep>, ConfigError> {
    let mut steps = Vec::new();
    let mut cursor = 0;
    for caps in step_pattern().captures_iter(recipe) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() != cursor {
            return Err(ConfigError::invalid_recipe(
                recipe,
                format!("unexpected text at offset {}", cursor),
            ));
        }
        cursor = whole.end();

        let kind = RecipeKind::from_code(&caps[1])
            .ok_or_else(|| ConfigError::invalid_recipe(recipe, "unknown constraint code"))?;
        let influence = number(recipe, &caps[2])?;
        if !(0.0..=1.0).contains(&influence) {
            return Err(ConfigError::invalid_recipe(
                recipe,
                format!("influence {} outside [0, 1]", influence),
            ));
        }

        let mut spaces = None;
        let mut track = None;
        if let Some(modifier) = caps.get(3).map(|m| m.as_str()) {
            let mut chars = modifier.chars();
            match (chars.next(), chars.next()) {
                (Some(owner), Some(target)) if "WLP".contains(owner) && "WLP".contains(target) => {
                    spaces = Some((space(owner), space(target)));
                }
                _ if kind == RecipeKind::DampedTrack => track = Some(track_axis(modifier)),
                _ => {
                    return Err(ConfigError::invalid_recipe(
                        recipe,
                        format!("track axis '{}' only applies to damped-track", modifier),
                    ))
                }
            }
        }
        let head_tail = caps
            .get(4)
            .map(|m| number(recipe, m.as_str()))
            .transpose()?;

        steps.push(RecipeStep {
            kind,
            influence,
            spaces,
            track,
            head_tail,
        });
    }

    if steps.is_empty() || cursor != recipe.len() {
        return Err(ConfigError::invalid_recipe(
            recipe,
            format!("unexpected text at offset {}", cursor),
        ));
    }
    Ok(steps)
}

/// Parses `recipe` and adds its constraints to `owner`, aimed at `target`.
pub fn apply_recipe(
    pose: &mut PosePhase<'_>,
    owner: &str,
    target: &str,
    recipe: &str,
) -> GenerateResult<Vec<ConstraintHandle>> {
    let mut handles = Vec::new();
    for step in parse_recipe(recipe)? {
        handles.push(pose.add_constraint(owner, step.to_constraint(target))?);
    }
    Ok(handles)
}
