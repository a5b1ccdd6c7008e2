use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use territory_core::{CellCoord, Palette};
use territory_system_builder::{HostilePlan, LevelPlan};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "claim";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "claim:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a plan into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(plan: &LevelPlan) -> Result<String, LayoutTransferError> {
    let payload = SerializableLayout {
        border: plan.border,
        spawn: plan.spawn,
        lives: plan.lives,
        win_ratio: plan.win_ratio,
        countdown: plan.countdown,
        palette: plan.palette,
        hostiles: plan.hostiles.clone(),
    };
    let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{LAYOUT_HEADER}:{}x{}:{encoded}",
        plan.width, plan.height
    ))
}

/// Decodes a plan from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<LevelPlan, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != LAYOUT_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != LAYOUT_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let decoded: SerializableLayout =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    Ok(LevelPlan {
        width,
        height,
        border: decoded.border,
        spawn: decoded.spawn,
        lives: decoded.lives,
        win_ratio: decoded.win_ratio,
        countdown: decoded.countdown,
        palette: decoded.palette,
        hostiles: decoded.hostiles,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    border: u32,
    spawn: CellCoord,
    lives: i32,
    win_ratio: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    countdown: Option<u32>,
    #[serde(default)]
    palette: Palette,
    #[serde(default)]
    hostiles: Vec<HostilePlan>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
