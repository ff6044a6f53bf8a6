// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tool catalog and per-tool parameter validation.
//!
//! Each [`ToolType`] is bound to exactly one remote endpoint and one local
//! transform. Raw string options coming from the caller are parsed into a
//! typed [`ToolParams`] value; defaults mirror what the remote worker uses
//! when a field is omitted, so both paths see the same effective parameters.
//!
//! | tool      | endpoint            | parameters                              |
//! |-----------|---------------------|-----------------------------------------|
//! | gif       | `/video-to-gif`     | `start`, `duration`, `fps`              |
//! | compress  | `/compress-video`   | `quality`                               |
//! | rotate    | `/rotate-video`     | `rotation` (required)                   |
//! | convert   | `/convert-format`   | `format` (required)                     |
//! | watermark | `/remove-watermark` | `type`, `x`, `y`, `width`, `height`     |

use crate::errors::ValidationError;
use crate::job::media::Container;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const DEFAULT_GIF_START: f64 = 0.0;
const DEFAULT_GIF_DURATION: f64 = 5.0;
const DEFAULT_GIF_FPS: u32 = 10;
const MAX_GIF_FPS: u32 = 60;

const DEFAULT_CUSTOM_REGION: WatermarkRegion = WatermarkRegion {
    x: 0,
    y: 0,
    width: 200,
    height: 100,
};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Gif,
    Compress,
    Rotate,
    Convert,
    Watermark,
}

impl ToolType {
    pub const ALL: [ToolType; 5] = [
        ToolType::Gif,
        ToolType::Compress,
        ToolType::Rotate,
        ToolType::Convert,
        ToolType::Watermark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::Gif => "gif",
            ToolType::Compress => "compress",
            ToolType::Rotate => "rotate",
            ToolType::Convert => "convert",
            ToolType::Watermark => "watermark",
        }
    }

    /// Remote worker endpoint that accepts this tool's submissions.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ToolType::Gif => "/video-to-gif",
            ToolType::Compress => "/compress-video",
            ToolType::Rotate => "/rotate-video",
            ToolType::Convert => "/convert-format",
            ToolType::Watermark => "/remove-watermark",
        }
    }

    /// Option keys this tool accepts.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            ToolType::Gif => &["start", "duration", "fps"],
            ToolType::Compress => &["quality"],
            ToolType::Rotate => &["rotation"],
            ToolType::Convert => &["format"],
            ToolType::Watermark => &["type", "x", "y", "width", "height"],
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ToolType::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ValidationError::UnknownTool(value.to_string()))
    }
}

/// Named compression tiers and their fixed CRF values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    /// Constant rate factor handed to the encoder; lower means better quality.
    pub fn crf(&self) -> u8 {
        match self {
            QualityTier::High => 23,
            QualityTier::Medium => 28,
            QualityTier::Low => 35,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise90,
    Half,
    Clockwise270,
    FlipHorizontal,
    FlipVertical,
}

impl Rotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Clockwise90 => "90",
            Rotation::Half => "180",
            Rotation::Clockwise270 => "270",
            Rotation::FlipHorizontal => "flip_h",
            Rotation::FlipVertical => "flip_v",
        }
    }

    /// Video filter chain implementing the rotation.
    pub fn filter(&self) -> &'static str {
        match self {
            Rotation::Clockwise90 => "transpose=1",
            Rotation::Half => "transpose=2,transpose=2",
            Rotation::Clockwise270 => "transpose=2",
            Rotation::FlipHorizontal => "hflip",
            Rotation::FlipVertical => "vflip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPreset {
    TikTok,
    Instagram,
    Custom,
}

impl WatermarkPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkPreset::TikTok => "tiktok",
            WatermarkPreset::Instagram => "instagram",
            WatermarkPreset::Custom => "custom",
        }
    }
}

/// Rectangle passed to the delogo filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolParams {
    Gif { start: f64, duration: f64, fps: u32 },
    Compress { quality: QualityTier },
    Rotate { rotation: Rotation },
    Convert { format: Container },
    Watermark {
        preset: WatermarkPreset,
        region: WatermarkRegion,
    },
}

impl ToolParams {
    /// Validate `options` against `tool` and produce typed parameters.
    ///
    /// Unknown keys, missing required keys and malformed values are all
    /// rejected; nothing is silently ignored.
    pub fn parse(tool: ToolType, options: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let accepted = tool.parameter_names();
        let mut keys: Vec<&String> = options.keys().collect();
        keys.sort();
        if let Some(unknown) = keys.into_iter().find(|key| !accepted.contains(&key.as_str())) {
            return Err(ValidationError::UnknownParameter {
                tool,
                parameter: unknown.clone(),
            });
        }

        let get = |name: &str| options.get(name).map(|value| value.trim());

        match tool {
            ToolType::Gif => {
                let start = match get("start") {
                    Some(raw) => parse_seconds("start", raw, true)?,
                    None => DEFAULT_GIF_START,
                };
                let duration = match get("duration") {
                    Some(raw) => parse_seconds("duration", raw, false)?,
                    None => DEFAULT_GIF_DURATION,
                };
                let fps = match get("fps") {
                    Some(raw) => parse_bounded("fps", raw, 1, MAX_GIF_FPS)?,
                    None => DEFAULT_GIF_FPS,
                };
                Ok(ToolParams::Gif { start, duration, fps })
            }
            ToolType::Compress => {
                let quality = match get("quality") {
                    Some("high") => QualityTier::High,
                    Some("medium") | None => QualityTier::Medium,
                    Some("low") => QualityTier::Low,
                    Some(other) => return Err(one_of("quality", other, &["high", "medium", "low"])),
                };
                Ok(ToolParams::Compress { quality })
            }
            ToolType::Rotate => {
                let raw = get("rotation").ok_or(ValidationError::MissingParameter {
                    tool,
                    parameter: "rotation",
                })?;
                let rotation = match raw {
                    "90" => Rotation::Clockwise90,
                    "180" => Rotation::Half,
                    "270" => Rotation::Clockwise270,
                    "flip_h" => Rotation::FlipHorizontal,
                    "flip_v" => Rotation::FlipVertical,
                    other => {
                        return Err(one_of(
                            "rotation",
                            other,
                            &["90", "180", "270", "flip_h", "flip_v"],
                        ))
                    }
                };
                Ok(ToolParams::Rotate { rotation })
            }
            ToolType::Convert => {
                let raw = get("format").ok_or(ValidationError::MissingParameter {
                    tool,
                    parameter: "format",
                })?;
                let format = Container::from_extension(raw)
                    .filter(|container| Container::CONVERT_TARGETS.contains(container))
                    .ok_or_else(|| one_of("format", raw, &["mp4", "avi", "mkv", "mov", "webm"]))?;
                Ok(ToolParams::Convert { format })
            }
            ToolType::Watermark => parse_watermark(options),
        }
    }

    pub fn tool(&self) -> ToolType {
        match self {
            ToolParams::Gif { .. } => ToolType::Gif,
            ToolParams::Compress { .. } => ToolType::Compress,
            ToolParams::Rotate { .. } => ToolType::Rotate,
            ToolParams::Convert { .. } => ToolType::Convert,
            ToolParams::Watermark { .. } => ToolType::Watermark,
        }
    }

    /// Normalised form fields for a remote submission, defaults included.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ToolParams::Gif { start, duration, fps } => vec![
                ("start", start.to_string()),
                ("duration", duration.to_string()),
                ("fps", fps.to_string()),
            ],
            ToolParams::Compress { quality } => vec![("quality", quality.as_str().to_string())],
            ToolParams::Rotate { rotation } => vec![("rotation", rotation.as_str().to_string())],
            ToolParams::Convert { format } => vec![("format", format.extension().to_string())],
            ToolParams::Watermark { preset, region } => {
                let mut fields = vec![("type", preset.as_str().to_string())];
                if *preset == WatermarkPreset::Custom {
                    fields.extend([
                        ("x", region.x.to_string()),
                        ("y", region.y.to_string()),
                        ("width", region.width.to_string()),
                        ("height", region.height.to_string()),
                    ]);
                }
                fields
            }
        }
    }
}

fn parse_watermark(options: &HashMap<String, String>) -> Result<ToolParams, ValidationError> {
    let get = |name: &str| options.get(name).map(|value| value.trim());

    let preset = match get("type") {
        Some("tiktok") | None => WatermarkPreset::TikTok,
        Some("instagram") => WatermarkPreset::Instagram,
        Some("custom") => WatermarkPreset::Custom,
        Some(other) => return Err(one_of("type", other, &["tiktok", "instagram", "custom"])),
    };

    let region = match preset {
        WatermarkPreset::TikTok | WatermarkPreset::Instagram => {
            for geometry in ["x", "y", "width", "height"] {
                if let Some(value) = options.get(geometry) {
                    return Err(ValidationError::InvalidValue {
                        parameter: geometry,
                        value: value.clone(),
                        reason: "only accepted when type=custom".to_string(),
                    });
                }
            }
            if preset == WatermarkPreset::TikTok {
                WatermarkRegion { x: 0, y: 900, width: 1080, height: 100 }
            } else {
                WatermarkRegion { x: 900, y: 0, width: 180, height: 80 }
            }
        }
        WatermarkPreset::Custom => {
            let read = |name: &'static str, default: u32, minimum: u32| match get(name) {
                Some(raw) => parse_bounded(name, raw, minimum, u32::MAX),
                None => Ok(default),
            };
            WatermarkRegion {
                x: read("x", DEFAULT_CUSTOM_REGION.x, 0)?,
                y: read("y", DEFAULT_CUSTOM_REGION.y, 0)?,
                width: read("width", DEFAULT_CUSTOM_REGION.width, 1)?,
                height: read("height", DEFAULT_CUSTOM_REGION.height, 1)?,
            }
        }
    };

    Ok(ToolParams::Watermark { preset, region })
}

fn parse_seconds(parameter: &'static str, raw: &str, allow_zero: bool) -> Result<f64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidValue {
        parameter,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let seconds: f64 = raw.parse().map_err(|_| invalid("expected a number of seconds"))?;
    if !seconds.is_finite() {
        return Err(invalid("expected a finite number of seconds"));
    }
    if seconds < 0.0 || (!allow_zero && seconds == 0.0) {
        return Err(invalid(if allow_zero {
            "must not be negative"
        } else {
            "must be greater than zero"
        }));
    }
    Ok(seconds)
}

fn parse_bounded(parameter: &'static str, raw: &str, min: u32, max: u32) -> Result<u32, ValidationError> {
    let value: u32 = raw.parse().map_err(|_| ValidationError::InvalidValue {
        parameter,
        value: raw.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })?;
    if value < min || value > max {
        return Err(ValidationError::InvalidValue {
            parameter,
            value: raw.to_string(),
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(value)
}

fn one_of(parameter: &'static str, raw: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::InvalidValue {
        parameter,
        value: raw.to_string(),
        reason: format!("expected one of: {}", allowed.join(", ")),
    }
}
