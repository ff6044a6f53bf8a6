// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for malformed job requests.
//!
//! A request that fails validation is rejected before any execution path is
//! attempted, so these never trigger a remote submission or an engine load.

use crate::job::ToolType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Tool name does not match any entry in the tool catalog.
    #[error("Unknown tool type: '{0}'")]
    UnknownTool(String),

    /// Option key is not part of the tool's parameter set.
    #[error("Parameter '{parameter}' is not accepted by the {tool} tool")]
    UnknownParameter { tool: ToolType, parameter: String },

    /// A required option was not supplied.
    #[error("Missing required parameter '{parameter}' for the {tool} tool")]
    MissingParameter {
        tool: ToolType,
        parameter: &'static str,
    },

    /// Option value could not be parsed or is out of range.
    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    /// Source payload has no bytes.
    #[error("Source file is empty")]
    EmptySource,
}
