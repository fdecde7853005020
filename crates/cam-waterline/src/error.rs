// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler.
#![allow(unused_assignments)]

//! Error types for waterline operations with rich diagnostics.
//!
//! Every error carries a machine-readable code, a recovery suggestion and
//! miette help text for terminal display.

use miette::Diagnostic;
use thiserror::Error;

use crate::weave::WeaveError;

/// Result type alias for waterline operations.
pub type WaterlineResult<T> = Result<T, WaterlineError>;

/// Machine-readable error codes for waterline operations.
///
/// Codes follow the pattern `WL-XXXX` where:
/// - 1xxx = Configuration errors
/// - 2xxx = Sampling errors
/// - 3xxx = Weave errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterlineErrorCode {
    /// WL-1001: No surface or fiber source configured
    MissingSurface = 1001,
    /// WL-1002: No cutter configured
    MissingCutter = 1002,
    /// WL-1003: No Z height configured
    MissingZ = 1003,
    /// WL-1004: Invalid parameters
    InvalidParams = 1004,

    /// WL-2001: Surface could not be prepared for sampling
    SurfaceFailed = 2001,

    /// WL-3001: Weave construction or traversal failed
    WeaveFailed = 3001,
}

impl WaterlineErrorCode {
    /// Returns the error code as a string in the format `WL-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterlineErrorCode::MissingSurface => "WL-1001",
            WaterlineErrorCode::MissingCutter => "WL-1002",
            WaterlineErrorCode::MissingZ => "WL-1003",
            WaterlineErrorCode::InvalidParams => "WL-1004",
            WaterlineErrorCode::SurfaceFailed => "WL-2001",
            WaterlineErrorCode::WeaveFailed => "WL-3001",
        }
    }
}

impl std::fmt::Display for WaterlineErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for waterline errors.
#[derive(Debug, Clone, PartialEq)]
pub enum WaterlineRecoverySuggestion {
    /// Call the named setter before running.
    Configure { setter: &'static str },
    /// Adjust a parameter.
    AdjustParameter {
        name: String,
        current: String,
        suggested: String,
    },
    /// Repair or re-export the surface mesh.
    RepairSurface,
    /// Check the fibers fed to the weave.
    CheckFibers,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for WaterlineRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterlineRecoverySuggestion::Configure { setter } => {
                write!(f, "Call `{}` before `run`", setter)
            }
            WaterlineRecoverySuggestion::AdjustParameter {
                name,
                current,
                suggested,
            } => {
                write!(f, "Change {} from {} to {}", name, current, suggested)
            }
            WaterlineRecoverySuggestion::RepairSurface => {
                write!(f, "Check the surface mesh for invalid indices or NaN coordinates")
            }
            WaterlineRecoverySuggestion::CheckFibers => {
                write!(
                    f,
                    "Fibers must be sorted by coordinate, axis-parallel and carry ordered intervals"
                )
            }
            WaterlineRecoverySuggestion::None => {
                write!(f, "No specific suggestion available")
            }
        }
    }
}

/// Errors that can occur during waterline operations.
#[derive(Debug, Error, Diagnostic)]
pub enum WaterlineError {
    /// Neither a surface nor a fiber source was configured.
    #[error("no surface configured")]
    #[diagnostic(
        code(waterline::config::missing_surface),
        help("Set a surface mesh with `set_surface`, or inject fibers with `set_fiber_source`.")
    )]
    MissingSurface,

    /// A surface was set but no cutter.
    #[error("no cutter configured")]
    #[diagnostic(
        code(waterline::config::missing_cutter),
        help("Set a cutter with `set_cutter`, e.g. CylCutter::new(diameter, length).")
    )]
    MissingCutter,

    /// No Z height was set.
    #[error("no Z height configured")]
    #[diagnostic(
        code(waterline::config::missing_z),
        help("Set the waterline height with `set_z`.")
    )]
    MissingZ,

    /// Invalid parameters.
    #[error("invalid waterline parameters: {details}")]
    #[diagnostic(
        code(waterline::params::invalid),
        help("Check parameter values: sampling > 0, 0 < min_sampling <= sampling, -1 <= cos_limit <= 1.")
    )]
    InvalidParams {
        details: String,
        param_name: Option<String>,
        param_value: Option<String>,
    },

    /// The weave could not be built or traversed.
    #[error("weave processing failed: {0}")]
    #[diagnostic(
        code(waterline::weave::failed),
        help("The sampled fibers are inconsistent. Try a different min_sampling or check a custom fiber source.")
    )]
    WeaveFailed(#[from] WeaveError),

    /// Underlying mesh error.
    #[error("surface preparation failed: {0}")]
    #[diagnostic(code(waterline::mesh::error))]
    MeshError(#[from] cam_mesh::MeshError),
}

impl WaterlineError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> WaterlineErrorCode {
        match self {
            WaterlineError::MissingSurface => WaterlineErrorCode::MissingSurface,
            WaterlineError::MissingCutter => WaterlineErrorCode::MissingCutter,
            WaterlineError::MissingZ => WaterlineErrorCode::MissingZ,
            WaterlineError::InvalidParams { .. } => WaterlineErrorCode::InvalidParams,
            WaterlineError::WeaveFailed(_) => WaterlineErrorCode::WeaveFailed,
            WaterlineError::MeshError(_) => WaterlineErrorCode::SurfaceFailed,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> WaterlineRecoverySuggestion {
        match self {
            WaterlineError::MissingSurface => WaterlineRecoverySuggestion::Configure {
                setter: "set_surface",
            },
            WaterlineError::MissingCutter => WaterlineRecoverySuggestion::Configure {
                setter: "set_cutter",
            },
            WaterlineError::MissingZ => WaterlineRecoverySuggestion::Configure { setter: "set_z" },
            WaterlineError::InvalidParams {
                param_name: Some(name),
                param_value,
                ..
            } => {
                let suggested = match name.as_str() {
                    "sampling" => "1.0",
                    "min_sampling" => "0.01",
                    "cos_limit" => "0.999",
                    _ => return WaterlineRecoverySuggestion::None,
                };
                WaterlineRecoverySuggestion::AdjustParameter {
                    name: name.clone(),
                    current: param_value.clone().unwrap_or_else(|| "?".to_string()),
                    suggested: suggested.to_string(),
                }
            }
            WaterlineError::InvalidParams { .. } => WaterlineRecoverySuggestion::None,
            WaterlineError::WeaveFailed(_) => WaterlineRecoverySuggestion::CheckFibers,
            WaterlineError::MeshError(_) => WaterlineRecoverySuggestion::RepairSurface,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param(name: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        let value = value.to_string();
        WaterlineError::InvalidParams {
            details: format!("{} = {}: {}", name, value, reason),
            param_name: Some(name.to_string()),
            param_value: Some(value),
        }
    }

    /// Check whether the error is a configuration problem fixable by a setter.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.code(),
            WaterlineErrorCode::MissingSurface
                | WaterlineErrorCode::MissingCutter
                | WaterlineErrorCode::MissingZ
                | WaterlineErrorCode::InvalidParams
        )
    }
}
