//! Error types used by the crate.

use thiserror::Error;

use crate::widget::WidgetKind;

/// Pointmap error type.
#[derive(Debug, Error)]
pub enum PointMapError {
    /// The element the view should be bound to does not exist.
    #[error("map container '{0}' was not found")]
    MissingContainer(String),
    /// The map, its view or one of its layers could not be built.
    #[error("failed to create the map: {0}")]
    MapConstruction(String),
    /// A widget could not be built.
    #[error("failed to create the {widget} widget: {reason}")]
    WidgetConstruction {
        /// Widget that failed.
        widget: WidgetKind,
        /// What went wrong.
        reason: String,
    },
    /// A point record does not carry a `[longitude, latitude]` pair of finite numbers.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    /// Bounds were requested for a point set without a single valid point.
    #[error("no usable points to compute the map extent from")]
    NoUsablePoints,
    /// A widget or the view failed to release its resources.
    #[error("teardown failed: {0}")]
    Teardown(String),
    /// Point data could not be decoded.
    #[error("failed to decode point data: {0}")]
    Data(#[from] serde_json::Error),
    /// Configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The application window or its runtime could not be started.
    #[error("failed to start the application: {0}")]
    Startup(String),
}

impl From<galileo::error::GalileoError> for PointMapError {
    fn from(value: galileo::error::GalileoError) -> Self {
        Self::MapConstruction(value.to_string())
    }
}
