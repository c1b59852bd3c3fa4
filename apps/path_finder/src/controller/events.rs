//! Controller inputs, backend-to-UI events, and error modeling for the path finder.

use client_core::ClientError;
use shared::domain::{GeoPoint, MarkerKind, RequestId, RouteSet};

/// Everything the map interaction controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    MapClicked(GeoPoint),
    MarkerDragEnded {
        marker: MarkerKind,
        point: GeoPoint,
    },
    DraftEdited {
        field: MarkerKind,
        text: String,
    },
    SetCoordinates,
    ClearMarkers,
    FindPaths,
    PathsLoaded {
        request_id: RequestId,
        routes: RouteSet,
    },
    PathsFailed {
        request_id: RequestId,
        error: UiError,
    },
}

pub enum UiEvent {
    Info(String),
    Error(UiError),
    PathsLoaded {
        request_id: RequestId,
        routes: RouteSet,
    },
    PathsFailed {
        request_id: RequestId,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Service,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FindPaths,
}

pub fn classify_fetch_failure(error: &UiError) -> String {
    match error.category() {
        UiErrorCategory::Transport => {
            "Routing service unreachable; check the URL/network and retry.".to_string()
        }
        UiErrorCategory::Service => format!("Routing service rejected the query: {}", error.message()),
        UiErrorCategory::Validation => {
            format!("Routing service sent an unusable answer: {}", error.message())
        }
        UiErrorCategory::Unknown => format!("Path query failed: {}", error.message()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Status { .. } => UiErrorCategory::Service,
            ClientError::Decode(_) | ClientError::InvalidUrl { .. } => UiErrorCategory::Validation,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
