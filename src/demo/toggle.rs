//! Original / AI-enhanced view state machine.

use serde::Serialize;

/// Which side of the demo toggle is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// The visitor's own content. Initial state.
    #[default]
    Original,
    /// An enhancement is in flight.
    Generating,
    /// The cached AI result is showing.
    AiEnhanced,
}

impl ViewMode {
    /// Check if this mode allows switching to another mode.
    pub fn can_transition_to(&self, target: ViewMode) -> bool {
        use ViewMode::*;

        matches!(
            (self, target),
            (Original, Original) | (Original, Generating) | (Original, AiEnhanced) |
            (Generating, AiEnhanced) | (Generating, Original) |
            (AiEnhanced, Original) | (AiEnhanced, Generating)
        )
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating)
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Original => "original",
            Self::Generating => "generating",
            Self::AiEnhanced => "ai_enhanced",
        };
        write!(f, "{}", s)
    }
}

/// What a switch request should do given the current mode and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Show the cached result without any network call.
    ShowCached,
    /// Run the orchestrator.
    Generate,
    /// Go back to the original content.
    ShowOriginal,
}

/// Decide how a toggle press is handled. `None` while generating.
pub fn plan_toggle(mode: ViewMode, has_cached_result: bool) -> Option<ToggleAction> {
    match mode {
        ViewMode::Original if has_cached_result => Some(ToggleAction::ShowCached),
        ViewMode::Original => Some(ToggleAction::Generate),
        ViewMode::AiEnhanced => Some(ToggleAction::ShowOriginal),
        ViewMode::Generating => None,
    }
}
