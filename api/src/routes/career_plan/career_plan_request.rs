use serde::Deserialize;

use ai_completion_service::ChatMessage;

/// Request body for POST /api/career-plan.
#[derive(Debug, Deserialize)]
pub struct CareerPlanRequest {
    /// The user's question; required and non-empty.
    pub query: String,
    /// Prior turns, forwarded verbatim between the system message and the
    /// final user turn.
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}
