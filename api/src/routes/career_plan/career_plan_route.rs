//! POST /api/career-plan — the RAG pipeline: retrieve context, assemble the
//! prompt, invoke the completion deployment.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use tracing::{error, info};

use ai_completion_service::ChatMessage;

use crate::{
    core::{app_state::AppState, http::response_envelope::StatusEnvelope},
    error_handler::AppError,
    routes::career_plan::career_plan_request::CareerPlanRequest,
};

/// System instruction for the completion deployment.
const SYSTEM_MESSAGE: &str = "You are a career development expert at Contoso. \
    Create a helpful response based on the user query and the provided context \
    from Contoso documents. If context is available, prioritize it. Do not \
    invent information not present in the context.";

/// Handler: POST /api/career-plan
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/career-plan \
///   -H 'content-type: application/json' \
///   -d '{"query":"How do I move into data engineering?"}'
/// ```
pub async fn generate_career_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CareerPlanRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    info!("received career-plan request");

    // Unavailability is signaled before the body is even looked at.
    let Some(completion) = &state.completion else {
        error!("completion client not available for career-plan request");
        return Err(AppError::CompletionUnavailable);
    };

    let Json(body) = payload?;
    if body.query.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required field: query".to_string(),
        ));
    }

    // Retrieval never fails; degraded search yields a sentinel context.
    let context = state.retriever.retrieve_context(&body.query, None).await;

    let messages = build_messages(&body.query, &body.conversation_history, &context);

    info!(deployment = %completion.deployment(), "calling completion deployment");
    match completion.complete(&messages).await {
        Ok(outcome) => {
            info!(
                model = %outcome.model,
                choice_count = outcome.choice_count,
                "career-plan response generated"
            );
            Ok(StatusEnvelope::success(outcome.text).into_response_with_status(StatusCode::OK))
        }
        Err(e) => {
            error!(error = %e, "completion call failed");
            Err(AppError::Completion(e))
        }
    }
}

/// Assembles the ordered prompt: system instruction, prior turns verbatim,
/// then the user turn embedding query and retrieved context.
fn build_messages(query: &str, history: &[ChatMessage], context: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: SYSTEM_MESSAGE.to_string(),
    });
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: format!("Query: {query}\n\nContext:\n{context}"),
    });
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_keeps_system_history_user_order() {
        let history = vec![
            ChatMessage {
                role: "user".to_string(),
                content: "earlier question".to_string(),
            },
            ChatMessage {
                role: "assistant".to_string(),
                content: "earlier answer".to_string(),
            },
        ];
        let messages = build_messages("next step?", &history, "ctx-block");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "earlier question");
        assert_eq!(messages[2].content, "earlier answer");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "Query: next step?\n\nContext:\nctx-block");
    }

    #[test]
    fn empty_history_still_yields_system_and_user_turns() {
        let messages = build_messages("q", &[], "c");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("career development expert"));
    }
}
