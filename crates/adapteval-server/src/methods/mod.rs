use crate::sessions::SessionRegistry;
use adapteval_core::config::AuthConfig;
use adapteval_core::session::{Engine, Session, SessionError};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub mod dashboard;
pub mod session;

pub struct MethodContext {
    pub engine: Engine,
    pub registry: SessionRegistry,
    pub auth: AuthConfig,
}

#[derive(serde::Serialize)]
pub struct AppError {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// Application failures are `ok: false` results, not transport
    /// errors; the transport error channel is reserved for protocol
    /// problems.
    pub fn result(self) -> anyhow::Result<Value> {
        Ok(serde_json::json!({
            "ok": false,
            "error": self
        }))
    }
}

pub fn map_session_error(e: SessionError) -> AppError {
    let message = e.to_string();
    let code = match e {
        SessionError::NotIdentified => "E_NOT_IDENTIFIED",
        SessionError::NoActivePair => "E_NO_ACTIVE_PAIR",
        SessionError::UsernameTaken => "E_USERNAME_TAKEN",
        SessionError::InvalidCredentials => "E_INVALID_CREDENTIALS",
        SessionError::PasswordRequired => "E_PASSWORD_REQUIRED",
        SessionError::IncompleteScores(_) => "E_INCOMPLETE_SCORES",
        SessionError::ReviewIncomplete(_) => "E_REVIEW_INCOMPLETE",
        // store/network failures stay generic toward the user
        SessionError::Store(_) => {
            return AppError::new("E_STORE", "storage error; please try again later");
        }
    };
    AppError::new(code, &message)
}

/// Resolves the session referenced by the request.
pub fn resolve_session(
    ctx: &MethodContext,
    args: &Value,
) -> Result<Arc<Mutex<Session>>, AppError> {
    let id = args
        .get("session_id")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if id.is_empty() {
        return Err(AppError::new("E_INVALID_REQUEST", "session_id is required"));
    }
    ctx.registry
        .get(id)
        .ok_or_else(|| AppError::new("E_UNKNOWN_SESSION", "unknown or expired session"))
}

pub fn list_methods() -> Vec<Value> {
    vec![
        serde_json::json!({
            "name": "session/open",
            "description": "Open a new rater session.",
            "params": {}
        }),
        serde_json::json!({
            "name": "session/identify",
            "description": "Resolve a human-chosen identifier to a rater.",
            "params": { "session_id": "string", "username": "string", "password": "string?" }
        }),
        serde_json::json!({
            "name": "session/register",
            "description": "Create the rater from the submitted profile form.",
            "params": { "session_id": "string", "profile": "object" }
        }),
        serde_json::json!({
            "name": "session/next_pair",
            "description": "Sample the next unseen question with two anonymized answers.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "session/submit",
            "description": "Validate and persist the scores for the current pair.",
            "params": { "session_id": "string", "scores_a": "object", "scores_b": "object" }
        }),
        serde_json::json!({
            "name": "session/my_evaluations",
            "description": "The rater's past rating events.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "session/review",
            "description": "Both answers and scores for one completed question.",
            "params": { "session_id": "string", "question_id": "string" }
        }),
        serde_json::json!({
            "name": "session/delete",
            "description": "Paired delete of both rows for one question.",
            "params": { "session_id": "string", "question_id": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/login",
            "description": "Unlock the aggregate dashboards for this session.",
            "params": { "session_id": "string", "username": "string", "password": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/overview",
            "description": "Platform-level counts.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/agent_summary",
            "description": "Per-agent per-criterion score summaries.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/correlations",
            "description": "Pearson correlations between criteria.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/distributions",
            "description": "Score histograms per agent and criterion.",
            "params": { "session_id": "string" }
        }),
        serde_json::json!({
            "name": "dashboard/question_review",
            "description": "Per-question means, demographics and sectioned answers.",
            "params": { "session_id": "string" }
        }),
    ]
}

pub async fn handle_call(ctx: &MethodContext, name: &str, args: &Value) -> anyhow::Result<Value> {
    match name {
        "session/open" => session::open(ctx, args).await,
        "session/identify" => session::identify(ctx, args).await,
        "session/register" => session::register(ctx, args).await,
        "session/next_pair" => session::next_pair(ctx, args).await,
        "session/submit" => session::submit(ctx, args).await,
        "session/my_evaluations" => session::my_evaluations(ctx, args).await,
        "session/review" => session::review(ctx, args).await,
        "session/delete" => session::delete(ctx, args).await,
        "dashboard/login" => dashboard::login(ctx, args).await,
        "dashboard/overview" => dashboard::overview(ctx, args).await,
        "dashboard/agent_summary" => dashboard::agent_summary(ctx, args).await,
        "dashboard/correlations" => dashboard::correlations(ctx, args).await,
        "dashboard/distributions" => dashboard::distributions(ctx, args).await,
        "dashboard/question_review" => dashboard::question_review(ctx, args).await,
        _ => Err(anyhow::anyhow!("Unknown method: {}", name)),
    }
}
