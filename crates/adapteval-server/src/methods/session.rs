use super::{map_session_error, resolve_session, AppError, MethodContext};
use adapteval_core::model::{RaterProfile, ScoreSet};
use adapteval_core::session::IdentifyOutcome;
use serde_json::{json, Value};

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, AppError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::new("E_INVALID_REQUEST", &format!("{} is required", key)))
}

fn user_json(user: &adapteval_core::model::UserRecord) -> Value {
    json!({
        "user_id": user.user_id,
        "username": user.username,
        "background": user.background,
        "role": user.role,
        "institution": user.institution,
    })
}

pub async fn open(ctx: &MethodContext, _args: &Value) -> anyhow::Result<Value> {
    let id = ctx.registry.open();
    Ok(json!({ "ok": true, "session_id": id }))
}

pub async fn identify(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let username = match str_arg(args, "username") {
        Ok(u) => u.to_string(),
        Err(e) => return e.result(),
    };
    let password = args
        .get("password")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let mut session = handle.lock().unwrap();
    match ctx
        .engine
        .identify(&mut session, &username, password.as_deref())
        .await
    {
        Ok(IdentifyOutcome::Known(user)) => Ok(json!({
            "ok": true,
            "known": true,
            "user": user_json(&user),
        })),
        Ok(IdentifyOutcome::NeedsProfile) => Ok(json!({
            "ok": true,
            "known": false,
            "profile_required": true,
        })),
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn register(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let profile: RaterProfile = match args
        .get("profile")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
    {
        Ok(Some(p)) => p,
        Ok(None) => return AppError::new("E_INVALID_REQUEST", "profile is required").result(),
        Err(e) => {
            return AppError::new("E_INVALID_REQUEST", &format!("invalid profile: {}", e)).result()
        }
    };

    let mut session = handle.lock().unwrap();
    match ctx.engine.register(&mut session, &profile).await {
        Ok(user) => Ok(json!({ "ok": true, "user": user_json(&user) })),
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn next_pair(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let mut session = handle.lock().unwrap();
    match ctx.engine.next_pair(&mut session).await {
        Ok(Some(pair)) => {
            // anonymized payload: the slot-to-agent mapping stays in
            // session state
            let responses: Vec<Value> = pair
                .responses
                .iter()
                .map(|r| json!({ "label": r.label, "content": r.content }))
                .collect();
            Ok(json!({
                "ok": true,
                "exhausted": false,
                "question_id": pair.question_id,
                "question_text": pair.question_text,
                "responses": responses,
            }))
        }
        Ok(None) => Ok(json!({
            "ok": true,
            "exhausted": true,
            "message": "You have completed all available evaluations",
        })),
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn submit(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let parse_scores = |key: &str| -> Result<ScoreSet, AppError> {
        let value = args
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::new("E_INVALID_REQUEST", &format!("{} is required", key)))?;
        serde_json::from_value(value)
            .map_err(|e| AppError::new("E_INVALID_REQUEST", &format!("invalid {}: {}", key, e)))
    };
    let scores_a = match parse_scores("scores_a") {
        Ok(s) => s,
        Err(e) => return e.result(),
    };
    let scores_b = match parse_scores("scores_b") {
        Ok(s) => s,
        Err(e) => return e.result(),
    };

    let mut session = handle.lock().unwrap();
    match ctx.engine.submit(&mut session, &scores_a, &scores_b).await {
        Ok(question_id) => Ok(json!({
            "ok": true,
            "question_id": question_id,
            "rows_appended": 2,
        })),
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn my_evaluations(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let session = handle.lock().unwrap();
    match ctx.engine.my_evaluations(&session).await {
        Ok(rows) => {
            let rows: Vec<Value> = rows
                .iter()
                .map(|r| {
                    json!({
                        "question_id": r.question_id,
                        "agent": r.agent,
                        "relevance": r.relevance,
                        "credibility": r.credibility,
                        "uncertainty": r.uncertainty,
                        "actionability": r.actionability,
                        "recorded_at": r.recorded_at,
                    })
                })
                .collect();
            Ok(json!({ "ok": true, "evaluations": rows }))
        }
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn review(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let question_id = match str_arg(args, "question_id") {
        Ok(q) => q.to_string(),
        Err(e) => return e.result(),
    };
    let session = handle.lock().unwrap();
    match ctx.engine.review(&session, &question_id).await {
        Ok(view) => {
            let entries: Vec<Value> = view
                .entries
                .iter()
                .map(|e| {
                    json!({
                        "agent": e.agent,
                        "response_text": e
                            .response_text
                            .clone()
                            .unwrap_or_else(|| "Response not available".to_string()),
                        "scores": {
                            "relevance": e.scores.relevance,
                            "credibility": e.scores.credibility,
                            "uncertainty": e.scores.uncertainty,
                            "actionability": e.scores.actionability,
                        },
                    })
                })
                .collect();
            Ok(json!({
                "ok": true,
                "question_id": view.question_id,
                "question_text": view
                    .question_text
                    .clone()
                    .unwrap_or_else(|| "Question text not available".to_string()),
                "entries": entries,
            }))
        }
        Err(e) => map_session_error(e).result(),
    }
}

pub async fn delete(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let question_id = match str_arg(args, "question_id") {
        Ok(q) => q.to_string(),
        Err(e) => return e.result(),
    };
    let mut session = handle.lock().unwrap();
    match ctx.engine.delete(&mut session, &question_id).await {
        Ok(removed) => Ok(json!({ "ok": true, "rows_removed": removed })),
        Err(e) => map_session_error(e).result(),
    }
}
