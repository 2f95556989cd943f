use super::{resolve_session, AppError, MethodContext};
use adapteval_core::directory::hash_password;
use adapteval_core::sections::{split_sections, Section};
use adapteval_stats::{correlation, distribution, review, summary, Criterion};
use serde_json::{json, Value};

const SECTION_PLACEHOLDER: &str = "(not found)";

fn require_dashboard(ctx: &MethodContext, args: &Value) -> Result<(), AppError> {
    let handle = resolve_session(ctx, args)?;
    let session = handle.lock().unwrap();
    if session.dashboard {
        Ok(())
    } else {
        Err(AppError::new(
            "E_UNAUTHORIZED",
            "dashboard access requires dashboard/login",
        ))
    }
}

pub async fn login(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    let handle = match resolve_session(ctx, args) {
        Ok(h) => h,
        Err(e) => return e.result(),
    };
    let username = args.get("username").and_then(|v| v.as_str()).unwrap_or("");
    let password = args.get("password").and_then(|v| v.as_str()).unwrap_or("");

    let configured = !ctx.auth.dashboard_username.is_empty()
        && !ctx.auth.dashboard_password_sha256.is_empty();
    let ok = configured
        && username == ctx.auth.dashboard_username
        && hash_password(password) == ctx.auth.dashboard_password_sha256;

    if !ok {
        tracing::warn!(event = "dashboard_login_failed", username = %username);
        return AppError::new("E_INVALID_CREDENTIALS", "authentication failed").result();
    }

    let mut session = handle.lock().unwrap();
    session.dashboard = true;
    Ok(json!({ "ok": true, "authenticated": true }))
}

pub async fn overview(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    if let Err(e) = require_dashboard(ctx, args) {
        return e.result();
    }
    let rows = ctx.engine.recorder.all_rows().await?;
    let overview = adapteval_stats::overview(&rows);
    Ok(json!({ "ok": true, "overview": overview }))
}

pub async fn agent_summary(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    if let Err(e) = require_dashboard(ctx, args) {
        return e.result();
    }
    let rows = ctx.engine.recorder.all_rows().await?;
    let summaries: Vec<Value> = summary::agent_summary(&rows)
        .iter()
        .map(|s| {
            json!({
                "agent": s.agent,
                "criterion": s.criterion.name(),
                "n": s.n,
                "mean": s.mean,
                "std": s.std,
                "min": s.min,
                "max": s.max,
            })
        })
        .collect();
    Ok(json!({ "ok": true, "summaries": summaries }))
}

pub async fn correlations(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    if let Err(e) = require_dashboard(ctx, args) {
        return e.result();
    }
    let rows = ctx.engine.recorder.all_rows().await?;
    let entries: Vec<Value> = correlation::criterion_correlations(&rows)
        .iter()
        .map(|e| {
            json!({
                "a": e.a.name(),
                "b": e.b.name(),
                "r": e.r,
                "n": e.n,
            })
        })
        .collect();
    Ok(json!({ "ok": true, "correlations": entries }))
}

pub async fn distributions(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    if let Err(e) = require_dashboard(ctx, args) {
        return e.result();
    }
    let rows = ctx.engine.recorder.all_rows().await?;
    let entries: Vec<Value> = distribution::score_distributions(&rows)
        .iter()
        .map(|d| {
            json!({
                "agent": d.agent,
                "criterion": d.criterion.name(),
                "counts": d.counts,
            })
        })
        .collect();
    Ok(json!({ "ok": true, "distributions": entries }))
}

/// Per-question means and demographics plus each agent's answer split
/// into the four named sections.
pub async fn question_review(ctx: &MethodContext, args: &Value) -> anyhow::Result<Value> {
    if let Err(e) = require_dashboard(ctx, args) {
        return e.result();
    }
    let rows = ctx.engine.recorder.all_rows().await?;
    let users = ctx.engine.directory.all().await?;
    let summaries = review::question_summaries(&rows, &users);

    let mut questions = Vec::with_capacity(summaries.len());
    for q in &summaries {
        let index = q.question_id.trim_start_matches('Q').to_string();
        let question_text = ctx
            .engine
            .responses
            .question_text(&ctx.engine.baseline, &index)?
            .unwrap_or_else(|| "Question text not available".to_string());

        let mut agents = Vec::with_capacity(q.agents.len());
        for a in &q.agents {
            let mut means = serde_json::Map::new();
            for (ci, criterion) in Criterion::ALL.iter().enumerate() {
                means.insert(criterion.name().to_string(), json!(a.means[ci]));
            }

            let sections_json = match ctx.engine.responses.load(&a.agent, &index)? {
                Some(resp) => {
                    let sections = split_sections(&resp.response_text);
                    let mut out = serde_json::Map::new();
                    for section in Section::ALL {
                        let text = sections
                            .get(&section)
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .unwrap_or_else(|| SECTION_PLACEHOLDER.to_string());
                        out.insert(section.label().to_string(), json!(text));
                    }
                    json!(out)
                }
                None => json!(null),
            };

            agents.push(json!({
                "agent": a.agent,
                "n": a.n,
                "means": means,
                "sections": sections_json,
            }));
        }

        questions.push(json!({
            "question_id": q.question_id,
            "question_text": question_text,
            "evaluations": q.evaluations,
            "evaluators": q.evaluators,
            "agents": agents,
            "roles": q.roles,
            "institutions": q.institutions,
        }));
    }

    Ok(json!({ "ok": true, "questions": questions }))
}
