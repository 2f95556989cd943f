use adapteval_core::config::AuthConfig;
use adapteval_core::directory::hash_password;
use adapteval_core::directory::UserDirectory;
use adapteval_core::recorder::EvaluationLog;
use adapteval_core::responses::{write_response_file, ResponseStore};
use adapteval_core::session::Engine;
use adapteval_core::storage::cache::RatedPairsCache;
use adapteval_core::storage::memory::MemStore;
use adapteval_core::storage::TabularStore;
use adapteval_server::methods::{handle_call, MethodContext};
use adapteval_server::sessions::SessionRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const BASELINE: &str = "Plain-LLM";
const ALTERNATE: &str = "Climsight";

fn context(dir: &tempfile::TempDir) -> MethodContext {
    for idx in ["0", "1"] {
        write_response_file(
            dir.path(),
            "v",
            BASELINE,
            idx,
            "How should ports adapt to sea level rise?",
            "### Executive summary\nraise the quays\n---\n### Credibility\nhigh\n",
        )
        .unwrap();
        write_response_file(
            dir.path(),
            "v",
            ALTERNATE,
            idx,
            "How should ports adapt to sea level rise?",
            "### Executive summary\nmanaged retreat\n",
        )
        .unwrap();
    }

    let store: Arc<dyn TabularStore> = Arc::new(MemStore::with_headers());
    let engine = Engine {
        responses: ResponseStore::new(dir.path(), "v"),
        recorder: EvaluationLog::new(
            store.clone(),
            RatedPairsCache::new(64, Duration::from_secs(60)),
        ),
        directory: UserDirectory::new(store, false),
        baseline: BASELINE.to_string(),
        alternates: vec![ALTERNATE.to_string()],
    };

    MethodContext {
        engine,
        registry: SessionRegistry::new(64, Duration::from_secs(600)),
        auth: AuthConfig {
            require_password: false,
            dashboard_username: "admin".to_string(),
            dashboard_password_sha256: hash_password("letmein"),
        },
    }
}

async fn call(ctx: &MethodContext, method: &str, args: Value) -> Value {
    handle_call(ctx, method, &args).await.unwrap()
}

fn scores(v: u8) -> Value {
    json!({ "relevance": v, "credibility": v, "uncertainty": v, "actionability": v })
}

#[tokio::test]
async fn rater_flow_over_the_dispatch_table() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let opened = call(&ctx, "session/open", json!({})).await;
    assert_eq!(opened["ok"], true);
    let sid = opened["session_id"].as_str().unwrap().to_string();

    // unknown rater asks for a profile
    let identified = call(
        &ctx,
        "session/identify",
        json!({ "session_id": sid, "username": "ada" }),
    )
    .await;
    assert_eq!(identified["ok"], true);
    assert_eq!(identified["known"], false);
    assert_eq!(identified["profile_required"], true);

    let registered = call(
        &ctx,
        "session/register",
        json!({
            "session_id": sid,
            "profile": { "username": "", "role": "Researcher", "institution": "AWI" }
        }),
    )
    .await;
    assert_eq!(registered["ok"], true);
    assert_eq!(registered["user"]["username"], "ada");

    // the pair payload is anonymized
    let pair = call(&ctx, "session/next_pair", json!({ "session_id": sid })).await;
    assert_eq!(pair["ok"], true);
    assert_eq!(pair["exhausted"], false);
    let responses = pair["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 2);
    for r in responses {
        assert!(r.get("agent").is_none(), "agent must not leak to raters");
        assert!(r["label"].as_str().unwrap().starts_with("Response "));
    }

    // unset criterion rejected, nothing persisted
    let rejected = call(
        &ctx,
        "session/submit",
        json!({
            "session_id": sid,
            "scores_a": { "relevance": 5, "credibility": 0, "uncertainty": 5, "actionability": 5 },
            "scores_b": scores(6),
        }),
    )
    .await;
    assert_eq!(rejected["ok"], false);
    assert_eq!(rejected["error"]["code"], "E_INCOMPLETE_SCORES");

    let mine = call(&ctx, "session/my_evaluations", json!({ "session_id": sid })).await;
    assert_eq!(mine["evaluations"].as_array().unwrap().len(), 0);

    // valid submission appends exactly two rows
    let submitted = call(
        &ctx,
        "session/submit",
        json!({ "session_id": sid, "scores_a": scores(7), "scores_b": scores(4) }),
    )
    .await;
    assert_eq!(submitted["ok"], true);
    assert_eq!(submitted["rows_appended"], 2);
    let qid = submitted["question_id"].as_str().unwrap().to_string();

    let mine = call(&ctx, "session/my_evaluations", json!({ "session_id": sid })).await;
    assert_eq!(mine["evaluations"].as_array().unwrap().len(), 2);

    // review names the agents and carries the scores
    let review = call(
        &ctx,
        "session/review",
        json!({ "session_id": sid, "question_id": qid }),
    )
    .await;
    assert_eq!(review["ok"], true);
    let entries = review["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e["agent"] == BASELINE));
    assert!(entries.iter().any(|e| e["agent"] == ALTERNATE));

    // paired delete
    let deleted = call(
        &ctx,
        "session/delete",
        json!({ "session_id": sid, "question_id": qid }),
    )
    .await;
    assert_eq!(deleted["rows_removed"], 2);
}

#[tokio::test]
async fn exhaustion_is_a_normal_result() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let sid = call(&ctx, "session/open", json!({})).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    call(
        &ctx,
        "session/identify",
        json!({ "session_id": sid, "username": "bo" }),
    )
    .await;
    call(
        &ctx,
        "session/register",
        json!({ "session_id": sid, "profile": { "username": "" } }),
    )
    .await;

    // two questions, one alternate: two submissions exhaust the set
    for _ in 0..2 {
        let pair = call(&ctx, "session/next_pair", json!({ "session_id": sid })).await;
        assert_eq!(pair["exhausted"], false);
        let done = call(
            &ctx,
            "session/submit",
            json!({ "session_id": sid, "scores_a": scores(5), "scores_b": scores(5) }),
        )
        .await;
        assert_eq!(done["ok"], true);
    }

    let pair = call(&ctx, "session/next_pair", json!({ "session_id": sid })).await;
    assert_eq!(pair["ok"], true);
    assert_eq!(pair["exhausted"], true);
}

#[tokio::test]
async fn dashboard_is_password_gated() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let sid = call(&ctx, "session/open", json!({})).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let denied = call(&ctx, "dashboard/overview", json!({ "session_id": sid })).await;
    assert_eq!(denied["ok"], false);
    assert_eq!(denied["error"]["code"], "E_UNAUTHORIZED");

    let bad = call(
        &ctx,
        "dashboard/login",
        json!({ "session_id": sid, "username": "admin", "password": "wrong" }),
    )
    .await;
    assert_eq!(bad["ok"], false);
    assert_eq!(bad["error"]["code"], "E_INVALID_CREDENTIALS");

    let good = call(
        &ctx,
        "dashboard/login",
        json!({ "session_id": sid, "username": "admin", "password": "letmein" }),
    )
    .await;
    assert_eq!(good["ok"], true);

    let overview = call(&ctx, "dashboard/overview", json!({ "session_id": sid })).await;
    assert_eq!(overview["ok"], true);
    assert_eq!(overview["overview"]["evaluations"], 0);
}

#[tokio::test]
async fn question_review_sections_answers_with_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    // one completed evaluation so the review has content
    let sid = call(&ctx, "session/open", json!({})).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    call(
        &ctx,
        "session/identify",
        json!({ "session_id": sid, "username": "cy" }),
    )
    .await;
    call(
        &ctx,
        "session/register",
        json!({ "session_id": sid, "profile": { "username": "" } }),
    )
    .await;
    call(&ctx, "session/next_pair", json!({ "session_id": sid })).await;
    call(
        &ctx,
        "session/submit",
        json!({ "session_id": sid, "scores_a": scores(8), "scores_b": scores(3) }),
    )
    .await;

    call(
        &ctx,
        "dashboard/login",
        json!({ "session_id": sid, "username": "admin", "password": "letmein" }),
    )
    .await;
    let review = call(
        &ctx,
        "dashboard/question_review",
        json!({ "session_id": sid }),
    )
    .await;
    assert_eq!(review["ok"], true);
    let questions = review["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);

    let agents = questions[0]["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 2);
    let baseline = agents.iter().find(|a| a["agent"] == BASELINE).unwrap();
    assert_eq!(baseline["sections"]["Executive summary"], "raise the quays");
    assert_eq!(baseline["sections"]["Credibility"], "high");
    // labels never present in the text get the placeholder
    assert_eq!(baseline["sections"]["Uncertainty"], "(not found)");
}

#[tokio::test]
async fn unknown_session_and_unknown_method_are_distinct_failures() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let res = call(
        &ctx,
        "session/next_pair",
        json!({ "session_id": "nope" }),
    )
    .await;
    assert_eq!(res["error"]["code"], "E_UNKNOWN_SESSION");

    let err = handle_call(&ctx, "session/bogus", &json!({})).await;
    assert!(err.is_err());
}
