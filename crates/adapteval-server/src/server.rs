use crate::config::ServerConfig;
use crate::methods::{self, MethodContext};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::timeout;

static RID: AtomicU64 = AtomicU64::new(1);

fn next_rid() -> String {
    let n = RID.fetch_add(1, Ordering::Relaxed);
    format!("r-{n:06}")
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

pub struct Server;

impl Server {
    /// Newline-delimited JSON-RPC on stdin/stdout. Stdout carries only
    /// protocol frames; all logging goes to stderr. Each request is a
    /// full synchronous pass through the dispatch table, mirroring the
    /// interaction-driven model of the survey front end.
    pub async fn run(ctx: MethodContext, cfg: ServerConfig) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let rid = next_rid();

            if line.len() > cfg.max_msg_bytes {
                tracing::warn!(
                    event = "limit_exceeded",
                    rid = %rid,
                    bytes_in = line.len(),
                    max = cfg.max_msg_bytes
                );
                let resp = JsonRpcResponse::error(
                    None,
                    -32600,
                    format!("message bytes={} > max={}", line.len(), cfg.max_msg_bytes),
                );
                writeln!(stdout, "{}", serde_json::to_string(&resp)?)?;
                stdout.flush()?;
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let req: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(event = "json_parse_error", rid = %rid, error = %e);
                    continue; // stdio transport robustness: skip bad lines
                }
            };

            let resp = match req.method.as_str() {
                "initialize" => {
                    let info = serde_json::json!({
                        "serverInfo": {
                            "name": "adapteval-server",
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    });
                    JsonRpcResponse::ok(req.id.clone(), info)
                }
                "methods/list" => JsonRpcResponse::ok(
                    req.id.clone(),
                    serde_json::json!({ "methods": methods::list_methods() }),
                ),
                method => {
                    let default_args = serde_json::json!({});
                    let args = req.params.as_ref().unwrap_or(&default_args);

                    let start = std::time::Instant::now();
                    tracing::info!(
                        event = "rpc_start",
                        rid = %rid,
                        rpc_id = ?req.id,
                        method = method,
                        bytes_in = line.len(),
                    );

                    let fut = methods::handle_call(&ctx, method, args);
                    let result = match timeout(Duration::from_millis(cfg.timeout_ms), fut).await {
                        Ok(res) => res,
                        Err(_) => {
                            let dur = start.elapsed().as_millis() as u64;
                            tracing::warn!(
                                event = "rpc_timeout",
                                rid = %rid,
                                method = method,
                                duration_ms = dur,
                            );
                            Ok(serde_json::json!({
                                "ok": false,
                                "error": {
                                    "code": "E_TIMEOUT",
                                    "message": format!("request exceeded {}ms", cfg.timeout_ms)
                                }
                            }))
                        }
                    };

                    let dur = start.elapsed().as_millis() as u64;
                    match result {
                        Ok(val) => {
                            let ok = val.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
                            let code = val
                                .pointer("/error/code")
                                .and_then(|v| v.as_str())
                                .unwrap_or("");
                            tracing::info!(
                                event = "rpc_done",
                                rid = %rid,
                                method = method,
                                duration_ms = dur,
                                ok = ok,
                                code = code,
                            );
                            JsonRpcResponse::ok(req.id.clone(), val)
                        }
                        Err(e) => {
                            if e.to_string().starts_with("Unknown method") {
                                JsonRpcResponse::error(
                                    req.id.clone(),
                                    -32601,
                                    format!("Method not found: {}", method),
                                )
                            } else {
                                // store/internal failure: generic error
                                // toward the user, full detail in the log
                                tracing::error!(
                                    event = "rpc_crash",
                                    rid = %rid,
                                    method = method,
                                    duration_ms = dur,
                                    error = %e,
                                );
                                JsonRpcResponse::ok(
                                    req.id.clone(),
                                    serde_json::json!({
                                        "ok": false,
                                        "error": {
                                            "code": "E_INTERNAL",
                                            "message": "internal error; please try again later"
                                        }
                                    }),
                                )
                            }
                        }
                    }
                }
            };

            writeln!(stdout, "{}", serde_json::to_string(&resp)?)?;
            stdout.flush()?;
        }

        Ok(())
    }
}
