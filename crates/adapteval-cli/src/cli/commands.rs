use super::args::*;
use adapteval_core::config::{load_config, AppConfig};
use adapteval_core::model::{EvaluationRow, UserRecord};
use adapteval_core::responses::{write_response_file, AuditIssue, ResponseStore};
use adapteval_core::storage::{
    build_store, parse_eval_rows, parse_user_rows, TabularStore, EVALUATIONS_HEADER,
    EVALUATIONS_SHEET, USERS_SHEET,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args).await,
        Command::Validate(args) => cmd_validate(args).await,
        Command::Stats(args) => cmd_stats(args).await,
        Command::Export(args) => cmd_export(args).await,
        Command::Users(args) => cmd_users(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

async fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if !args.config.exists() {
        if let Some(parent) = args.config.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        adapteval_core::config::write_sample_config(&args.config)
            .map_err(|e| anyhow::anyhow!(e))?;
        eprintln!("created {}", args.config.display());
    } else {
        eprintln!("note: {} already exists", args.config.display());
    }

    if args.gitignore {
        let gi_path = Path::new(".gitignore");
        if !gi_path.exists() {
            std::fs::write(gi_path, crate::templates::GITIGNORE)?;
            eprintln!("created .gitignore");
        } else {
            eprintln!("note: .gitignore already exists (skipped)");
        }
    }

    if args.demo {
        let cfg = load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
        write_demo_tree(&cfg)?;
        eprintln!(
            "created demo response tree under {}",
            cfg.responses.root.display()
        );
    }

    Ok(exit_codes::OK)
}

fn write_demo_tree(cfg: &AppConfig) -> anyhow::Result<()> {
    for (agent, idx, text) in crate::templates::demo_responses() {
        write_response_file(
            &cfg.responses.root,
            &cfg.responses.variant,
            agent,
            &idx.to_string(),
            crate::templates::DEMO_QUESTIONS[idx],
            text,
        )?;
    }
    Ok(())
}

async fn cmd_validate(args: ValidateArgs) -> anyhow::Result<i32> {
    let cfg = load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
    let store = ResponseStore::new(cfg.responses.root.clone(), cfg.responses.variant.clone());
    let issues = store.audit(&cfg.responses.baseline, &cfg.responses.alternates)?;

    for issue in &issues {
        match issue {
            AuditIssue::Missing { agent, index } => {
                eprintln!("MISSING   {}/response_{}.json", agent, index);
            }
            AuditIssue::Unparsable { agent, index, error } => {
                eprintln!("UNPARSABLE {}/response_{}.json: {}", agent, index, error);
            }
        }
    }

    let indices = store.indices(&cfg.responses.baseline)?;
    eprintln!(
        "checked {} questions x {} agents: {} issue(s)",
        indices.len(),
        1 + cfg.responses.alternates.len(),
        issues.len()
    );

    Ok(if issues.is_empty() {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}

async fn load_rows(store: &Arc<dyn TabularStore>) -> anyhow::Result<Vec<EvaluationRow>> {
    Ok(parse_eval_rows(&store.read_all(EVALUATIONS_SHEET).await?))
}

async fn load_users(store: &Arc<dyn TabularStore>) -> anyhow::Result<Vec<UserRecord>> {
    Ok(parse_user_rows(&store.read_all(USERS_SHEET).await?))
}

async fn cmd_stats(args: StatsArgs) -> anyhow::Result<i32> {
    let cfg = load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
    let store = build_store(&cfg)?;
    let rows = load_rows(&store).await?;
    let users = load_users(&store).await?;

    let report = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "overview": adapteval_stats::overview(&rows),
        "agent_summary": adapteval_stats::summary::agent_summary(&rows),
        "correlations": adapteval_stats::correlation::criterion_correlations(&rows),
        "distributions": adapteval_stats::distribution::score_distributions(&rows),
        "questions": adapteval_stats::review::question_summaries(&rows, &users),
    });

    emit(&args.out, &serde_json::to_string_pretty(&report)?)?;
    Ok(exit_codes::OK)
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<i32> {
    let cfg = load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
    let store = build_store(&cfg)?;
    let rows = load_rows(&store).await?;

    let body = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(&rows)?,
        "csv" => render_csv(&rows),
        other => {
            eprintln!("config error: unknown export format {}", other);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    emit(&args.out, &body)?;
    Ok(exit_codes::OK)
}

fn render_csv(rows: &[EvaluationRow]) -> String {
    let mut out = String::new();
    out.push_str(&EVALUATIONS_HEADER.join(","));
    out.push('\n');
    for row in rows {
        out.push_str(&row.to_row().join(","));
        out.push('\n');
    }
    out
}

async fn cmd_users(args: UsersArgs) -> anyhow::Result<i32> {
    let cfg = load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
    let store = build_store(&cfg)?;
    let users = load_users(&store).await?;

    for u in &users {
        println!("{}\t{}\t{}\t{}", u.user_id, u.username, u.role, u.institution);
    }
    eprintln!("{} registered rater(s)", users.len());
    Ok(exit_codes::OK)
}

fn emit(out: &Option<PathBuf>, body: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, body)?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapteval_core::model::ScoreSet;

    #[test]
    fn csv_export_matches_the_sheet_layout() {
        let rows = vec![EvaluationRow::new(
            "u1",
            "Q1",
            "Plain-LLM",
            &ScoreSet {
                relevance: 5,
                credibility: 6,
                uncertainty: 7,
                actionability: 8,
            },
        )];
        let csv = render_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "user_id,question_id,agent,relevance,credibility,uncertainty,actionability,recorded_at"
        );
        assert!(lines.next().unwrap().starts_with("u1,Q1,Plain-LLM,5,6,7,8,"));
    }
}
