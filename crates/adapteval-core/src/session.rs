use crate::config::AppConfig;
use crate::directory::UserDirectory;
use crate::model::{EvaluationRow, RaterProfile, ScoreSet, UserRecord};
use crate::recorder::EvaluationLog;
use crate::responses::ResponseStore;
use crate::sampler::{sample_pair, SampledPair};
use crate::storage::cache::RatedPairsCache;
use crate::storage::TabularStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Explicit replacement for the page-rerun model: one state per session,
/// advanced by discrete operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingIdentity,
    AwaitingProfile,
    PresentingPair,
    AwaitingScores,
    Submitted,
    /// Terminal: every available combination has been rated.
    Exhausted,
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingIdentity => "awaiting-identity",
            SessionPhase::AwaitingProfile => "awaiting-profile",
            SessionPhase::PresentingPair => "presenting-pair",
            SessionPhase::AwaitingScores => "awaiting-scores",
            SessionPhase::Submitted => "submitted",
            SessionPhase::Exhausted => "exhausted",
        }
    }
}

/// One answer in its anonymized display slot. The agent name stays
/// server-side; rater-visible payloads carry only label and content.
#[derive(Debug, Clone)]
pub struct PresentedResponse {
    pub label: String,
    pub agent: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PresentedPair {
    pub question_id: String,
    pub index: String,
    pub question_text: String,
    pub responses: [PresentedResponse; 2],
}

/// Request-scoped session state. Lives in the server's session registry,
/// never in process-wide globals.
#[derive(Debug, Default)]
pub struct Session {
    pub user: Option<UserRecord>,
    pub pending_username: Option<String>,
    pub current: Option<PresentedPair>,
    pub dashboard: bool,
    phase: Option<SessionPhase>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if let Some(p) = self.phase {
            return p;
        }
        if self.user.is_none() {
            if self.pending_username.is_some() {
                SessionPhase::AwaitingProfile
            } else {
                SessionPhase::AwaitingIdentity
            }
        } else if self.current.is_some() {
            SessionPhase::AwaitingScores
        } else {
            SessionPhase::PresentingPair
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = Some(phase);
    }
}

#[derive(Debug)]
pub enum IdentifyOutcome {
    Known(UserRecord),
    /// Unknown identifier; the next submitted profile form creates the
    /// rater (identifier-only mode).
    NeedsProfile,
}

#[derive(Debug, Clone)]
pub struct ReviewEntry {
    pub agent: String,
    pub response_text: Option<String>,
    pub scores: ScoreSet,
}

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub question_id: String,
    pub question_text: Option<String>,
    pub entries: Vec<ReviewEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not identified; identify or register first")]
    NotIdentified,
    #[error("no active pair; request the next pair first")]
    NoActivePair,
    #[error("username already registered")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password required")]
    PasswordRequired,
    #[error("{0}")]
    IncompleteScores(String),
    #[error("evaluation for {0} is incomplete or missing")]
    ReviewIncomplete(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The evaluation engine: stateless over sessions, shared across them.
pub struct Engine {
    pub responses: ResponseStore,
    pub recorder: EvaluationLog,
    pub directory: UserDirectory,
    pub baseline: String,
    pub alternates: Vec<String>,
}

impl Engine {
    pub fn from_config(cfg: &AppConfig, store: Arc<dyn TabularStore>) -> Self {
        let cache = RatedPairsCache::new(
            cfg.cache.capacity,
            Duration::from_secs(cfg.cache.ttl_seconds),
        );
        Self {
            responses: ResponseStore::new(cfg.responses.root.clone(), cfg.responses.variant.clone()),
            recorder: EvaluationLog::new(store.clone(), cache),
            directory: UserDirectory::new(store, cfg.auth.require_password),
            baseline: cfg.responses.baseline.clone(),
            alternates: cfg.responses.alternates.clone(),
        }
    }

    /// Resolves a human-chosen identifier. Known raters move straight to
    /// pair presentation; unknown ones are asked for a profile
    /// (identifier-only mode) or refused (password mode).
    pub async fn identify(
        &self,
        session: &mut Session,
        username: &str,
        password: Option<&str>,
    ) -> Result<IdentifyOutcome, SessionError> {
        if self.directory.require_password() {
            let password = password.ok_or(SessionError::PasswordRequired)?;
            let Some(user) = self.directory.verify(username, password).await? else {
                return Err(SessionError::InvalidCredentials);
            };
            session.user = Some(user.clone());
            session.pending_username = None;
            session.set_phase(SessionPhase::PresentingPair);
            return Ok(IdentifyOutcome::Known(user));
        }

        match self.directory.find(username).await? {
            Some(user) => {
                session.user = Some(user.clone());
                session.pending_username = None;
                session.set_phase(SessionPhase::PresentingPair);
                Ok(IdentifyOutcome::Known(user))
            }
            None => {
                session.pending_username = Some(username.to_string());
                session.set_phase(SessionPhase::AwaitingProfile);
                Ok(IdentifyOutcome::NeedsProfile)
            }
        }
    }

    /// Creates the rater from the submitted profile form. A profile with
    /// an empty username falls back to the identifier from the preceding
    /// `identify` call.
    pub async fn register(
        &self,
        session: &mut Session,
        profile: &RaterProfile,
    ) -> Result<UserRecord, SessionError> {
        let mut profile = profile.clone();
        if profile.username.trim().is_empty() {
            if let Some(pending) = &session.pending_username {
                profile.username = pending.clone();
            }
        }
        if self.directory.require_password()
            && profile.password.as_deref().unwrap_or("").is_empty()
        {
            return Err(SessionError::PasswordRequired);
        }

        let mut rng = StdRng::from_entropy();
        let Some(user) = self.directory.register(&profile, &mut rng).await? else {
            return Err(SessionError::UsernameTaken);
        };
        session.user = Some(user.clone());
        session.pending_username = None;
        session.set_phase(SessionPhase::PresentingPair);
        Ok(user)
    }

    /// Samples the next unseen pair for the session's rater and stores
    /// the anonymized presentation in session state. Also serves the
    /// "change question" refresh: any unsubmitted pair is discarded.
    /// `Ok(None)` is exhaustion, a normal terminal state.
    pub async fn next_pair(
        &self,
        session: &mut Session,
    ) -> Result<Option<PresentedPair>, SessionError> {
        let user = session.user.as_ref().ok_or(SessionError::NotIdentified)?;
        let rated = self.recorder.rated_pairs(&user.user_id).await?;

        let mut rng = StdRng::from_entropy();
        let sampled = sample_pair(
            &self.responses,
            &self.baseline,
            &self.alternates,
            &rated,
            &mut rng,
        )?;

        match sampled {
            Some(pair) => {
                let presented = shuffle_presentation(&pair, &mut rng);
                session.current = Some(presented.clone());
                session.set_phase(SessionPhase::AwaitingScores);
                Ok(Some(presented))
            }
            None => {
                session.current = None;
                session.set_phase(SessionPhase::Exhausted);
                Ok(None)
            }
        }
    }

    /// Validates and persists the scores for the current pair: exactly
    /// two appended rows, or nothing at all on a validation failure.
    pub async fn submit(
        &self,
        session: &mut Session,
        scores_a: &ScoreSet,
        scores_b: &ScoreSet,
    ) -> Result<String, SessionError> {
        let user = session.user.as_ref().ok_or(SessionError::NotIdentified)?;
        let current = session.current.as_ref().ok_or(SessionError::NoActivePair)?;

        for (slot, scores) in [(&current.responses[0], scores_a), (&current.responses[1], scores_b)]
        {
            if let Err(msg) = scores.validate() {
                return Err(SessionError::IncompleteScores(format!(
                    "{}: {}",
                    slot.label, msg
                )));
            }
        }

        let rows = [
            EvaluationRow::new(
                &user.user_id,
                &current.question_id,
                &current.responses[0].agent,
                scores_a,
            ),
            EvaluationRow::new(
                &user.user_id,
                &current.question_id,
                &current.responses[1].agent,
                scores_b,
            ),
        ];
        let qid = current.question_id.clone();
        self.recorder.append_pair(rows).await?;
        session.current = None;
        session.set_phase(SessionPhase::Submitted);
        Ok(qid)
    }

    pub async fn my_evaluations(
        &self,
        session: &Session,
    ) -> Result<Vec<EvaluationRow>, SessionError> {
        let user = session.user.as_ref().ok_or(SessionError::NotIdentified)?;
        Ok(self.recorder.rows_for_user(&user.user_id).await?)
    }

    /// Both answers of one completed question with their scores. A
    /// question with anything other than its two paired rows is
    /// reported as incomplete.
    pub async fn review(
        &self,
        session: &Session,
        question_id_str: &str,
    ) -> Result<ReviewView, SessionError> {
        let user = session.user.as_ref().ok_or(SessionError::NotIdentified)?;
        let rows: Vec<EvaluationRow> = self
            .recorder
            .rows_for_user(&user.user_id)
            .await?
            .into_iter()
            .filter(|r| r.question_id == question_id_str)
            .collect();
        if rows.len() != 2 {
            return Err(SessionError::ReviewIncomplete(question_id_str.to_string()));
        }

        let index = question_id_str.trim_start_matches('Q');
        let question_text = self.responses.question_text(&self.baseline, index)?;

        let mut entries = Vec::with_capacity(2);
        for row in rows {
            let response_text = self
                .responses
                .load(&row.agent, index)?
                .map(|r| r.response_text);
            entries.push(ReviewEntry {
                agent: row.agent.clone(),
                response_text,
                scores: row.scores(),
            });
        }

        Ok(ReviewView {
            question_id: question_id_str.to_string(),
            question_text,
            entries,
        })
    }

    /// Paired delete of both rows for the given question.
    pub async fn delete(
        &self,
        session: &mut Session,
        question_id_str: &str,
    ) -> Result<usize, SessionError> {
        let user = session.user.as_ref().ok_or(SessionError::NotIdentified)?;
        let removed = self
            .recorder
            .delete_question(&user.user_id, question_id_str)
            .await?;
        if session
            .current
            .as_ref()
            .map(|c| c.question_id == question_id_str)
            .unwrap_or(false)
        {
            session.current = None;
            session.set_phase(SessionPhase::PresentingPair);
        }
        Ok(removed)
    }
}

/// Shuffles the two answers into anonymized display slots.
pub fn shuffle_presentation(pair: &SampledPair, rng: &mut impl Rng) -> PresentedPair {
    let mut slots = vec![
        (pair.baseline.agent.clone(), pair.baseline.response_text.clone()),
        (pair.alternate.agent.clone(), pair.alternate.response_text.clone()),
    ];
    slots.shuffle(rng);

    let mut it = slots.into_iter();
    let (agent_a, content_a) = it.next().unwrap_or_default();
    let (agent_b, content_b) = it.next().unwrap_or_default();

    PresentedPair {
        question_id: pair.question_id.clone(),
        index: pair.index.clone(),
        question_text: pair.baseline.question_text.clone(),
        responses: [
            PresentedResponse {
                label: "Response A".to_string(),
                agent: agent_a,
                content: content_a,
            },
            PresentedResponse {
                label: "Response B".to_string(),
                agent: agent_b,
                content: content_b,
            },
        ],
    }
}
