use crate::model::{RaterProfile, UserRecord};
use crate::storage::{parse_user_rows, TabularStore, USERS_SHEET};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

const USER_ID_LEN: usize = 8;

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Maps human-chosen identifiers to durable generated ids, backed by the
/// users sheet. Records are created once at first contact; only the
/// registration form ever sets the informational fields.
pub struct UserDirectory {
    store: Arc<dyn TabularStore>,
    require_password: bool,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn TabularStore>, require_password: bool) -> Self {
        Self {
            store,
            require_password,
        }
    }

    pub fn require_password(&self) -> bool {
        self.require_password
    }

    pub async fn all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let raw = self.store.read_all(USERS_SHEET).await?;
        Ok(parse_user_rows(&raw))
    }

    pub async fn find(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|u| u.username == username))
    }

    /// Identifier + password lookup for password-mode deployments.
    /// `None` covers both unknown username and digest mismatch.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> anyhow::Result<Option<UserRecord>> {
        let Some(user) = self.find(username).await? else {
            return Ok(None);
        };
        if user.password_hash == hash_password(password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Creates the rater on first contact: generates a short unique id,
    /// stores the profile fields, returns the record.
    pub async fn register(
        &self,
        profile: &RaterProfile,
        rng: &mut (impl Rng + Send),
    ) -> anyhow::Result<Option<UserRecord>> {
        if profile.username.trim().is_empty() {
            anyhow::bail!("username must not be empty");
        }
        let existing = self.all().await?;
        if existing.iter().any(|u| u.username == profile.username) {
            return Ok(None);
        }

        let password_hash = if self.require_password {
            let password = profile
                .password
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| anyhow::anyhow!("password required for registration"))?;
            hash_password(password)
        } else {
            String::new()
        };

        let taken: HashSet<&str> = existing.iter().map(|u| u.user_id.as_str()).collect();
        let user_id = generate_user_id(&taken, rng);

        let record = UserRecord {
            user_id,
            username: profile.username.clone(),
            password_hash,
            background: profile.background.clone(),
            role: profile.role.clone(),
            institution: profile.institution.clone(),
            wants_updates: if profile.wants_updates { "yes" } else { "no" }.to_string(),
        };
        self.store.append_row(USERS_SHEET, &record.to_row()).await?;
        Ok(Some(record))
    }
}

fn generate_user_id(taken: &HashSet<&str>, rng: &mut impl Rng) -> String {
    loop {
        let id: String = rng
            .sample_iter(&Alphanumeric)
            .take(USER_ID_LEN)
            .map(char::from)
            .collect();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}
