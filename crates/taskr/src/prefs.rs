/*
[INPUT]:  Session data after login, display settings from the user
[OUTPUT]: prefs.json in the data directory
[POS]:    Persistence layer - key-value preference store
[UPDATE]: When adding preference keys
*/

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const PREFS_FILE: &str = "prefs.json";
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;

/// Logged-in user as remembered between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

/// Everything stored in prefs.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_text_size")]
    pub text_size: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            logged_in: false,
            user_id: 0,
            username: None,
            email: None,
            dark_mode: false,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

fn default_text_size() -> f32 {
    DEFAULT_TEXT_SIZE
}

/// File-backed preference store
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    prefs: Mutex<Preferences>,
}

impl PrefStore {
    /// Open (or create) the store inside `data_dir`
    pub async fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("create data directory {}", data_dir.display()))?;

        let path = data_dir.join(PREFS_FILE);
        let prefs = Self::load(&path).await?;

        Ok(Self {
            path,
            prefs: Mutex::new(prefs),
        })
    }

    async fn load(path: &Path) -> Result<Preferences> {
        if !path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(path).await?;
        match serde_json::from_str(&content) {
            Ok(prefs) => Ok(prefs),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable preferences, starting fresh");
                Ok(Preferences::default())
            }
        }
    }

    pub async fn snapshot(&self) -> Preferences {
        self.prefs.lock().await.clone()
    }

    /// Remember the logged-in user
    pub async fn save_login(&self, user_id: i64, username: &str, email: &str) -> Result<()> {
        self.update(|prefs| {
            prefs.logged_in = true;
            prefs.user_id = user_id;
            prefs.username = Some(username.to_string());
            prefs.email = Some(email.to_string());
        })
        .await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.prefs.lock().await.logged_in
    }

    /// Current session, if any
    pub async fn session(&self) -> Option<Session> {
        let prefs = self.prefs.lock().await;
        if !prefs.logged_in {
            return None;
        }
        Some(Session {
            user_id: prefs.user_id,
            username: prefs.username.clone().unwrap_or_default(),
            email: prefs.email.clone().unwrap_or_default(),
        })
    }

    /// Current session or an error telling the user to log in
    pub async fn require_session(&self) -> Result<Session> {
        self.session()
            .await
            .ok_or_else(|| anyhow!("Not logged in. Run `taskr login` first."))
    }

    /// Forget everything, display settings included
    pub async fn logout(&self) -> Result<()> {
        self.update(|prefs| *prefs = Preferences::default()).await
    }

    pub async fn set_text_size(&self, size: f32) -> Result<()> {
        if !size.is_finite() || size <= 0.0 {
            return Err(anyhow!("Text size must be a positive number"));
        }
        self.update(|prefs| prefs.text_size = size).await
    }

    pub async fn text_size(&self) -> f32 {
        self.prefs.lock().await.text_size
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.update(|prefs| prefs.dark_mode = enabled).await
    }

    pub async fn is_dark_mode(&self) -> bool {
        self.prefs.lock().await.dark_mode
    }

    /// Apply `f` and persist; memory only changes once the file is written
    async fn update(&self, f: impl FnOnce(&mut Preferences)) -> Result<()> {
        let mut prefs = self.prefs.lock().await;
        let mut next = prefs.clone();
        f(&mut next);
        self.save(&next).await?;
        *prefs = next;
        Ok(())
    }

    async fn save(&self, prefs: &Preferences) -> Result<()> {
        let content = serde_json::to_string_pretty(prefs)?;

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path)
            .await
            .context("persist preferences")?;
        Ok(())
    }
}
