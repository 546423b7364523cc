use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};

use crate::cookie::{Cookie, SameSite};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) docsite-behaviors/0.1";
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;

pub trait Host: 'static {
    fn local_storage_get(&self, key: &str) -> Option<String>;
    fn local_storage_set(&mut self, key: &str, value: &str);

    /// Current value of an unexpired cookie.
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&mut self, cookie: &Cookie);

    fn clipboard_available(&self) -> bool;
    fn write_clipboard(&mut self, text: &str) -> anyhow::Result<()>;

    fn open_window(&mut self, url: &str);
    fn navigate(&mut self, url: &str);

    fn viewport_width(&self) -> u32;
    fn user_agent(&self) -> &str;
}

/// Storage that survives between visits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    #[serde(default)]
    pub local_storage: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: BTreeMap<String, StoredCookie>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    /// Unix seconds; absent for session cookies.
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl HostState {
    /// Loads state from `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("serialize host state")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

/// In-memory [`Host`] used by the CLI and tests.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    state: HostState,
    now_unix: u64,
    viewport_width: u32,
    user_agent: String,
    clipboard_enabled: bool,
    clipboard_denied: bool,
    clipboard: Option<String>,
    opened_windows: Vec<String>,
    navigations: Vec<String>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            state: HostState::default(),
            now_unix,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            clipboard_enabled: true,
            clipboard_denied: false,
            clipboard: None,
            opened_windows: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: HostState) -> Self {
        self.state = state;
        self
    }

    pub fn with_clock(mut self, now_unix: u64) -> Self {
        self.now_unix = now_unix;
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_clipboard(mut self, enabled: bool) -> Self {
        self.clipboard_enabled = enabled;
        self
    }

    /// Clipboard stays advertised but every write is rejected.
    pub fn deny_clipboard_writes(mut self) -> Self {
        self.clipboard_denied = true;
        self
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    pub fn advance_clock(&mut self, secs: u64) {
        self.now_unix = self.now_unix.saturating_add(secs);
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    pub fn into_state(self) -> HostState {
        self.state
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn opened_windows(&self) -> &[String] {
        &self.opened_windows
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl Host for MemoryHost {
    fn local_storage_get(&self, key: &str) -> Option<String> {
        self.state.local_storage.get(key).cloned()
    }

    fn local_storage_set(&mut self, key: &str, value: &str) {
        self.state
            .local_storage
            .insert(key.to_string(), value.to_string());
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let stored = self.state.cookies.get(name)?;
        if stored.expires_at.is_some_and(|at| at <= self.now_unix) {
            return None;
        }
        Some(stored.value.clone())
    }

    fn set_cookie(&mut self, cookie: &Cookie) {
        tracing::debug!(cookie = %cookie.to_header_string(), "set cookie");
        self.state.cookies.insert(
            cookie.name.clone(),
            StoredCookie {
                value: cookie.value.clone(),
                path: cookie.path.clone(),
                same_site: cookie.same_site,
                expires_at: cookie.expires_at(self.now_unix),
            },
        );
    }

    fn clipboard_available(&self) -> bool {
        self.clipboard_enabled
    }

    fn write_clipboard(&mut self, text: &str) -> anyhow::Result<()> {
        if !self.clipboard_enabled {
            bail!("clipboard is not available");
        }
        if self.clipboard_denied {
            bail!("clipboard write permission denied");
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn open_window(&mut self, url: &str) {
        tracing::info!(url, "open window");
        self.opened_windows.push(url.to_string());
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn cookies_expire() {
        let mut host = MemoryHost::new().with_clock(1_000);
        host.set_cookie(&Cookie::new("k", "v").expires_in_days(1));
        host.set_cookie(&Cookie::new("session", "s"));
        assert_eq!(host.cookie("k").as_deref(), Some("v"));

        host.advance_clock(24 * 60 * 60);
        assert_eq!(host.cookie("k"), None);
        assert_eq!(host.cookie("session").as_deref(), Some("s"));
    }

    #[test]
    fn state_survives_save_and_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/state.json");
        assert_eq!(HostState::load(&path).unwrap(), HostState::default());

        let mut host = MemoryHost::new().with_clock(10);
        host.local_storage_set("banner-contents", "Hello");
        host.set_cookie(
            &Cookie::new("cookie-consent", "true")
                .same_site(SameSite::Strict)
                .expires_in_days(90),
        );
        host.state().save(&path).unwrap();

        let loaded = HostState::load(&path).unwrap();
        assert_eq!(&loaded, host.state());
        let restored = MemoryHost::new().with_clock(20).with_state(loaded);
        assert_eq!(
            restored.local_storage_get("banner-contents").as_deref(),
            Some("Hello")
        );
        assert_eq!(restored.cookie("cookie-consent").as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_state_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = HostState::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn denied_clipboard_keeps_previous_contents() {
        let mut host = MemoryHost::new().deny_clipboard_writes();
        assert!(host.clipboard_available());
        assert!(host.write_clipboard("x").is_err());
        assert_eq!(host.clipboard(), None);
    }
}
