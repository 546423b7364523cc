use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        })
    }
}

/// A cookie as written by page script. `path` defaults to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    /// `None` is a session cookie.
    pub max_age: Option<Duration>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            same_site: SameSite::default(),
            max_age: None,
        }
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn expires_in_days(mut self, days: u64) -> Self {
        self.max_age = Some(Duration::from_secs(days * SECONDS_PER_DAY));
        self
    }

    /// Absolute expiry in unix seconds given the current time.
    pub fn expires_at(&self, now_unix: u64) -> Option<u64> {
        self.max_age.map(|age| now_unix.saturating_add(age.as_secs()))
    }

    /// Serializes the cookie the way it is assigned to `document.cookie`.
    pub fn to_header_string(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", age.as_secs()));
        }
        out.push_str(&format!("; SameSite={}", self.same_site));
        out
    }
}
