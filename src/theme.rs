use kuchiki::NodeRef;
use serde::Serialize;

use crate::host::Host;
use crate::page::{EventKind, Page, add_class, has_class, remove_class};

pub const SWITCHER_ID: &str = "theme-switcher";
pub const DARK_CLASS: &str = "dark-mode";
pub const LIGHT_CLASS: &str = "light-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    fn class(self) -> &'static str {
        match self {
            ThemeMode::Light => LIGHT_CLASS,
            ThemeMode::Dark => DARK_CLASS,
        }
    }
}

/// `None` until a marker is present; the stylesheet default applies then.
pub fn current<H: Host>(page: &Page<H>) -> Option<ThemeMode> {
    page.body().and_then(|body| marker(&body))
}

pub fn apply<H: Host>(page: &Page<H>, mode: ThemeMode) {
    if let Some(body) = page.body() {
        apply_to(&body, mode);
    }
}

pub fn setup<H: Host>(page: &Page<H>) {
    let Some(switcher) = page.element_by_id(SWITCHER_ID) else {
        tracing::debug!("no theme switcher");
        return;
    };
    let Some(body) = page.body() else { return };

    page.listen(&switcher, EventKind::Click, move |_| {
        // Anything but dark flips to dark, including no marker at all.
        let next = if has_class(&body, DARK_CLASS) {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        apply_to(&body, next);
        tracing::debug!(theme = ?next, "theme switched");
    });
}

fn marker(body: &NodeRef) -> Option<ThemeMode> {
    if has_class(body, DARK_CLASS) {
        Some(ThemeMode::Dark)
    } else if has_class(body, LIGHT_CLASS) {
        Some(ThemeMode::Light)
    } else {
        None
    }
}

fn apply_to(body: &NodeRef, mode: ThemeMode) {
    remove_class(body, mode.toggled().class());
    add_class(body, mode.class());
}
