use serde::Serialize;

use crate::host::Host;
use crate::page::{EventKind, Page, add_class, has_class, remove_class, toggle_class};

pub const MENU_BUTTON_SELECTOR: &str = "#menu-button button";
pub const WIDE_CLASS: &str = "menu-wide-toggled";
pub const NARROW_CLASS: &str = "menu-narrow-toggled";
/// Widths strictly above this are "wide".
pub const WIDE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Wide,
    Narrow,
}

impl ViewportClass {
    pub fn from_width(width: u32) -> Self {
        if width > WIDE_BREAKPOINT {
            ViewportClass::Wide
        } else {
            ViewportClass::Narrow
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            ViewportClass::Wide => WIDE_CLASS,
            ViewportClass::Narrow => NARROW_CLASS,
        }
    }
}

/// The two markers are tracked separately; resizing never converts one into the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuState {
    pub wide_toggled: bool,
    pub narrow_toggled: bool,
}

pub fn state<H: Host>(page: &Page<H>) -> MenuState {
    let Some(body) = page.body() else {
        return MenuState::default();
    };
    MenuState {
        wide_toggled: has_class(&body, WIDE_CLASS),
        narrow_toggled: has_class(&body, NARROW_CLASS),
    }
}

pub fn apply<H: Host>(page: &Page<H>, state: MenuState) {
    let Some(body) = page.body() else { return };
    for (class, on) in [(WIDE_CLASS, state.wide_toggled), (NARROW_CLASS, state.narrow_toggled)] {
        if on {
            add_class(&body, class);
        } else {
            remove_class(&body, class);
        }
    }
}

pub fn setup<H: Host>(page: &Page<H>) {
    let Some(button) = page.query(MENU_BUTTON_SELECTOR) else {
        return;
    };
    let Some(body) = page.body() else { return };

    page.listen(&button, EventKind::Click, move |event| {
        event.prevent_default();
        let class = ViewportClass::from_width(event.host().viewport_width());
        let open = toggle_class(&body, class.marker());
        tracing::debug!(viewport = ?class, open, "menu toggled");
    });
}
