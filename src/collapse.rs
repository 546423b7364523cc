use kuchiki::NodeRef;
use serde::Serialize;

use crate::host::Host;
use crate::page::{EventKind, Page, add_class, find_by_id, has_class, remove_class, toggle_class};

pub const NAV_LINK_SELECTOR: &str = "a.nav-link.collapsible";
pub const NAV_COLLAPSED_CLASS: &str = "collapsed";

pub const INLINE_TOC_ID: &str = "site-toc--inline";
pub const INLINE_TOC_TOGGLE_SELECTOR: &str = ".site-toc--inline__toggle";
pub const INLINE_TOC_COLLAPSED_CLASS: &str = "toc-collapsed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapse {
    Expanded,
    Collapsed,
}

impl Collapse {
    pub fn of(node: &NodeRef, marker: &str) -> Self {
        if has_class(node, marker) {
            Collapse::Collapsed
        } else {
            Collapse::Expanded
        }
    }

    pub fn apply(self, node: &NodeRef, marker: &str) {
        match self {
            Collapse::Collapsed => add_class(node, marker),
            Collapse::Expanded => remove_class(node, marker),
        }
    }
}

pub fn setup_nav<H: Host>(page: &Page<H>) {
    let links = page.query_all(NAV_LINK_SELECTOR);
    tracing::debug!(count = links.len(), "collapsible nav links");
    for link in links {
        let target = link.clone();
        page.listen(&link, EventKind::Click, move |event| {
            toggle_class(&target, NAV_COLLAPSED_CLASS);
            event.prevent_default();
        });
    }
}

pub fn setup_inline_toc<H: Host>(page: &Page<H>) {
    for toggle in page.query_all(INLINE_TOC_TOGGLE_SELECTOR) {
        let document = page.document().clone();
        page.listen(&toggle, EventKind::Click, move |_| {
            if let Some(toc) = find_by_id(&document, INLINE_TOC_ID) {
                toggle_class(&toc, INLINE_TOC_COLLAPSED_CLASS);
            }
        });
    }
}

pub fn inline_toc_state<H: Host>(page: &Page<H>) -> Option<Collapse> {
    page.element_by_id(INLINE_TOC_ID)
        .map(|toc| Collapse::of(&toc, INLINE_TOC_COLLAPSED_CLASS))
}
