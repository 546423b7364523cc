use kuchiki::NodeRef;

use crate::host::Host;
use crate::page::{EventKind, Page, is_connected, is_hidden, set_hidden};

pub const BANNER_ID: &str = "site-banner";
pub const CLOSE_BUTTON_ID: &str = "banner-close-button";
pub const STORAGE_KEY: &str = "banner-contents";

/// Text of the banner's first paragraph, if it has one.
pub fn banner_text(banner: &NodeRef) -> Option<String> {
    banner.select_first("p").ok().map(|p| p.text_contents())
}

pub fn is_visible<H: Host>(page: &Page<H>) -> bool {
    page.element_by_id(BANNER_ID)
        .is_some_and(|banner| is_connected(&banner) && !is_hidden(&banner))
}

pub fn setup<H: Host>(page: &Page<H>) {
    let (Some(close), Some(banner)) = (
        page.element_by_id(CLOSE_BUTTON_ID),
        page.element_by_id(BANNER_ID),
    ) else {
        tracing::debug!("banner markup missing");
        return;
    };

    let dismissed = page.host().local_storage_get(STORAGE_KEY);
    let text = match banner_text(&banner) {
        Some(text) if dismissed.as_deref() != Some(text.as_str()) => text,
        _ => {
            tracing::debug!("banner empty or already dismissed");
            banner.detach();
            return;
        }
    };

    let target = banner.clone();
    page.listen(&close, EventKind::Click, move |event| {
        event.host().local_storage_set(STORAGE_KEY, &text);
        target.detach();
        tracing::debug!("banner dismissed");
    });
    set_hidden(&banner, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostState, MemoryHost};

    fn banner_page(text: &str) -> String {
        format!(
            r#"<body><div id="site-banner" hidden><p>{text}</p><button id="banner-close-button">x</button></div></body>"#
        )
    }

    fn visit(html: &str, state: HostState) -> Page<MemoryHost> {
        let page = Page::parse(html, MemoryHost::new().with_state(state));
        setup(&page);
        page
    }

    #[test]
    fn dismissal_is_keyed_on_text() {
        let page = visit(&banner_page("Dart 3 is out"), HostState::default());
        assert!(is_visible(&page));
        assert_eq!(page.listener_count(), 1);
        page.click("#banner-close-button").unwrap();
        assert!(!is_visible(&page));
        assert_eq!(page.listener_count(), 0);
        let state = page.into_host().into_state();
        assert_eq!(
            state.local_storage.get(STORAGE_KEY).map(String::as_str),
            Some("Dart 3 is out")
        );

        let same = visit(&banner_page("Dart 3 is out"), state.clone());
        assert!(!is_visible(&same));
        assert!(same.element_by_id(BANNER_ID).is_none());

        let changed = visit(&banner_page("Dart 3.1 is out"), state);
        assert!(is_visible(&changed));
    }

    #[test]
    fn banner_without_paragraph_is_removed() {
        let page = visit(
            r#"<div id="site-banner" hidden><button id="banner-close-button">x</button></div>"#,
            HostState::default(),
        );
        assert!(page.element_by_id(BANNER_ID).is_none());
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn missing_close_button_leaves_banner_alone() {
        let page = visit(
            r#"<div id="site-banner" hidden><p>hi</p></div>"#,
            HostState::default(),
        );
        let banner = page.element_by_id(BANNER_ID).unwrap();
        assert!(is_hidden(&banner));
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn missing_banner_leaves_close_button_alone() {
        let page = visit(
            r#"<button id="banner-close-button">x</button>"#,
            HostState::default(),
        );
        assert_eq!(page.listener_count(), 0);
        assert!(!is_visible(&page));
        page.click("#banner-close-button").unwrap();
        assert!(page.into_host().into_state().local_storage.is_empty());
    }

    #[test]
    fn only_latest_dismissal_is_kept() {
        let first = visit(&banner_page("one"), HostState::default());
        first.click("#banner-close-button").unwrap();
        let second = visit(&banner_page("two"), first.into_host().into_state());
        second.click("#banner-close-button").unwrap();
        let state = second.into_host().into_state();

        assert_eq!(state.local_storage.len(), 1);
        assert!(is_visible(&visit(&banner_page("one"), state)));
    }
}
