use crate::cookie::{Cookie, SameSite};
use crate::host::Host;
use crate::page::{EventKind, Page, add_class, has_class, remove_class};

pub const NOTICE_ID: &str = "cookie-notice";
pub const AGREE_ID: &str = "cookie-consent";
pub const COOKIE_KEY: &str = "cookie-consent";
pub const CONSENT_VALUE: &str = "true";
pub const ACTIVE_CLASS: &str = "show";
pub const EXPIRY_DAYS: u64 = 90;

pub fn consent_cookie() -> Cookie {
    Cookie::new(COOKIE_KEY, CONSENT_VALUE)
        .same_site(SameSite::Strict)
        .expires_in_days(EXPIRY_DAYS)
}

pub fn has_consented<H: Host>(host: &H) -> bool {
    host.cookie(COOKIE_KEY).as_deref() == Some(CONSENT_VALUE)
}

pub fn is_shown<H: Host>(page: &Page<H>) -> bool {
    page.element_by_id(NOTICE_ID)
        .is_some_and(|notice| has_class(&notice, ACTIVE_CLASS))
}

pub fn setup<H: Host>(page: &Page<H>) {
    let (Some(notice), Some(agree)) = (page.element_by_id(NOTICE_ID), page.element_by_id(AGREE_ID))
    else {
        tracing::debug!("cookie notice markup missing");
        return;
    };

    if has_consented(&*page.host()) {
        return;
    }

    add_class(&notice, ACTIVE_CLASS);
    page.listen(&agree, EventKind::Click, move |event| {
        event.prevent_default();
        event.host().set_cookie(&consent_cookie());
        remove_class(&notice, ACTIVE_CLASS);
        tracing::debug!("cookie consent given");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostState, MemoryHost};

    const PAGE: &str = r##"<footer id="cookie-notice"><a id="cookie-consent" href="#">OK</a></footer>"##;

    #[test]
    fn agreeing_sets_cookie_and_hides_notice() {
        let page = Page::parse(PAGE, MemoryHost::new().with_clock(0));
        setup(&page);
        assert!(is_shown(&page));

        let outcome = page.click("#cookie-consent").unwrap();
        assert!(outcome.default_prevented);
        assert!(!is_shown(&page));
        assert!(page.host().navigations().is_empty());

        let state = page.into_host().into_state();
        let stored = &state.cookies[COOKIE_KEY];
        assert_eq!(stored.value, "true");
        assert_eq!(stored.same_site, SameSite::Strict);
        assert_eq!(stored.expires_at, Some(90 * 24 * 60 * 60));
    }

    #[test]
    fn consent_suppresses_notice_until_expiry() {
        let mut host = MemoryHost::new().with_clock(0);
        host.set_cookie(&consent_cookie());
        let state = host.into_state();

        let page = Page::parse(PAGE, MemoryHost::new().with_clock(10).with_state(state.clone()));
        setup(&page);
        assert!(!is_shown(&page));
        assert_eq!(page.listener_count(), 0);

        let later = MemoryHost::new()
            .with_clock(EXPIRY_DAYS * 24 * 60 * 60)
            .with_state(state);
        let page = Page::parse(PAGE, later);
        setup(&page);
        assert!(is_shown(&page));
    }

    #[test]
    fn other_cookie_values_do_not_count() {
        let mut state = HostState::default();
        let mut host = MemoryHost::new();
        host.set_cookie(&Cookie::new(COOKIE_KEY, "false"));
        state.cookies = host.into_state().cookies;

        let page = Page::parse(PAGE, MemoryHost::new().with_state(state));
        setup(&page);
        assert!(is_shown(&page));
    }

    #[test]
    fn missing_agree_button_is_a_no_op() {
        let page = Page::parse(r#"<footer id="cookie-notice"></footer>"#, MemoryHost::new());
        setup(&page);
        assert!(!is_shown(&page));
        assert_eq!(page.listener_count(), 0);
    }
}
