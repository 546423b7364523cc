use std::sync::LazyLock;

use kuchiki::NodeRef;
use maud::html;
use regex::Regex;

use crate::host::Host;
use crate::page::{EventKind, Page, Task, attr, fragment};

pub const BLOCK_SELECTOR: &str = ".code-block-body";
pub const WRAPPER_CLASS: &str = "code-inner-buttons";
pub const DARTPAD_ID_ATTR: &str = "data-dartpad-id";
/// Ids of this many UTF-16 units or fewer are placeholders.
pub const MIN_DARTPAD_ID_LEN: usize = 5;

pub const DARTPAD_TITLE: &str = "Open in DartPad";
pub const COPY_TITLE: &str = "Copy to clipboard";

// Leading `$ ` shell prompts and `C:\path>` Windows prompts, on every line.
static PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\$|C:\\[^>\n]*>)[ \t]*").expect("prompt regex")
});

pub fn strip_prompts(code: &str) -> String {
    PROMPT_RE.replace_all(code, "").into_owned()
}

pub fn dartpad_url(id: &str) -> String {
    format!("https://dartpad.dev?id={id}&run=true")
}

/// Augments every code block once. Returns how many blocks got a button row.
pub fn setup<H: Host>(page: &Page<H>) -> usize {
    let clipboard = page.host().clipboard_available();
    let mut augmented = 0;

    for block in page.query_all(BLOCK_SELECTOR) {
        let Some(pre) = block.select_first("pre").ok().map(|p| p.as_node().clone()) else {
            continue;
        };
        let Some(wrapper) = fragment(html! { div class=(WRAPPER_CLASS) {} }) else {
            continue;
        };

        if let Some(id) = attr(&pre, DARTPAD_ID_ATTR) {
            if id.encode_utf16().count() > MIN_DARTPAD_ID_LEN {
                add_dartpad_button(page, &wrapper, &id);
            }
        }
        if clipboard {
            add_copy_button(page, &wrapper, &block);
        }

        block.append(wrapper);
        augmented += 1;
    }

    tracing::debug!(augmented, clipboard, "code block buttons ready");
    augmented
}

fn add_dartpad_button<H: Host>(page: &Page<H>, wrapper: &NodeRef, id: &str) {
    let Some(button) = icon_button(DARTPAD_TITLE, "open_in_new") else {
        return;
    };
    let url = dartpad_url(id);
    page.listen(&button, EventKind::Click, move |event| {
        event.host().open_window(&url);
    });
    wrapper.append(button);
}

fn add_copy_button<H: Host>(page: &Page<H>, wrapper: &NodeRef, block: &NodeRef) {
    let Some(button) = icon_button(COPY_TITLE, "content_copy") else {
        return;
    };
    let block = block.clone();
    page.listen(&button, EventKind::Click, move |event| {
        // Read at click time; the block's contents may have changed since setup.
        let Ok(pre) = block.select_first("pre") else {
            return;
        };
        let text = strip_prompts(&pre.text_contents());
        if !text.is_empty() {
            event.defer(Task::WriteClipboard(text));
        }
        event.prevent_default();
    });
    wrapper.append(button);
}

fn icon_button(title: &str, icon: &str) -> Option<NodeRef> {
    fragment(html! {
        button title=(title) {
            span class="material-symbols" aria-hidden="true" { (icon) }
        }
    })
}
