pub mod banner;
mod cli;
pub mod code_blocks;
pub mod collapse;
pub mod consent;
mod cookie;
mod host;
pub mod menu;
pub mod os;
mod page;
pub mod theme;

use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;

pub use cli::Args as CliArgs;
pub use cookie::{Cookie, SameSite};
pub use host::{Host, HostState, MemoryHost, StoredCookie};
pub use page::{ClickOutcome, Event, EventKind, Page, Task};

/// Wires every behavior onto the page. Call once, when the document is ready.
pub fn setup<H: Host>(page: &Page<H>) {
    theme::setup(page);
    banner::setup(page);
    collapse::setup_nav(page);
    consent::setup(page);
    code_blocks::setup(page);
    collapse::setup_inline_toc(page);
    menu::setup(page);
}

/// Observable page state after a visit.
#[derive(Debug, Serialize)]
pub struct Report {
    pub theme: Option<theme::ThemeMode>,
    pub menu: menu::MenuState,
    pub banner_visible: bool,
    pub cookie_notice_shown: bool,
    pub inline_toc: Option<collapse::Collapse>,
    pub os: Option<os::OperatingSystem>,
    pub clipboard: Option<String>,
    pub opened_windows: Vec<String>,
    pub navigations: Vec<String>,
}

impl Report {
    pub fn collect(page: &Page<MemoryHost>) -> Self {
        let host = page.host();
        Self {
            theme: theme::current(page),
            menu: menu::state(page),
            banner_visible: banner::is_visible(page),
            cookie_notice_shown: consent::is_shown(page),
            inline_toc: collapse::inline_toc_state(page),
            os: os::detect_os(host.user_agent()),
            clipboard: host.clipboard().map(str::to_string),
            opened_windows: host.opened_windows().to_vec(),
            navigations: host.navigations().to_vec(),
        }
    }
}

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let state = match &args.state {
        Some(path) => HostState::load(path)?,
        None => HostState::default(),
    };

    let host = MemoryHost::new()
        .with_state(state)
        .with_viewport_width(args.viewport_width)
        .with_user_agent(args.user_agent.as_str())
        .with_clipboard(!args.no_clipboard);
    let page = Page::parse(&html, host);
    setup(&page);
    tracing::debug!(listeners = page.listener_count(), "page ready");

    for selector in &args.clicks {
        let outcome = page
            .click(selector)
            .with_context(|| format!("click {selector}"))?;
        tracing::info!(
            selector = selector.as_str(),
            default_prevented = outcome.default_prevented,
            "clicked"
        );
    }
    let completed = page.run_pending();
    if completed > 0 {
        tracing::debug!(completed, "ran pending tasks");
    }

    let report = Report::collect(&page);
    let out_html = page.to_html()?;
    match &args.out {
        Some(path) => write_file(path, out_html.as_bytes())?,
        None => print!("{out_html}"),
    }

    if let Some(path) = &args.state {
        page.host().state().save(path)?;
    }
    if let Some(path) = &args.report {
        let json = serde_json::to_vec_pretty(&report).context("serialize report")?;
        write_file(path, &json)?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}
