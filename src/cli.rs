use std::path::PathBuf;

use clap::Parser;

use crate::host::{DEFAULT_USER_AGENT, DEFAULT_VIEWPORT_WIDTH};

/// One invocation is one visit to the page.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// HTML page to load.
    #[arg(long)]
    pub input: PathBuf,

    /// JSON file holding local storage and cookies between visits.
    ///
    /// Read before the page is set up (a missing file starts empty) and written back afterwards.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// CSS selector to click, in order. May be repeated.
    #[arg(long = "click", value_name = "SELECTOR")]
    pub clicks: Vec<String>,

    /// Viewport width in CSS pixels, used by the menu toggle.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    pub viewport_width: u32,

    /// Browser user agent, used for OS detection.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Simulate a browser without the async clipboard API.
    #[arg(long)]
    pub no_clipboard: bool,

    /// Where to write the resulting HTML. Defaults to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write a JSON summary of the page state to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}
