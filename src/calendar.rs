//! Calendar reminder links

use std::process::{Command, Stdio};

use url::Url;

use crate::catalog::Question;

const CALENDAR_RENDER_URL: &str = "https://www.google.com/calendar/render";

/// Google Calendar "new event" link reminding the user to solve `question`
pub fn reminder_url(question: &Question) -> Result<Url, url::ParseError> {
    let title = format!("Solve: {}", question.name);
    let details =
        format!("Time to practice a DSA problem!\nProblem Link: {}", question.link);

    Url::parse_with_params(
        CALENDAR_RENDER_URL,
        &[("action", "TEMPLATE"), ("text", title.as_str()), ("details", details.as_str())],
    )
}

/// Open `url` in a new browser tab
///
/// Only a failure to launch the opener is reported; the browser runs
/// detached with its output discarded so it cannot draw over the TUI.
pub fn open_in_browser(url: &Url) -> std::io::Result<()> {
    browser_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Platform opener for `url`
fn browser_command(url: &Url) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url.as_str());
        command
    }
    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url.as_str()]);
        command
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url.as_str());
        command
    }
}
