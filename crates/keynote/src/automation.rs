//! Slide text from a running Keynote, via `osascript`.

use deck_core::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// AppleScript that opens `path` in Keynote and returns one text item per slide.
pub fn build_script(path: &Path, open_delay_secs: u64) -> String {
    let posix_path = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");

    format!(
        r#"tell application "Keynote"
    activate
    open POSIX file "{path}"
    delay {delay}
    set slideContents to {{}}
    repeat with theSlide in slides of front document
        set slideText to ""
        try
            set slideText to (object text of default title item of theSlide) as string
        end try
        try
            set bodyText to (object text of default body item of theSlide) as string
            if bodyText is not "" then
                if slideText is "" then
                    set slideText to bodyText
                else
                    set slideText to slideText & return & bodyText
                end if
            end if
        end try
        repeat with textItem in text items of theSlide
            try
                set itemText to (object text of textItem) as string
                if itemText is not "" then
                    if slideText is "" then
                        set slideText to itemText
                    else
                        set slideText to slideText & return & itemText
                    end if
                end if
            end try
        end repeat
        set end of slideContents to slideText
    end repeat
    return slideContents
end tell"#,
        path = posix_path,
        delay = open_delay_secs
    )
}

/// Ask Keynote for the text of every slide of `path`, in order.
pub fn extract_slide_texts(path: &Path, open_delay_secs: u64, timeout: Duration) -> Result<Vec<String>> {
    if !cfg!(target_os = "macos") {
        return Err(Error::AutomationUnavailable(
            "Keynote automation requires macOS".into(),
        ));
    }

    let absolute = std::fs::canonicalize(path)?;
    let script = build_script(&absolute, open_delay_secs);

    let mut cmd = Command::new("osascript");
    // `-s s` prints the result in source form, so list items come back quoted
    cmd.arg("-s").arg("s").arg("-e").arg(script);

    log::info!("Asking Keynote for slide text (timeout {}s)", timeout.as_secs());
    let output = run_with_timeout(cmd, timeout)?;
    Ok(parse_list_output(&output))
}

/// Run a command, capturing stdout, killing it once `timeout` elapses.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<String> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::AutomationUnavailable(format!(
                "{} not found",
                cmd.get_program().to_string_lossy()
            )),
            _ => Error::IoError(e),
        })?;

    let stdout = child
        .stdout
        .take()
        .map(drain)
        .ok_or_else(|| Error::KeynoteError("child stdout not captured".into()))?;
    let stderr = child
        .stderr
        .take()
        .map(drain)
        .ok_or_else(|| Error::KeynoteError("child stderr not captured".into()))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                log::warn!("Failed to kill automation process: {}", e);
            }
            // Reap it; the reader threads end when the pipes close
            let _ = child.wait();
            return Err(Error::AutomationTimeout {
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = join(stdout)?;
    let stderr = join(stderr)?;

    if !status.success() {
        return Err(Error::KeynoteError(format!(
            "automation exited with {}: {}",
            status,
            stderr.trim()
        )));
    }

    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join(handle: JoinHandle<std::io::Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| Error::KeynoteError("output reader panicked".into()))?
        .map_err(Error::IoError)
}

/// Parse an AppleScript list as printed by `osascript -s s`.
///
/// Quoted items are unescaped (`\"`, `\\`, `\n`, `\r`, `\t`). Output with no
/// quoted items is split on `, ` instead.
pub fn parse_list_output(output: &str) -> Vec<String> {
    let trimmed = output.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    if !inner.contains('"') {
        if inner.trim().is_empty() {
            return Vec::new();
        }
        return inner.split(", ").map(|s| s.trim().to_string()).collect();
    }

    let mut items = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut item = String::new();
        while let Some(c) = chars.next() {
            match c {
                '"' => break,
                '\\' => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('r') => item.push('\r'),
                    Some('t') => item.push('\t'),
                    Some(other) => item.push(other),
                    None => {}
                },
                _ => item.push(c),
            }
        }
        items.push(item);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_list() {
        let items = parse_list_output(r#"{"כותרת\rגוף", "", "say \"hi\"\\now"}"#);
        assert_eq!(items, vec!["כותרת\rגוף", "", "say \"hi\"\\now"]);
    }

    #[test]
    fn test_parse_unquoted_fallback() {
        assert_eq!(parse_list_output("first, second\n"), vec!["first", "second"]);
        assert!(parse_list_output("{}").is_empty());
        assert!(parse_list_output("  ").is_empty());
    }

    #[test]
    fn test_script_escapes_path() {
        let script = build_script(Path::new(r#"/tmp/a "b"\c.key"#), 4);
        assert!(script.contains(r#"open POSIX file "/tmp/a \"b\"\\c.key""#));
        assert!(script.contains("delay 4"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_output() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(r#"printf '{"a", "b"}'"#);
        let out = run_with_timeout(cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(parse_list_output(&out), vec!["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_failure() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo broken >&2; exit 3");
        let err = run_with_timeout(cmd, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, Error::KeynoteError(ref msg) if msg.contains("broken")));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let started = Instant::now();
        let err = run_with_timeout(cmd, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, Error::AutomationTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let cmd = Command::new("definitely-not-a-real-program-4242");
        let err = run_with_timeout(cmd, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::AutomationUnavailable(_)));
    }
}
