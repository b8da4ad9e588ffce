//! Platform side effects: browser, clipboard and saving chart images.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use anyhow::{anyhow, Context, Result};
use base64::Engine;

pub const CHART_FILE_NAME: &str = "chart.png";

/// Open `url` in the system browser without waiting for it.
pub fn open_url(url: &str) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not open {}", url))?;
    Ok(())
}

#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Pipe `text` into the first clipboard helper that runs successfully.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for (program, args) in CLIPBOARD_COMMANDS {
        let Ok(child) = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        if feed_stdin(child, text)?.success() {
            return Ok(());
        }
    }
    Err(anyhow!("no clipboard helper available"))
}

/// Write `text` to the child's stdin, close it and wait for the child.
/// The child is reaped even when the write fails.
fn feed_stdin(mut child: Child, text: &str) -> Result<ExitStatus> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written.with_context(|| format!("clipboard helper exited with {}", status))?;
    Ok(status)
}

/// Decode a `data:<mime>;base64,<payload>` image source into raw bytes.
pub fn decode_image_source(source: &str) -> Result<Vec<u8>> {
    let rest = source
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("image is not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URL has no payload"))?;
    if !meta.ends_with(";base64") {
        return Err(anyhow!("data URL is not base64 encoded"));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("invalid base64 image payload")
}

/// Write the decoded image as `chart.png` inside `dir`, replacing any previous one.
pub fn save_chart(source: &str, dir: &Path) -> Result<PathBuf> {
    let bytes = decode_image_source(source)?;
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(CHART_FILE_NAME);
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
