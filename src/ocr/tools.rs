//! Helpers for driving external extraction tools.

use std::io;
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Run `program` with `input` piped to stdin and collect its output.
///
/// stdin is written concurrently with reading stdout so large documents
/// cannot deadlock on a full pipe. The child is killed if the returned
/// future is dropped (e.g. by a timeout).
pub async fn run_with_stdin(program: &str, args: &[&str], input: &[u8]) -> io::Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin unavailable"))?;

    let write = async move {
        let result = stdin.write_all(input).await;
        drop(stdin);
        result
    };
    let (written, output) = tokio::join!(write, child.wait_with_output());
    let output = output?;

    // A tool that rejects its input may exit before reading all of it; the
    // exit status carries the real failure in that case.
    match written {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
        _ => Ok(output),
    }
}

/// Trimmed stderr of a failed tool, for error messages.
pub fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("exited with {}", output.status)
    } else {
        trimmed.to_string()
    }
}
