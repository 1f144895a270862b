//! Native command mode: delegate the query to a system `whois` executable
//! and feed its stdout to the same parser as the built-in client.

use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::WhoisError;

/// Run `executable domain [extra_args…]` and return its stdout as the
/// reply text. Non-zero exit becomes [`WhoisError::CommandFailed`] with
/// the stderr payload.
pub async fn run_native_whois(
    executable: &str,
    domain: &str,
    extra_args: &[String],
    deadline: Duration,
) -> Result<String, WhoisError> {
    debug!("running {executable} {domain} {extra_args:?}");

    let mut command = Command::new(executable);
    command.arg(domain).args(extra_args).kill_on_drop(true);

    let output = timeout(deadline, command.output()).await??;

    if !output.status.success() {
        return Err(WhoisError::CommandFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
