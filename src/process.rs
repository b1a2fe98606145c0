//! Child-process plumbing shared by the database builder and the runner

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{BlastError, BlastResult};

/// Render a program + argument list the way a shell user would type it,
/// for error messages and logging only. Invocation never goes through a
/// shell.
pub(crate) fn render_command(program: &Path, args: &[OsString]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        rendered.push(' ');
        if arg.contains(char::is_whitespace) {
            rendered.push('"');
            rendered.push_str(&arg);
            rendered.push('"');
        } else {
            rendered.push_str(&arg);
        }
    }
    rendered
}

/// Run a command to completion, capturing both output streams in full.
///
/// A spawn failure (missing or non-executable binary) is reported as a
/// [`BlastError::Tool`] carrying the rendered command, the same as a runtime
/// failure of the tool itself.
pub(crate) fn run_captured(program: &Path, args: &[OsString]) -> BlastResult<(Output, String)> {
    let rendered = render_command(program, args);
    tracing::debug!(command = %rendered, "running external tool");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| BlastError::Tool {
            command: rendered.clone(),
            stderr: format!("failed to execute: {}", e),
        })?;

    Ok((output, rendered))
}

/// Whether an executable can be invoked: either the configured path exists,
/// or a bare name resolves on the search path.
pub(crate) fn executable_available(exec: &Path) -> bool {
    if exec.components().count() > 1 {
        exec.exists()
    } else {
        which::which(exec).is_ok()
    }
}
