#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::error::ReportError;

/// A javadoc invocation under construction.
///
/// The underlying tool treats flags and key/value pairs positionally, so
/// tokens are kept in an ordered sequence and emitted exactly as appended.
#[derive(Debug, Clone)]
pub struct JavadocCommand {
    /// Resolved path of the executable.
    executable: PathBuf,
    /// Argument tokens, in append order.
    args:       Vec<String>,
}

impl JavadocCommand {
    /// Starts an invocation of the given executable.
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            args: Vec::new(),
        }
    }

    /// Appends a single flag or positional token.
    pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
        self.args.push(token.into());
        self
    }

    /// Appends a `-key value` pair as two consecutive tokens.
    pub fn arg_pair(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.args.push(format!("-{key}"));
        self.args.push(value.into());
        self
    }

    /// The argument tokens accumulated so far, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the tool to completion in `working_dir`, forwarding its output
    /// to the log. Success is judged solely by exit status; output is never
    /// interpreted.
    pub fn run(&self, working_dir: &Path) -> Result<(), ReportError> {
        let program = self.executable.display().to_string();
        debug!("Executing: {program} {}", self.args.iter().join(" "));

        let output = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ReportError::ProcessLaunch {
                program: program.clone(),
                source:  e,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!("{line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("{line}");
        }

        if !output.status.success() {
            return Err(ReportError::ProcessExit {
                program,
                status: output.status,
            });
        }

        Ok(())
    }
}

/// Quotes and escapes a value for use as a single argument token.
///
/// Values free of the quote character and whitespace pass through
/// unchanged; anything else is wrapped in the quote character with embedded
/// quotes backslash-escaped.
pub fn quote_and_escape(value: &str, quote: char) -> String {
    if !value.contains(quote) && !value.contains(char::is_whitespace) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(quote);
    for c in value.chars() {
        if c == quote {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}
