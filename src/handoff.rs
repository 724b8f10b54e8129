//! Interactive commands that take over the terminal (logs, shell).

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

/// Lines of history shown by the logs handoff.
pub const LOG_TAIL: &str = "200";

/// An external program that runs with the terminal handed over to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handoff {
    pub program: String,
    pub args: Vec<String>,
}

impl Handoff {
    /// `docker logs --tail 200 <id>`
    pub fn logs(id: &str) -> Self {
        Self {
            program: "docker".into(),
            args: vec!["logs".into(), "--tail".into(), LOG_TAIL.into(), id.into()],
        }
    }

    /// `docker exec -it <id> sh`
    pub fn shell(id: &str) -> Self {
        Self {
            program: "docker".into(),
            args: vec!["exec".into(), "-it".into(), id.into(), "sh".into()],
        }
    }

    /// Run with inherited stdio and wait for it to finish.
    pub fn run(&self) -> io::Result<ExitStatus> {
        tracing::info!(command = %self, "handing terminal over");
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }
}

impl fmt::Display for Handoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}
