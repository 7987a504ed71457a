//! Subprocess plumbing shared by the command-backed story source and image engine.

use std::{
    io::{Read, Write},
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use anyhow::{Context as _, anyhow, bail};

/// Default per-call timeout for external generators.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// An external generator program with `{placeholder}` argument templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Substitute `{name}` placeholders in every argument.
    pub fn expand_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (name, value)| {
                    acc.replace(&format!("{{{name}}}"), value)
                })
            })
            .collect()
    }

    /// Run the program to completion and return its stdout.
    ///
    /// Non-zero exit, spawn failure and timeout are errors. On timeout the child is killed.
    pub fn run(&self, vars: &[(&str, &str)], stdin: Option<&str>) -> anyhow::Result<Vec<u8>> {
        let args = self.expand_args(vars);
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn '{}'", self.program))?;

        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_string();
                Some(std::thread::spawn(move || {
                    // A child that ignores stdin may close it early; that is not an error.
                    let _ = pipe.write_all(input.as_bytes());
                }))
            }
            _ => None,
        };
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = std::thread::spawn(move || drain(stdout));
        let err_reader = std::thread::spawn(move || drain(stderr));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait().context("wait for child")? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                bail!(
                    "'{}' timed out after {:.1}s",
                    self.program,
                    self.timeout.as_secs_f64()
                );
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if let Some(w) = writer {
            w.join().map_err(|_| anyhow!("stdin writer panicked"))?;
        }
        let out = out_reader
            .join()
            .map_err(|_| anyhow!("stdout reader panicked"))?;
        let err = err_reader
            .join()
            .map_err(|_| anyhow!("stderr reader panicked"))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&err);
            bail!(
                "'{}' exited with {status}: {}",
                self.program,
                tail(stderr.trim(), 400)
            );
        }
        Ok(out)
    }
}

fn drain<R: Read>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut r) = reader {
        let _ = r.read_to_end(&mut buf);
    }
    buf
}

fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let skip = count - max_chars;
    s.char_indices().nth(skip).map_or(s, |(i, _)| &s[i..])
}

#[cfg(test)]
#[path = "../tests/unit/external.rs"]
mod tests;
