//! Execute stage
//!
//! [`NodeExecutor`] runs a compiled unit in a child `node` process. The script it
//! hands to node is the runtime prelude followed by one call that evaluates the unit:
//!
//!     <RuntimeContext::prelude()>
//!     __unv_run("<unit code as a JSON string>");
//!
//! Each `print` call comes back as one stdout line holding a JSON string, which is
//! decoded and appended to the context's log. An uncaught error ends the run with a
//! non-zero exit status and its stack on stderr.

use super::compiler::CompiledUnit;
use crate::unv::runtime::RuntimeContext;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Wall-clock limit applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The executed code threw. Holds the error's first line, e.g.
    /// `ReferenceError: x is not defined`.
    #[error("{0}")]
    Thrown(String),
    #[error("run timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("could not find `{program}`")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub trait Executor: Send + Sync {
    fn execute(
        &self,
        unit: &CompiledUnit,
        context: &mut RuntimeContext,
    ) -> Result<(), RuntimeError>;
}

#[derive(Debug, Clone)]
pub struct NodeExecutor {
    program: PathBuf,
    timeout: Duration,
}

impl NodeExecutor {
    /// Resolve `program` (a name on `PATH` or a path) to an executable.
    pub fn locate(program: &str) -> Result<Self, RuntimeError> {
        let path = which::which(program).map_err(|source| RuntimeError::NotFound {
            program: program.to_string(),
            source,
        })?;
        tracing::debug!(program = %path.display(), "located node");
        Ok(NodeExecutor {
            program: path,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full script text handed to node for `unit`.
    pub fn script(unit: &CompiledUnit, context: &RuntimeContext) -> String {
        let code = serde_json::Value::String(unit.code.clone()).to_string();
        format!("{}__unv_run({});\n", context.prelude(), code)
    }

    fn wait(&self, child: &mut Child) -> Result<bool, RuntimeError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.success());
            }
            if started.elapsed() >= self.timeout {
                child.kill()?;
                child.wait()?;
                return Err(RuntimeError::TimedOut(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Executor for NodeExecutor {
    fn execute(
        &self,
        unit: &CompiledUnit,
        context: &mut RuntimeContext,
    ) -> Result<(), RuntimeError> {
        let mut script = tempfile::Builder::new()
            .prefix("unv-")
            .suffix(".cjs")
            .tempfile()?;
        script.write_all(Self::script(unit, context).as_bytes())?;
        script.flush()?;

        tracing::debug!(script = %script.path().display(), "starting node");
        let mut child = Command::new(&self.program)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().map(collect_lines);
        let stderr = child.stderr.take().map(collect_text);
        let finished = self.wait(&mut child);

        let printed = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let errors = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

        for line in printed {
            let entry = serde_json::from_str::<String>(&line).unwrap_or(line);
            context.log.push(entry);
        }

        if finished? {
            return Ok(());
        }
        let message = errors
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("node exited with an error")
            .to_string();
        Err(RuntimeError::Thrown(message))
    }
}

fn collect_lines(stream: impl Read + Send + 'static) -> JoinHandle<Vec<String>> {
    thread::spawn(move || BufReader::new(stream).lines().map_while(Result::ok).collect())
}

fn collect_text(mut stream: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        let _ = stream.read_to_string(&mut text);
        text
    })
}
