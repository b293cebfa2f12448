//! Host sessions
//!
//! [`Session`] runs one document through every stage and never fails: compile and
//! runtime errors are appended to the run log after whatever the program printed, and
//! the [`RunReport`] says which stage stopped it.
//!
//! [`LiveSession`] is the editor-facing wrapper. Documents are submitted through a
//! `tokio::sync::watch` channel, so a burst of edits collapses into the newest one. Runs
//! happen one at a time on a blocking worker, and a report is only published when no
//! newer document arrived while it was being produced.

use crate::unv::config::UnvConfig;
use crate::unv::pipeline::{
    CompileError, CompileOptions, CompiledUnit, Compiler, Executor, SourceCompiler,
};
use crate::unv::runtime::{ModuleResolver, RuntimeContext, StandardModules};
use crate::unv::transpiling::{transpile_with, TranspileOptions};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Which stage ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    CompileFailed,
    RuntimeFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub revision: u64,
    pub outcome: Outcome,
    /// Transpiler output for the document.
    pub generated: String,
    /// Printed output in order, then the error that ended the run, if any.
    pub log: Vec<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

pub struct Session {
    compiler: Box<dyn Compiler>,
    executor: Box<dyn Executor>,
    resolver: Arc<dyn ModuleResolver>,
    transpile: TranspileOptions,
    compile: CompileOptions,
    revision: AtomicU64,
}

impl Session {
    pub fn new(config: &UnvConfig, executor: impl Executor + 'static) -> Self {
        Session {
            compiler: Box::new(SourceCompiler::new()),
            executor: Box::new(executor),
            resolver: Arc::new(StandardModules::new()),
            transpile: config.transpile.clone(),
            compile: config.compile.clone(),
            revision: AtomicU64::new(0),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn generate(&self, source: &str) -> String {
        transpile_with(source, &self.transpile)
    }

    /// Transpile and compile without running.
    pub fn compile(&self, source: &str) -> Result<CompiledUnit, CompileError> {
        self.compiler.compile(&self.generate(source), &self.compile)
    }

    pub fn run(&self, source: &str) -> RunReport {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let generated = self.generate(source);
        tracing::debug!(revision, lines = generated.lines().count(), "transpiled document");

        let unit = match self.compiler.compile(&generated, &self.compile) {
            Ok(unit) => unit,
            Err(error) => {
                tracing::warn!(revision, %error, "compile failed");
                return RunReport {
                    revision,
                    outcome: Outcome::CompileFailed,
                    generated,
                    log: vec![error.to_string()],
                };
            }
        };

        let mut context = RuntimeContext::new(Arc::clone(&self.resolver))
            .with_assign_helper(self.transpile.assign_helper.clone());
        let outcome = match self.executor.execute(&unit, &mut context) {
            Ok(()) => Outcome::Completed,
            Err(error) => {
                tracing::warn!(revision, %error, "run failed");
                context.log.push(error.to_string());
                Outcome::RuntimeFailed
            }
        };
        tracing::debug!(revision, entries = context.log.len(), ?outcome, "run finished");

        RunReport {
            revision,
            outcome,
            generated,
            log: context.log.take(),
        }
    }
}

/// Latest-wins runner around a shared [`Session`]. Must be created inside a tokio
/// runtime.
pub struct LiveSession {
    documents: watch::Sender<Option<String>>,
    reports: watch::Receiver<Option<RunReport>>,
    worker: JoinHandle<()>,
}

impl LiveSession {
    pub fn spawn(session: Arc<Session>) -> Self {
        let (documents, mut incoming) = watch::channel(None::<String>);
        let (publish, reports) = watch::channel(None::<RunReport>);

        let worker = tokio::spawn(async move {
            while incoming.changed().await.is_ok() {
                let Some(source) = incoming.borrow_and_update().clone() else {
                    continue;
                };

                let runner = Arc::clone(&session);
                let report = match tokio::task::spawn_blocking(move || runner.run(&source)).await {
                    Ok(report) => report,
                    Err(error) => {
                        tracing::warn!(%error, "run worker failed");
                        continue;
                    }
                };

                if incoming.has_changed().unwrap_or(false) {
                    tracing::debug!(revision = report.revision, "discarding superseded report");
                    continue;
                }
                if publish.send(Some(report)).is_err() {
                    break;
                }
            }
        });

        LiveSession {
            documents,
            reports,
            worker,
        }
    }

    /// Replace the pending document. Anything submitted earlier and not yet started is
    /// dropped.
    pub fn submit(&self, source: impl Into<String>) {
        self.documents.send_replace(Some(source.into()));
    }

    /// Most recently published report.
    pub fn latest(&self) -> Option<RunReport> {
        self.reports.borrow().clone()
    }

    /// Wait for the next published report. `None` once the worker has stopped.
    pub async fn next_report(&mut self) -> Option<RunReport> {
        self.reports.changed().await.ok()?;
        self.reports.borrow_and_update().clone()
    }

    /// A report published since the last call, without waiting.
    pub fn try_next_report(&mut self) -> Option<RunReport> {
        if self.reports.has_changed().unwrap_or(false) {
            self.reports.borrow_and_update().clone()
        } else {
            None
        }
    }

    pub async fn shutdown(self) {
        drop(self.documents);
        if let Err(error) = self.worker.await {
            tracing::warn!(%error, "live session worker ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unv::config::load_defaults;
    use crate::unv::pipeline::RuntimeError;

    /// Logs the unit's code and succeeds, or throws when the code mentions `boom`.
    struct EchoExecutor;

    impl Executor for EchoExecutor {
        fn execute(
            &self,
            unit: &CompiledUnit,
            context: &mut RuntimeContext,
        ) -> Result<(), RuntimeError> {
            context.log.push(format!("helper={}", context.assign_helper()));
            if unit.code.contains("boom") {
                return Err(RuntimeError::Thrown("Error: boom".into()));
            }
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new(&load_defaults().expect("defaults"), EchoExecutor)
    }

    #[test]
    fn test_completed_run() {
        let report = session().run("x = 1");
        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.generated, "var x = $assign(1)\n");
        assert_eq!(report.log, vec!["helper=$assign"]);
        assert_eq!(report.revision, 1);
    }

    #[test]
    fn test_runtime_error_follows_output() {
        let report = session().run("boom()");
        assert_eq!(report.outcome, Outcome::RuntimeFailed);
        assert_eq!(report.log, vec!["helper=$assign", "Error: boom"]);
    }

    #[test]
    fn test_compile_error_is_logged() {
        let report = session().run("f(");
        assert_eq!(report.outcome, Outcome::CompileFailed);
        assert_eq!(report.log, vec!["line 1: `(` is never closed"]);
        assert!(!report.succeeded());
    }

    #[test]
    fn test_revisions_increase() {
        let session = session();
        assert_eq!(session.run("a()").revision, 1);
        assert_eq!(session.run("b()").revision, 2);
    }
}
