//! Sessions end to end: stage wiring with a scripted executor, latest-wins publishing,
//! and real runs through node when it is installed.

use std::sync::Arc;
use std::time::Duration;
use unv::unv::config::load_defaults;
use unv::unv::pipeline::{CompiledUnit, Executor, NodeExecutor, RuntimeError};
use unv::unv::runtime::{Builtin, Module, RuntimeContext, StandardModules};
use unv::unv::session::{LiveSession, Outcome, Session};
use unv::unv::testing::UnvSamples;

/// Logs every non-blank line of the unit, sleeping first if configured to.
struct ScriptedExecutor {
    delay: Duration,
}

impl Executor for ScriptedExecutor {
    fn execute(
        &self,
        unit: &CompiledUnit,
        context: &mut RuntimeContext,
    ) -> Result<(), RuntimeError> {
        std::thread::sleep(self.delay);
        for line in unit.code.lines().filter(|l| !l.trim().is_empty()) {
            context.log.push(line.trim());
        }
        if context.resolver().resolve("extra").is_some() {
            context.log.push("extra module");
        }
        Ok(())
    }
}

fn scripted_session(delay: Duration) -> Session {
    let config = load_defaults().expect("defaults");
    Session::new(&config, ScriptedExecutor { delay })
}

fn node_session() -> Option<Session> {
    let executor = NodeExecutor::locate("node").ok()?;
    let config = load_defaults().expect("defaults");
    Some(Session::new(&config, executor.with_timeout(Duration::from_secs(10))))
}

#[test]
fn test_run_reports_compiled_code() {
    let report = scripted_session(Duration::ZERO).run("import print from 'standard'\nprint(1)");
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(
        report.log,
        vec!["const { print } = require('standard');", "print(1)"]
    );
    assert_eq!(report.generated, "import {print} from 'standard'\nprint(1)\n");
}

#[test]
fn test_custom_resolver_reaches_context() {
    let resolver =
        StandardModules::new().with_module(Module::new("extra").export("f", Builtin::Int));
    let session = scripted_session(Duration::ZERO).with_resolver(Arc::new(resolver));
    assert_eq!(session.run("x()").log, vec!["x()", "extra module"]);
}

#[test]
fn test_report_serializes() {
    let report = scripted_session(Duration::ZERO).run("f(");
    let json = serde_json::to_value(&report).expect("serializes");
    assert_eq!(json["outcome"], "compile_failed");
    assert_eq!(json["revision"], 1);
    assert_eq!(json["log"][0], "line 1: `(` is never closed");
}

#[tokio::test]
async fn test_live_session_publishes_report() {
    let mut live = LiveSession::spawn(Arc::new(scripted_session(Duration::ZERO)));
    assert!(live.latest().is_none());

    live.submit("x = 1");
    let report = live.next_report().await.expect("report");
    assert_eq!(report.log, vec!["var x = $assign(1)"]);
    assert_eq!(live.latest(), Some(report));

    live.shutdown().await;
}

#[tokio::test]
async fn test_live_session_latest_wins() {
    let mut live = LiveSession::spawn(Arc::new(scripted_session(Duration::from_millis(200))));

    live.submit("a = 1");
    tokio::time::sleep(Duration::from_millis(50)).await;
    live.submit("b = 2");

    let report = live.next_report().await.expect("report");
    assert_eq!(report.generated, "var b = $assign(2)\n");
    assert!(live.try_next_report().is_none());

    live.shutdown().await;
}

#[test]
fn test_node_runs_samples() {
    let Some(session) = node_session() else {
        return;
    };

    let report = session.run(UnvSamples::source("hello"));
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.log, vec!["\"Hello World!\""]);

    let report = session.run(UnvSamples::source("nested"));
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.log, vec!["3 2", "\"odd\" 1", "2"]);

    let report = session.run(UnvSamples::source("try"));
    assert_eq!(report.log, vec!["\"nope\"", "\"done\""]);
}

#[test]
fn test_node_error_follows_output() {
    let Some(session) = node_session() else {
        return;
    };

    let report = session.run(UnvSamples::source("errors"));
    assert_eq!(report.outcome, Outcome::RuntimeFailed);
    assert_eq!(
        report.log,
        vec!["\"before\"", "ReferenceError: missing is not defined"]
    );
}

#[test]
fn test_node_multi_value_assignment() {
    let Some(session) = node_session() else {
        return;
    };

    let source = "import print, type from 'standard'\n\
                  local a, b = [1, 'two']\n\
                  print(type(a), b)\n\
                  single = 5\n\
                  print(single)";
    let report = session.run(source);
    assert_eq!(report.log, vec!["\"number\" \"two\"", "5"]);
}

#[test]
fn test_node_timeout() {
    let Ok(executor) = NodeExecutor::locate("node") else {
        return;
    };
    let config = load_defaults().expect("defaults");
    let session = Session::new(&config, executor.with_timeout(Duration::from_millis(300)));

    let report = session.run("while true\n    x = 1");
    assert_eq!(report.outcome, Outcome::RuntimeFailed);
    assert_eq!(report.log, vec!["run timed out after 300ms"]);
}
