//! Evaluator — concurrent check evaluation with ordered outcomes.
//!
//! Checks are independent units of work: a bounded worker pool evaluates
//! them in parallel, outcomes are buffered by registration index, and one
//! check's failure never aborts the others. A run-level timeout cancels
//! in-flight probes and records a timeout Error for every unfinished check.

use std::time::Duration;

use futures::StreamExt as _;

use crate::application::ports::{HttpClient, Transport};
use crate::application::probes::ProbeRunner;
use crate::domain::check::Check;
use crate::domain::matcher;
use crate::domain::outcome::Outcome;
use crate::domain::result::ProbeResult;
use crate::domain::suite::Suite;

/// Evaluation tuning, resolved from config and CLI flags by the caller.
#[derive(Debug, Clone, Copy)]
pub struct EvalOptions {
    /// Worker limit; clamped to at least 1.
    pub concurrency: usize,
    /// Whole-run deadline; `None` means no limit.
    pub run_timeout: Option<Duration>,
}

/// Evaluate every check in the suite against the runner's target.
///
/// Outcomes are returned in registration order regardless of completion
/// order.
pub async fn run<T, H>(suite: &Suite, runner: &ProbeRunner<T, H>, options: &EvalOptions) -> Vec<Outcome>
where
    T: Transport,
    H: HttpClient,
{
    let limit = options.concurrency.max(1);
    let deadline = options
        .run_timeout
        .map(|t| tokio::time::Instant::now() + t);

    let mut pending = futures::stream::iter(suite.checks().iter().enumerate().map(
        |(index, check)| async move { (index, evaluate_check(check, runner).await) },
    ))
    .buffer_unordered(limit);

    let mut slots: Vec<Option<Outcome>> = vec![None; suite.len()];
    let mut timed_out = false;
    loop {
        let next = match deadline {
            Some(at) => match tokio::time::timeout_at(at, pending.next()).await {
                Ok(next) => next,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            },
            None => pending.next().await,
        };
        let Some((index, outcome)) = next else { break };
        tracing::debug!(check = %outcome.name, status = ?outcome.status, "check evaluated");
        slots[index] = Some(outcome);
    }
    // Dropping the stream cancels every probe still in flight.
    drop(pending);

    let timeout_secs = options.run_timeout.map_or(0, |t| t.as_secs());
    suite
        .checks()
        .iter()
        .zip(slots)
        .map(|(check, slot)| {
            slot.unwrap_or_else(|| {
                let reason = if timed_out {
                    format!("run timed out after {timeout_secs}s")
                } else {
                    "evaluation cancelled".to_string()
                };
                Outcome::error(&check.name, reason)
            })
        })
        .collect()
}

async fn evaluate_check<T, H>(check: &Check, runner: &ProbeRunner<T, H>) -> Outcome
where
    T: Transport,
    H: HttpClient,
{
    match runner.execute(&check.probe, check.sudo, check.retries).await {
        Ok(result) => judge(check, &result),
        // Probe failure is an Error outcome, never a Fail: no matcher ran.
        Err(e) => Outcome::error(&check.name, e.to_string()),
    }
}

/// Apply a check's matchers, in order, to a probe result.
///
/// The first failing matcher short-circuits to a Fail outcome carrying its
/// mismatch detail; later matchers are not evaluated. Matcher machinery
/// failures (bad pattern, unknown field) yield Error.
#[must_use]
pub fn judge(check: &Check, result: &ProbeResult) -> Outcome {
    for m in &check.matchers {
        let observed = match result.field(&m.field) {
            Ok(v) => v,
            Err(e) => return Outcome::error(&check.name, e.to_string()),
        };
        match matcher::apply(&m.kind, &observed) {
            // A negated matcher fails exactly when the predicate holds.
            Ok(held) if held == m.not => {
                return Outcome::fail(
                    &check.name,
                    matcher::describe_mismatch(&m.field, m.not, &m.kind, &observed),
                );
            }
            Ok(_) => {}
            Err(e) => return Outcome::error(&check.name, e.to_string()),
        }
    }
    Outcome::pass(&check.name)
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::application::ports::{ExecOutput, HttpResponse};
    use crate::domain::check::{CompareOp, Expected, Matcher, MatcherKind, ProbeSpec, Value};
    use crate::domain::error::ProbeError;
    use crate::domain::outcome::OutcomeStatus;

    // -----------------------------------------------------------------------
    // Test doubles — canned results, no processes spawned
    // -----------------------------------------------------------------------

    #[derive(Clone, Default)]
    struct StaticTransport {
        outputs: HashMap<String, ExecOutput>,
        delays: HashMap<String, Duration>,
        unreachable: Vec<String>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl StaticTransport {
        fn with_output(mut self, program: &str, stdout: &str, exit_status: i64) -> Self {
            self.outputs.insert(
                program.to_string(),
                ExecOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_status,
                },
            );
            self
        }

        fn with_delay(mut self, program: &str, delay: Duration) -> Self {
            self.delays.insert(program.to_string(), delay);
            self
        }

        fn with_unreachable(mut self, program: &str) -> Self {
            self.unreachable.push(program.to_string());
            self
        }
    }

    impl Transport for StaticTransport {
        async fn run(
            &self,
            argv: &[String],
            _sudo: bool,
            _timeout: Duration,
        ) -> Result<ExecOutput, ProbeError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            let program = argv.first().cloned().unwrap_or_default();
            if let Some(delay) = self.delays.get(&program) {
                tokio::time::sleep(*delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.unreachable.contains(&program) {
                return Err(ProbeError::Unreachable("scripted failure".to_string()));
            }
            Ok(self.outputs.get(&program).cloned().unwrap_or(ExecOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_status: 0,
            }))
        }

        fn endpoint(&self) -> String {
            "static".to_string()
        }
    }

    struct NoHttp;

    impl HttpClient for NoHttp {
        async fn get(&self, _url: &str, _timeout: Duration) -> Result<HttpResponse, ProbeError> {
            Err(ProbeError::Unreachable("no http in tests".to_string()))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn command_check(name: &str, program: &str, matchers: Vec<Matcher>) -> Check {
        Check {
            name: name.to_string(),
            probe: ProbeSpec::Command(vec![program.to_string()]),
            sudo: false,
            retries: 0,
            matchers,
        }
    }

    fn exit_zero() -> Matcher {
        Matcher {
            field: "exit_status".to_string(),
            not: false,
            kind: MatcherKind::Equals(Expected::Literal(Value::Int(0))),
        }
    }

    fn runner(transport: StaticTransport) -> ProbeRunner<StaticTransport, NoHttp> {
        ProbeRunner::new(transport, NoHttp, Duration::from_secs(5))
    }

    fn options(concurrency: usize) -> EvalOptions {
        EvalOptions {
            concurrency,
            run_timeout: None,
        }
    }

    // -----------------------------------------------------------------------
    // Ordering and concurrency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_outcome_order_matches_registration_order() {
        let transport = StaticTransport::default()
            .with_delay("slow", Duration::from_millis(80))
            .with_delay("medium", Duration::from_millis(30));
        let mut suite = Suite::new();
        for name in ["slow", "fast", "medium"] {
            suite
                .register(command_check(name, name, vec![exit_zero()]))
                .expect("register");
        }

        let outcomes = run(&suite, &runner(transport), &options(3)).await;

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["slow", "fast", "medium"]);
        assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Pass));
    }

    #[tokio::test]
    async fn test_worker_limit_bounds_in_flight_probes() {
        let transport =
            StaticTransport::default().with_delay("task", Duration::from_millis(20));
        let max_in_flight = Arc::clone(&transport.max_in_flight);
        let mut suite = Suite::new();
        for i in 0..6 {
            suite
                .register(command_check(&format!("check-{i}"), "task", vec![exit_zero()]))
                .expect("register");
        }

        let outcomes = run(&suite, &runner(transport), &options(2)).await;

        assert_eq!(outcomes.len(), 6);
        assert!(
            max_in_flight.load(Ordering::SeqCst) <= 2,
            "worker pool exceeded its limit: {}",
            max_in_flight.load(Ordering::SeqCst)
        );
    }

    // -----------------------------------------------------------------------
    // Error and failure semantics
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_probe_failure_is_error_never_fail() {
        let transport = StaticTransport::default().with_unreachable("boom");
        let mut suite = Suite::new();
        // The matcher would fail if it ran — Error proves it never did.
        suite
            .register(command_check(
                "unreachable",
                "boom",
                vec![Matcher {
                    field: "exit_status".to_string(),
                    not: false,
                    kind: MatcherKind::Equals(Expected::Literal(Value::Int(999))),
                }],
            ))
            .expect("register");

        let outcomes = run(&suite, &runner(transport), &options(1)).await;

        assert_eq!(outcomes[0].status, OutcomeStatus::Error);
        let detail = outcomes[0].detail.as_deref().expect("detail");
        assert!(detail.contains("unreachable"), "got: {detail}");
    }

    #[tokio::test]
    async fn test_one_check_error_never_aborts_others() {
        let transport = StaticTransport::default()
            .with_unreachable("boom")
            .with_output("ok", "fine\n", 0);
        let mut suite = Suite::new();
        suite
            .register(command_check("bad", "boom", vec![exit_zero()]))
            .expect("register");
        suite
            .register(command_check("good", "ok", vec![exit_zero()]))
            .expect("register");

        let outcomes = run(&suite, &runner(transport), &options(2)).await;

        assert_eq!(outcomes[0].status, OutcomeStatus::Error);
        assert_eq!(outcomes[1].status, OutcomeStatus::Pass);
    }

    #[tokio::test]
    async fn test_first_failing_matcher_short_circuits() {
        let transport = StaticTransport::default().with_output("probe", "hello\n", 0);
        let mut suite = Suite::new();
        suite
            .register(command_check(
                "short-circuit",
                "probe",
                vec![
                    Matcher {
                        field: "stdout".to_string(),
                        not: false,
                        kind: MatcherKind::Matches("hello".to_string()),
                    },
                    Matcher {
                        field: "exit_status".to_string(),
                        not: false,
                        kind: MatcherKind::Equals(Expected::Literal(Value::Int(1))),
                    },
                    Matcher {
                        field: "stderr".to_string(),
                        not: false,
                        kind: MatcherKind::Equals(Expected::Literal(Value::Str(
                            "never evaluated".to_string(),
                        ))),
                    },
                ],
            ))
            .expect("register");

        let outcomes = run(&suite, &runner(transport), &options(1)).await;

        assert_eq!(outcomes[0].status, OutcomeStatus::Fail);
        let detail = outcomes[0].detail.as_deref().expect("detail");
        assert_eq!(detail, "exit_status: expected 1, got 0");
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_error_outcome() {
        let transport = StaticTransport::default().with_output("probe", "text\n", 0);
        let mut suite = Suite::new();
        suite
            .register(command_check(
                "bad-regex",
                "probe",
                vec![Matcher {
                    field: "stdout".to_string(),
                    not: false,
                    kind: MatcherKind::Matches("unclosed(".to_string()),
                }],
            ))
            .expect("register");

        let outcomes = run(&suite, &runner(transport), &options(1)).await;

        assert_eq!(outcomes[0].status, OutcomeStatus::Error);
        assert!(
            outcomes[0]
                .detail
                .as_deref()
                .expect("detail")
                .contains("invalid pattern")
        );
    }

    // -----------------------------------------------------------------------
    // Idempotence and cancellation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_same_suite_twice_yields_identical_outcomes() {
        let transport = StaticTransport::default()
            .with_output("alpha", "a\n", 0)
            .with_output("beta", "b\n", 3);
        let mut suite = Suite::new();
        suite
            .register(command_check("alpha", "alpha", vec![exit_zero()]))
            .expect("register");
        suite
            .register(command_check("beta", "beta", vec![exit_zero()]))
            .expect("register");
        let runner = runner(transport);

        let first = run(&suite, &runner, &options(2)).await;
        let second = run(&suite, &runner, &options(2)).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_run_timeout_marks_unfinished_checks_as_error() {
        let transport =
            StaticTransport::default().with_delay("forever", Duration::from_secs(30));
        let mut suite = Suite::new();
        suite
            .register(command_check("stuck-1", "forever", vec![exit_zero()]))
            .expect("register");
        suite
            .register(command_check("stuck-2", "forever", vec![exit_zero()]))
            .expect("register");

        let started = std::time::Instant::now();
        let outcomes = run(
            &suite,
            &runner(transport),
            &EvalOptions {
                concurrency: 2,
                run_timeout: Some(Duration::from_millis(50)),
            },
        )
        .await;

        assert!(started.elapsed() < Duration::from_secs(5), "timeout did not fire");
        for outcome in &outcomes {
            assert_eq!(outcome.status, OutcomeStatus::Error);
            assert!(
                outcome.detail.as_deref().expect("detail").contains("timed out"),
                "got: {:?}",
                outcome.detail
            );
        }
    }

    #[tokio::test]
    async fn test_probe_retries_eventually_surface_last_error() {
        let transport = StaticTransport::default().with_unreachable("flaky");
        let mut suite = Suite::new();
        let mut check = command_check("flaky", "flaky", vec![exit_zero()]);
        check.retries = 2;
        suite.register(check).expect("register");

        let outcomes = run(&suite, &runner(transport), &options(1)).await;

        assert_eq!(outcomes[0].status, OutcomeStatus::Error);
    }

    // -----------------------------------------------------------------------
    // judge() — spec scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn test_judge_nginx_port_scenario_passes() {
        let check = Check {
            name: "nginx-port".to_string(),
            probe: ProbeSpec::Port(80),
            sudo: false,
            retries: 0,
            matchers: vec![
                Matcher {
                    field: "listening".to_string(),
                    not: false,
                    kind: MatcherKind::Equals(Expected::Literal(Value::Bool(true))),
                },
                Matcher {
                    field: "addresses".to_string(),
                    not: false,
                    kind: MatcherKind::Includes(Expected::Literal(Value::Str(
                        "0.0.0.0".to_string(),
                    ))),
                },
            ],
        };
        let result = ProbeResult::Port {
            listening: true,
            addresses: vec!["0.0.0.0".to_string(), "::".to_string()],
            protocols: vec!["tcp".to_string()],
            processes: vec!["nginx".to_string()],
        };

        let outcome = judge(&check, &result);

        assert_eq!(outcome.status, OutcomeStatus::Pass);
        assert!(outcome.detail.is_none());
    }

    #[test]
    fn test_judge_deskpro_user_scenario_fails_with_expected_detail() {
        let check = Check {
            name: "deskpro-user".to_string(),
            probe: ProbeSpec::User("deskpro".to_string()),
            sudo: false,
            retries: 0,
            matchers: vec![
                Matcher {
                    field: "exists".to_string(),
                    not: false,
                    kind: MatcherKind::Equals(Expected::Literal(Value::Bool(true))),
                },
                Matcher {
                    field: "home".to_string(),
                    not: false,
                    kind: MatcherKind::Equals(Expected::Literal(Value::Str(
                        "/home/deskpro".to_string(),
                    ))),
                },
            ],
        };
        let result = ProbeResult::User {
            exists: true,
            home: Some("/home/dp".to_string()),
            primary_group: Some("deskpro".to_string()),
        };

        let outcome = judge(&check, &result);

        assert_eq!(outcome.status, OutcomeStatus::Fail);
        assert_eq!(
            outcome.detail.as_deref(),
            Some("home: expected /home/deskpro, got /home/dp")
        );
    }

    #[test]
    fn test_judge_unknown_field_is_error() {
        let check = Check {
            name: "bad-field".to_string(),
            probe: ProbeSpec::Port(80),
            sudo: false,
            retries: 0,
            matchers: vec![Matcher {
                field: "bandwidth".to_string(),
                not: false,
                kind: MatcherKind::Compare {
                    op: CompareOp::Gt,
                    value: Expected::Literal(Value::Int(0)),
                },
            }],
        };
        let result = ProbeResult::Port {
            listening: false,
            addresses: vec![],
            protocols: vec![],
            processes: vec![],
        };

        let outcome = judge(&check, &result);

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(
            outcome
                .detail
                .as_deref()
                .expect("detail")
                .contains("unknown field 'bandwidth'")
        );
    }

    #[test]
    fn test_judge_negated_matcher() {
        let check = Check {
            name: "no-warning".to_string(),
            probe: ProbeSpec::Http("http://localhost/health".to_string()),
            sudo: false,
            retries: 0,
            matchers: vec![Matcher {
                field: "body".to_string(),
                not: true,
                kind: MatcherKind::Matches("fix the following".to_string()),
            }],
        };

        let clean = ProbeResult::Http {
            status: 200,
            body: "All checks passed successfully.".to_string(),
        };
        assert_eq!(judge(&check, &clean).status, OutcomeStatus::Pass);

        let dirty = ProbeResult::Http {
            status: 200,
            body: "recommended that you fix the following".to_string(),
        };
        assert_eq!(judge(&check, &dirty).status, OutcomeStatus::Fail);
    }
}
