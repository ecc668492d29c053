//! Check definitions — the declarative unit of verification.
//!
//! A `Check` binds one probe to an ordered list of matchers. Checks are
//! immutable once parsed; everything here is plain data with serde derives
//! so suite files map directly onto these types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Observed / expected values ────────────────────────────────────────────────

/// A value observed by a probe or expected by a matcher.
///
/// The untagged representation lets suite files write `0`, `true`,
/// `"0.0.0.0"` or `[nginx]` without any type annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value, e.g. the home directory of a missing user.
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "(none)"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => Value::Str(s),
            None => Value::Null,
        }
    }
}

/// An expected value: either a literal, or a table keyed by platform
/// identifier (`centos`, `debian`, `ubuntu`, …) resolved once against the
/// probed target platform before evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    ByPlatform {
        platform: BTreeMap<String, Value>,
    },
    Literal(Value),
}

impl Expected {
    /// Returns the literal value, or `None` if this is an unresolved
    /// per-platform table.
    #[must_use]
    pub fn literal(&self) -> Option<&Value> {
        match self {
            Expected::Literal(v) => Some(v),
            Expected::ByPlatform { .. } => None,
        }
    }
}

impl From<Value> for Expected {
    fn from(v: Value) -> Self {
        Expected::Literal(v)
    }
}

// ── Probes ────────────────────────────────────────────────────────────────────

/// What to observe on the target. Exactly one variant per probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Stat a path: existence, kind, ownership, content digest.
    File(String),
    /// Processes whose command line contains the filter string.
    Process(String),
    /// A listening TCP/UDP port.
    Port(u16),
    /// Run an argv on the target and capture its output.
    Command(Vec<String>),
    /// HTTP GET issued from the runner against the given URL.
    Http(String),
    /// A system user account.
    User(String),
    /// A system service unit.
    Service(String),
}

impl ProbeSpec {
    /// Short name of the probe variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeSpec::File(_) => "file",
            ProbeSpec::Process(_) => "process",
            ProbeSpec::Port(_) => "port",
            ProbeSpec::Command(_) => "command",
            ProbeSpec::Http(_) => "http",
            ProbeSpec::User(_) => "user",
            ProbeSpec::Service(_) => "service",
        }
    }

    /// Human-readable probe subject, e.g. the path or port number.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            ProbeSpec::File(path) => path.clone(),
            ProbeSpec::Process(filter) => filter.clone(),
            ProbeSpec::Port(n) => n.to_string(),
            ProbeSpec::Command(argv) => argv.join(" "),
            ProbeSpec::Http(url) => url.clone(),
            ProbeSpec::User(name) | ProbeSpec::Service(name) => name.clone(),
        }
    }
}

// ── Matchers ──────────────────────────────────────────────────────────────────

/// Comparison operators for the `compare` matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
        };
        write!(f, "{s}")
    }
}

/// The predicate half of a matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Exact comparison against the expected value.
    Equals(Expected),
    /// Regular expression tested against a string field.
    Matches(String),
    /// List membership (or substring containment for string fields).
    Includes(Expected),
    /// Ordered comparison.
    Compare { op: CompareOp, value: Expected },
}

/// A predicate applied to one named field of a probe result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matcher {
    /// Result field the predicate reads, e.g. `listening` or `stdout`.
    pub field: String,
    /// Negate the predicate (`should_not` semantics).
    #[serde(default)]
    pub not: bool,
    #[serde(flatten)]
    pub kind: MatcherKind,
}

// ── Checks ────────────────────────────────────────────────────────────────────

/// A named pairing of one probe and its ordered matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub probe: ProbeSpec,
    /// Escalate the probe with sudo on the target.
    #[serde(default)]
    pub sudo: bool,
    /// Bounded probe-internal retries; a probe failure after the last
    /// attempt is a definitive Error outcome.
    #[serde(default)]
    pub retries: u32,
    #[serde(rename = "assert")]
    pub matchers: Vec<Matcher>,
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_deserialize_untagged_scalars() {
        assert_eq!(serde_yaml::from_str::<Value>("true").expect("bool"), Value::Bool(true));
        assert_eq!(serde_yaml::from_str::<Value>("80").expect("int"), Value::Int(80));
        assert_eq!(
            serde_yaml::from_str::<Value>("\"0.0.0.0\"").expect("str"),
            Value::Str("0.0.0.0".to_string())
        );
        assert_eq!(
            serde_yaml::from_str::<Value>("[nginx, mysqld]").expect("list"),
            Value::List(vec!["nginx".to_string(), "mysqld".to_string()])
        );
    }

    #[test]
    fn test_value_display_list_is_bracketed() {
        let v = Value::List(vec!["0.0.0.0".to_string(), "::".to_string()]);
        assert_eq!(v.to_string(), "[0.0.0.0, ::]");
    }

    #[test]
    fn test_value_display_null_is_none_marker() {
        assert_eq!(Value::Null.to_string(), "(none)");
    }

    #[test]
    fn test_expected_literal_accessor() {
        let lit = Expected::Literal(Value::Int(0));
        assert_eq!(lit.literal(), Some(&Value::Int(0)));

        let table: Expected =
            serde_yaml::from_str("platform:\n  centos: a\n  ubuntu: b\n").expect("table");
        assert!(table.literal().is_none());
    }

    #[test]
    fn test_probe_spec_exactly_one_variant() {
        let spec: ProbeSpec = serde_yaml::from_str("port: 80").expect("port probe");
        assert_eq!(spec, ProbeSpec::Port(80));

        // Two variant keys in one mapping must be rejected.
        let err = serde_yaml::from_str::<ProbeSpec>("port: 80\nfile: /etc\n");
        assert!(err.is_err(), "two probe variants must not parse");
    }

    #[test]
    fn test_probe_spec_command_takes_argv() {
        let spec: ProbeSpec =
            serde_yaml::from_str("command: [ssh-keygen, -F, github.com]").expect("command probe");
        assert_eq!(
            spec,
            ProbeSpec::Command(vec![
                "ssh-keygen".to_string(),
                "-F".to_string(),
                "github.com".to_string()
            ])
        );
    }

    #[test]
    fn test_matcher_flattened_kind_parses() {
        let m: Matcher =
            serde_yaml::from_str("field: listening\nequals: true\n").expect("matcher");
        assert_eq!(m.field, "listening");
        assert!(!m.not);
        assert_eq!(m.kind, MatcherKind::Equals(Expected::Literal(Value::Bool(true))));
    }

    #[test]
    fn test_matcher_negated_matches_parses() {
        let m: Matcher =
            serde_yaml::from_str("field: body\nnot: true\nmatches: \"fix the following\"\n")
                .expect("matcher");
        assert!(m.not);
        assert_eq!(m.kind, MatcherKind::Matches("fix the following".to_string()));
    }

    #[test]
    fn test_matcher_compare_parses() {
        let m: Matcher =
            serde_yaml::from_str("field: exit_status\ncompare:\n  op: ne\n  value: 0\n")
                .expect("matcher");
        assert_eq!(
            m.kind,
            MatcherKind::Compare {
                op: CompareOp::Ne,
                value: Expected::Literal(Value::Int(0)),
            }
        );
    }

    #[test]
    fn test_check_defaults_sudo_false_retries_zero() {
        let yaml = "\
name: nginx-port
probe:
  port: 80
assert:
  - field: listening
    equals: true
";
        let check: Check = serde_yaml::from_str(yaml).expect("check");
        assert_eq!(check.name, "nginx-port");
        assert!(!check.sudo);
        assert_eq!(check.retries, 0);
        assert_eq!(check.matchers.len(), 1);
    }

    #[test]
    fn test_check_platform_table_expected_value() {
        let yaml = "\
name: welcome-screen
probe:
  file: /dev/vcs
assert:
  - field: sha256
    equals:
      platform:
        centos: aaa
        ubuntu: bbb
";
        let check: Check = serde_yaml::from_str(yaml).expect("check");
        let MatcherKind::Equals(Expected::ByPlatform { platform }) = &check.matchers[0].kind
        else {
            panic!("expected a per-platform table");
        };
        assert_eq!(platform.get("centos"), Some(&Value::Str("aaa".to_string())));
    }
}
