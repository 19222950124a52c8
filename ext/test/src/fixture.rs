//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against inex chains built from
//! [`ChainConfig`].

use inex::{Chain, ChainConfig, InexError, StageId};
use serde::Deserialize;

/// A complete test fixture.
///
/// Either `cases` are run against the built chain, or `expect_error` names
/// the [`InexError`] variant building must fail with.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Chain in config form. Kept as a raw value so that invalid configs
    /// surface as build errors rather than fixture parse errors.
    pub chain: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Expected error kind, e.g. `invalid_pattern`.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    #[serde(default)]
    pub name: Option<String>,
    pub input: String,
    pub expect: bool,
    /// Evaluate from this stage (0 = root, in config order) instead of the root.
    #[serde(default)]
    pub from_stage: Option<usize>,
}

impl TestCase {
    fn label(&self) -> String {
        match (&self.name, self.from_stage) {
            (Some(name), _) => name.clone(),
            (None, Some(stage)) => format!("{:?} from stage {stage}", self.input),
            (None, None) => format!("{:?}", self.input),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
}

/// Snake-case name of an error variant, as used by `expect_error`.
#[must_use]
pub fn error_kind(err: &InexError) -> &'static str {
    match err {
        InexError::InvalidPattern { .. } => "invalid_pattern",
        InexError::InvalidConfig { .. } => "invalid_config",
        InexError::DepthExceeded { .. } => "depth_exceeded",
        InexError::TooManyStages { .. } => "too_many_stages",
        InexError::TooManyPredicates { .. } => "too_many_predicates",
        InexError::PatternTooLong { .. } => "pattern_too_long",
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the fixture's chain.
    ///
    /// # Errors
    ///
    /// Returns the config or compile error, if any.
    pub fn build(&self) -> Result<Chain, InexError> {
        ChainConfig::from_value(self.chain.clone())?.build()
    }

    /// Run all test cases and return results
    ///
    /// # Panics
    ///
    /// If the chain fails to build, or a case names a stage the chain
    /// does not have.
    pub fn run(&self) -> Vec<CaseResult> {
        let chain = self
            .build()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to build: {e}", self.name));

        self.cases
            .iter()
            .map(|case| {
                let start = stage_at(&chain, case.from_stage.unwrap_or(0)).unwrap_or_else(|| {
                    panic!(
                        "Fixture '{}' case {} names a missing stage",
                        self.name,
                        case.label()
                    )
                });
                let actual = chain.evaluate_from(start, &case.input);

                let trace = chain.evaluate_with_trace(start, &case.input);
                assert_eq!(
                    trace.result,
                    actual,
                    "Fixture '{}' case {}: trace disagrees with evaluation",
                    self.name,
                    case.label()
                );

                CaseResult {
                    case_name: case.label(),
                    passed: actual == case.expect,
                    expected: case.expect,
                    actual,
                }
            })
            .collect()
    }

    /// Run the fixture and panic on first failure
    pub fn run_and_assert(&self) {
        if let Some(expected) = &self.expect_error {
            match self.build() {
                Ok(_) => panic!(
                    "Fixture '{}' expected error '{expected}', but the chain built",
                    self.name
                ),
                Err(e) => assert_eq!(
                    error_kind(&e),
                    expected,
                    "Fixture '{}' failed with the wrong error: {e}",
                    self.name
                ),
            }
            return;
        }

        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case {} failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

/// The `n`th stage reachable from the root.
fn stage_at(chain: &Chain, n: usize) -> Option<StageId> {
    chain.stages(chain.root_id()).nth(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_multi_document() {
        let yaml = r#"
name: first
chain: { root: [{ type: always_true }] }
cases: [{ input: x, expect: true }]
---
name: second
chain: { root: [{ type: regex, pattern: "[" }] }
expect_error: invalid_pattern
"#;
        let fixtures = Fixture::from_yaml_multi(yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 1);
        assert_eq!(fixtures[1].expect_error.as_deref(), Some("invalid_pattern"));

        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn run_reports_failures() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong_expectation
chain: { root: [{ type: exact, value: a }] }
cases:
  - { name: right, input: a, expect: true }
  - { name: wrong, input: b, expect: true }
"#,
        )
        .unwrap();

        let results = fixture.run();
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].case_name, "wrong");
        assert!(!results[1].actual);
    }

    #[test]
    fn from_stage_selects_later_stage() {
        let fixture = Fixture::from_yaml(
            r#"
name: from_stage
chain:
  root: [{ type: prefix, value: src/ }]
  stages:
    - include: { type: suffix, value: .rs }
cases:
  - { input: tests/a.rs, expect: false }
  - { input: tests/a.rs, expect: true, from_stage: 1 }
"#,
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    #[should_panic(expected = "missing stage")]
    fn from_stage_out_of_range_panics() {
        let fixture = Fixture::from_yaml(
            r#"
name: out_of_range
chain: { root: [{ type: always_true }] }
cases: [{ input: x, expect: true, from_stage: 3 }]
"#,
        )
        .unwrap();
        fixture.run();
    }

    #[test]
    #[should_panic(expected = "wrong error")]
    fn wrong_error_kind_panics() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong_kind
chain: { root: [{ type: regex, pattern: "(" }] }
expect_error: depth_exceeded
"#,
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn error_kinds_are_snake_case() {
        let err = InexError::TooManyStages { count: 300, max: 256 };
        assert_eq!(error_kind(&err), "too_many_stages");
    }
}
