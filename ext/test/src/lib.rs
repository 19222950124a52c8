//! inex-test: conformance fixtures for inex chains
//!
//! Fixtures are YAML documents that describe a chain in config form plus the
//! candidates it must keep or drop. They pin down evaluation semantics
//! independently of the unit tests in `inex-core`.
//!
//! # Example
//!
//! ```
//! use inex_test::fixture::Fixture;
//!
//! let fixture = Fixture::from_yaml(r#"
//! name: exclude_narrows
//! chain:
//!   root:
//!     - { type: set, values: [foo, bar, baz] }
//!   stages:
//!     - exclude: { type: exact, value: bar }
//! cases:
//!   - { input: foo, expect: true }
//!   - { input: bar, expect: false }
//! "#).unwrap();
//!
//! fixture.run_and_assert();
//! ```

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Prelude for convenient imports.
pub mod prelude {
    #[cfg(feature = "fixtures")]
    pub use super::fixture::{CaseResult, Fixture, TestCase};
    pub use inex::prelude::*;
}

#[cfg(test)]
mod tests {
    use inex::prelude::*;

    #[test]
    fn core_is_reachable_through_prelude() {
        let mut chain = Chain::new();
        chain.root_mut().include(Predicate::prefix("src/"));

        assert!(chain.evaluate("src/lib.rs"));
        assert!(!chain.evaluate("tests/lib.rs"));
    }
}
