//! Structured error types.
//!
//! Configuration mistakes (made while assembling a machine) and runtime
//! mistakes (made while driving one) are deliberately kept as separate
//! enums: a configuration error always means "the mutation was rejected,
//! no partial effect", while a runtime error means "this accessor call
//! was a no-op against an unknown name".

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("state enumeration must contain value 0 (the mandatory initial state)")]
    MissingInitialState,

    #[error("state enumeration contains a negative value: {0}")]
    NegativeEnumValue(i32),

    #[error("duplicate name `{0}`: input and output names must be unique among their own kind, and event names must not collide with a condition atom")]
    DuplicateName(String),

    #[error("unknown state id {0}")]
    UnknownState(i32),

    #[error("unknown input `{0}`")]
    UnknownInput(String),

    #[error("unknown output `{0}`")]
    UnknownOutput(String),

    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    #[error("edge token `{0}` is neither a known condition atom nor a known event")]
    UnknownEdgeToken(String),

    #[error("edge from {0} to {1} declares more than one event")]
    DuplicateEventOnEdge(i32, i32),

    #[error("edge from {src} to {tgt} conflicts with an existing transition touching state {conflict}: {conflict} already has a transition with an indistinguishable guard")]
    ConflictingTransition {
        src: i32,
        tgt: i32,
        conflict: i32,
    },

    #[error("group `{0}` needs at least one child")]
    EmptyGroup(String),

    #[error("group `{name}` children do not share a common parent")]
    MismatchedGroupParents { name: String },

    #[error("output `{output}` expects a {expected} value, got a {actual} value")]
    OutputTypeMismatch {
        output: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("input `{input}` expects a {expected} value, got a {actual} value")]
    InputTypeMismatch {
        input: String,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("unknown input `{0}`")]
    UnknownInput(String),

    #[error("unknown output `{0}`")]
    UnknownOutput(String),

    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}
