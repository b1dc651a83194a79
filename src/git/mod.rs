//! Git subsystem — subprocess execution, output parsing, and the
//! request-scoped view records the HTTP layer serializes.
//!
//! Dependency order (leaves first): [`exec`] wraps subprocess invocation,
//! [`parse`] turns fixed-format git output into records, [`model`] holds the
//! wire types and derived predicates, and [`worktrees`]/[`branches`]/
//! [`commits`] compose them into per-request aggregations.

pub mod branches;
pub mod commits;
pub mod exec;
pub mod model;
pub mod parse;
pub mod worktrees;

pub use exec::{GitError, GitOutput, GitRunner};
