//! Access control - viewers, rules and rule-chain evaluation.
//!
//! Each entity type declares up to four ordered rule chains (create, read,
//! update, delete). A rule looks at the [`Viewer`] and the object and returns a
//! [`Decision`]:
//!
//! ```text
//!  rule 0 ──Defer──► rule 1 ──Defer──► ... ──Defer──► Allow (default)
//!    │                 │
//!  Allow/Deny        Allow/Deny
//!    ▼                 ▼
//!  decided           decided
//! ```
//!
//! Create, update and delete denials surface as [`GraphError::Permission`].
//! Read denials drop the row from query results instead.
//!
//! [`GraphError::Permission`]: crate::GraphError::Permission

mod evaluator;
mod rule;
pub mod rules;
mod viewer;

pub use evaluator::PermissionEvaluator;
pub use rule::{AccessRules, Action, Decision, Rule, RuleSubject};
pub use viewer::{Viewer, ViewerBuilder, SYSTEM_USER_ROLE};
