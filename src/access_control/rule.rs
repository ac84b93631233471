use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::Viewer;

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    /// No opinion; the next rule in the chain decides.
    Defer,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny => write!(f, "deny"),
            Decision::Defer => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule may inspect about the object under evaluation.
pub trait RuleSubject {
    fn id(&self) -> &str;

    fn type_name(&self) -> &str;

    /// Empty when the object was created without a logged-in viewer id.
    fn creator_id(&self) -> &str;

    /// Current value of a field, including edits not yet saved.
    fn field(&self, name: &str) -> Option<&Value>;
}

/// A pure decision function over a viewer and an object.
#[derive(Clone)]
pub struct Rule(Arc<dyn Fn(&Viewer, &dyn RuleSubject) -> Decision + Send + Sync>);

impl Rule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Viewer, &dyn RuleSubject) -> Decision + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self, viewer: &Viewer, subject: &dyn RuleSubject) -> Decision {
        (self.0)(viewer, subject)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule")
    }
}

/// Ordered rule chains, one per action. An empty chain allows the action.
#[derive(Debug, Clone, Default)]
pub struct AccessRules {
    pub on_create: Vec<Rule>,
    pub on_read: Vec<Rule>,
    pub on_update: Vec<Rule>,
    pub on_delete: Vec<Rule>,
}

impl AccessRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.on_create = rules.into_iter().collect();
        self
    }

    pub fn on_read(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.on_read = rules.into_iter().collect();
        self
    }

    pub fn on_update(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.on_update = rules.into_iter().collect();
        self
    }

    pub fn on_delete(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.on_delete = rules.into_iter().collect();
        self
    }

    /// The chain that governs `action`.
    pub fn chain(&self, action: Action) -> &[Rule] {
        match action {
            Action::Create => &self.on_create,
            Action::Read => &self.on_read,
            Action::Update => &self.on_update,
            Action::Delete => &self.on_delete,
        }
    }
}
