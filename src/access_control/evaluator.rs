use tracing::{debug, warn};

use super::{AccessRules, Action, Decision, RuleSubject, Viewer};
use crate::error::{GraphError, Result};

/// Evaluates one action's rule chain for a viewer.
///
/// The first rule that does not defer decides. A chain that is empty, or in
/// which every rule defers, allows the action.
pub struct PermissionEvaluator<'a> {
    rules: &'a AccessRules,
    action: Action,
    viewer: Viewer,
}

impl<'a> PermissionEvaluator<'a> {
    /// A missing viewer is evaluated as [`Viewer::anonymous`].
    pub fn new(rules: &'a AccessRules, action: Action, viewer: Option<&Viewer>) -> Self {
        Self {
            rules,
            action,
            viewer: viewer.cloned().unwrap_or_else(Viewer::anonymous),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn can_perform_action(&self, subject: &dyn RuleSubject) -> bool {
        for (index, rule) in self.rules.chain(self.action).iter().enumerate() {
            let decision = rule.evaluate(&self.viewer, subject);
            debug!(
                action = %self.action,
                id = subject.id(),
                rule = index,
                %decision,
                "permission evaluation"
            );
            match decision {
                Decision::Allow => return true,
                Decision::Deny => return false,
                Decision::Defer => {}
            }
        }
        true
    }

    /// Fails with [`GraphError::Permission`] when the chain denies.
    pub fn enforce_can_perform_action(&self, subject: &dyn RuleSubject) -> Result<()> {
        if self.can_perform_action(subject) {
            return Ok(());
        }
        warn!(
            action = %self.action,
            type_name = subject.type_name(),
            id = subject.id(),
            viewer_id = self.viewer.id(),
            "permission denied"
        );
        Err(GraphError::Permission {
            viewer_id: self.viewer.id().map(str::to_string),
            action: self.action.to_string(),
            type_name: subject.type_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::{rules, Rule};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Note;

    impl RuleSubject for Note {
        fn id(&self) -> &str {
            "note-1"
        }

        fn type_name(&self) -> &str {
            "Note"
        }

        fn creator_id(&self) -> &str {
            "11111"
        }

        fn field(&self, _name: &str) -> Option<&Value> {
            None
        }
    }

    fn defer() -> Rule {
        Rule::new(|_, _| Decision::Defer)
    }

    #[test]
    fn empty_chain_allows() {
        let rules = AccessRules::new();
        let evaluator = PermissionEvaluator::new(&rules, Action::Delete, None);
        assert!(evaluator.can_perform_action(&Note));
    }

    #[test]
    fn all_deferring_chain_allows() {
        let rules = AccessRules::new().on_update([defer(), defer(), defer()]);
        let evaluator = PermissionEvaluator::new(&rules, Action::Update, None);
        assert!(evaluator.can_perform_action(&Note));
    }

    #[test]
    fn first_decision_wins() {
        let rules = AccessRules::new()
            .on_read([defer(), rules::deny_everytime(), rules::allow_everytime()])
            .on_create([rules::allow_everytime(), rules::deny_everytime()]);

        assert!(!PermissionEvaluator::new(&rules, Action::Read, None).can_perform_action(&Note));
        assert!(PermissionEvaluator::new(&rules, Action::Create, None).can_perform_action(&Note));
    }

    #[test]
    fn evaluation_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let counting = Rule::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Decision::Deny
        });
        let rules = AccessRules::new().on_read([rules::allow_everytime(), counting]);

        assert!(PermissionEvaluator::new(&rules, Action::Read, None).can_perform_action(&Note));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_viewer_is_anonymous() {
        let rules = AccessRules::new().on_create([rules::deny_if_logged_out()]);
        let evaluator = PermissionEvaluator::new(&rules, Action::Create, None);
        assert!(!evaluator.viewer().is_logged_in());
        assert!(!evaluator.can_perform_action(&Note));
    }

    #[test]
    fn enforce_reports_viewer_action_and_type() {
        let rules = AccessRules::new().on_delete([
            rules::allow_if_viewer_is_object_creator(),
            rules::deny_everytime(),
        ]);
        let stranger = Viewer::logged_in("22222", ["user"]);
        let owner = Viewer::logged_in("11111", ["user"]);

        let err = PermissionEvaluator::new(&rules, Action::Delete, Some(&stranger))
            .enforce_can_perform_action(&Note)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "insufficient permission: viewer with ID 22222 cannot perform action delete on type Note"
        );

        PermissionEvaluator::new(&rules, Action::Delete, Some(&owner))
            .enforce_can_perform_action(&Note)
            .unwrap();
    }
}
