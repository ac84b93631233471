//! Stock rules.
//!
//! ```ignore
//! AccessRules::new()
//!     .on_read([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
//!     .on_update([rules::deny_if_logged_out(), rules::allow_everytime()]);
//! ```

use super::{Decision, Rule, RuleSubject, Viewer};

pub fn allow_everytime() -> Rule {
    Rule::new(|_, _| Decision::Allow)
}

pub fn deny_everytime() -> Rule {
    Rule::new(|_, _| Decision::Deny)
}

pub fn deny_if_logged_out() -> Rule {
    deny_if(|viewer, _| !viewer.is_logged_in())
}

pub fn allow_if_system_viewer() -> Rule {
    allow_if(|viewer, _| viewer.is_system())
}

/// Allows when the viewer's id equals the object's stored creator id.
pub fn allow_if_viewer_is_object_creator() -> Rule {
    allow_if(|viewer, object| viewer.id() == Some(object.creator_id()))
}

/// `Allow` when the predicate holds, otherwise `Defer`.
pub fn allow_if<F>(predicate: F) -> Rule
where
    F: Fn(&Viewer, &dyn RuleSubject) -> bool + Send + Sync + 'static,
{
    Rule::new(move |viewer, object| {
        if predicate(viewer, object) {
            Decision::Allow
        } else {
            Decision::Defer
        }
    })
}

/// `Deny` when the predicate holds, otherwise `Defer`.
pub fn deny_if<F>(predicate: F) -> Rule
where
    F: Fn(&Viewer, &dyn RuleSubject) -> bool + Send + Sync + 'static,
{
    Rule::new(move |viewer, object| {
        if predicate(viewer, object) {
            Decision::Deny
        } else {
            Decision::Defer
        }
    })
}
