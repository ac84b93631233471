#![allow(dead_code)]

use goat_rust::{
    async_trait, fields, rules, AccessRules, BooleanType, EdgeConfig, EdgeConfigs, Fields,
    GraphType, StringType, Validators,
};

use super::social::User;

pub struct TodoItem;

#[async_trait]
impl GraphType for TodoItem {
    const TYPE_NAME: &'static str = "TodoItem";

    fn initial_value() -> Fields {
        fields! { "title" => "", "is_completed" => false }
    }

    fn validators() -> Validators {
        Validators::new()
            .field("title", StringType::new().non_null().max_length(40))
            .field("is_completed", BooleanType::new().non_null())
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["title"]
    }

    fn access_rules() -> AccessRules {
        AccessRules::new()
            .on_create([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_read([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_update([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_delete([rules::deny_if_logged_out(), rules::allow_everytime()])
    }
}

/// Only its creator can see or change it.
pub struct PrivateTodoItem;

#[async_trait]
impl GraphType for PrivateTodoItem {
    const TYPE_NAME: &'static str = "PrivateTodoItem";

    fn initial_value() -> Fields {
        fields! { "title" => "" }
    }

    fn access_rules() -> AccessRules {
        AccessRules::new()
            .on_create([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_read([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
            .on_update([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
            .on_delete([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
    }
}

/// Anyone logged in can read it, only its creator can change it.
pub struct ReadonlyTodoItem;

#[async_trait]
impl GraphType for ReadonlyTodoItem {
    const TYPE_NAME: &'static str = "ReadonlyTodoItem";

    fn initial_value() -> Fields {
        fields! { "title" => "" }
    }

    fn access_rules() -> AccessRules {
        AccessRules::new()
            .on_create([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_read([rules::deny_if_logged_out(), rules::allow_everytime()])
            .on_update([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
            .on_delete([rules::allow_if_viewer_is_object_creator(), rules::deny_everytime()])
    }
}

pub struct TodoList;

#[async_trait]
impl GraphType for TodoList {
    const TYPE_NAME: &'static str = "TodoList";

    fn initial_value() -> Fields {
        fields! { "name" => "", "owner_id" => goat_rust::Value::Null }
    }

    fn edges() -> EdgeConfigs {
        EdgeConfigs::new()
            .edge("items", EdgeConfig::to::<TodoItem>())
            .edge("pinned", EdgeConfig::to::<TodoItem>().one_to_one())
            .edge("private_items", EdgeConfig::to::<PrivateTodoItem>())
            .edge("owner", EdgeConfig::to::<User>().stored_in("owner_id"))
            .edge("reviewer", EdgeConfig::to::<User>().stored_in("reviewer_id"))
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["owner_id"]
    }
}
