#![allow(dead_code)]

use std::sync::Mutex;

use goat_rust::{async_trait, fields, Entity, Fields, GraphError, GraphType, Result, Value};

static CALLS: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

fn record(id: &str, event: impl Into<String>) {
    CALLS.lock().unwrap().push((id.to_string(), event.into()));
}

/// Hook calls recorded for one object, oldest first.
pub fn calls_for(id: &str) -> Vec<String> {
    CALLS
        .lock()
        .unwrap()
        .iter()
        .filter(|(owner, _)| owner == id)
        .map(|(_, event)| event.clone())
        .collect()
}

/// Records every hook and derives `slug` and `revision` inside the before-hooks.
pub struct Note;

#[async_trait]
impl GraphType for Note {
    const TYPE_NAME: &'static str = "Note";

    fn initial_value() -> Fields {
        fields! { "title" => "", "slug" => "", "revision" => 0 }
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["slug"]
    }

    async fn on_before_create(entity: &mut Entity<Self>, changeset: &Fields) -> Result<()> {
        let mut changed: Vec<&String> = changeset.keys().collect();
        changed.sort();
        record(entity.id(), format!("before_create:{}", join(&changed)));

        let slug = entity
            .get_unsaved("title")?
            .as_str()
            .unwrap_or_default()
            .to_lowercase()
            .replace(' ', "-");
        entity.set("slug", slug)?;
        Ok(())
    }

    async fn on_after_create(entity: &mut Entity<Self>) -> Result<()> {
        record(entity.id(), "after_create");
        Ok(())
    }

    async fn on_before_update(entity: &mut Entity<Self>, changeset: &Fields) -> Result<()> {
        let title = changeset.get("title").cloned().unwrap_or(Value::Null);
        record(entity.id(), format!("before_update:{title}"));

        let revision = entity.get("revision")?.as_i64().unwrap_or_default();
        entity.set("revision", revision + 1)?;
        Ok(())
    }

    async fn on_after_update(entity: &mut Entity<Self>) -> Result<()> {
        record(entity.id(), "after_update");
        Ok(())
    }

    async fn on_before_delete(entity: &mut Entity<Self>) -> Result<()> {
        record(entity.id(), "before_delete");
        Ok(())
    }
}

/// Before-hooks that refuse some writes, and an after-hook that always fails.
pub struct GuardedNote;

#[async_trait]
impl GraphType for GuardedNote {
    const TYPE_NAME: &'static str = "GuardedNote";

    fn initial_value() -> Fields {
        fields! { "title" => "", "locked" => false }
    }

    async fn on_before_create(_entity: &mut Entity<Self>, changeset: &Fields) -> Result<()> {
        if changeset.get("title") == Some(&Value::from("forbidden")) {
            return Err(GraphError::Hook("forbidden title".into()));
        }
        Ok(())
    }

    async fn on_after_update(_entity: &mut Entity<Self>) -> Result<()> {
        Err(GraphError::Hook("after update failed".into()))
    }

    async fn on_before_delete(entity: &mut Entity<Self>) -> Result<()> {
        if entity.get("locked")? == &Value::Bool(true) {
            return Err(GraphError::Hook("note is locked".into()));
        }
        Ok(())
    }
}

fn join(fields: &[&String]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
