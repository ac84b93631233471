#![allow(dead_code)]

use goat_rust::{
    async_trait, fields, EdgeConfig, EdgeConfigs, Fields, GraphType, IntegerType, StringType,
    Validators,
};

use super::todo::TodoItem;

pub struct User;

#[async_trait]
impl GraphType for User {
    const TYPE_NAME: &'static str = "User";

    fn initial_value() -> Fields {
        fields! { "name" => "", "age" => 0 }
    }

    fn validators() -> Validators {
        Validators::new()
            .field("name", StringType::new().max_length(8).auto_truncate())
            .field("age", IntegerType::new().min(0).max(150))
    }

    fn edges() -> EdgeConfigs {
        EdgeConfigs::new()
            .edge("friends", EdgeConfig::to::<User>().undirected())
            .edge("best_friend", EdgeConfig::to::<User>().undirected().one_to_one())
            .edge("favourites", EdgeConfig::to::<TodoItem>())
            .edge("shared_items", EdgeConfig::to::<TodoItem>().undirected())
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["name", "age"]
    }
}
