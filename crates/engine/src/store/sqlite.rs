//! sqlite-backed [`KvStore`] over the `storage` table created by the
//! `migration` crate. The device store this replaces is itself a sqlite
//! key/value table, so the layout carries over unchanged.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*, sea_query::OnConflict};

use crate::ResultEngine;

use super::KvStore;

mod storage {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "storage")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub key: String,
        pub value: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    database: DatabaseConnection,
}

impl SqliteStore {
    /// Wrap an open connection. The caller runs migrations beforehand.
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        let model = storage::Entity::find_by_id(key).one(&self.database).await?;
        Ok(model.map(|m| m.value))
    }

    async fn set(&self, key: &str, value: &str) -> ResultEngine<()> {
        let model = storage::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
        };
        storage::Entity::insert(model)
            .on_conflict(
                OnConflict::column(storage::Column::Key)
                    .update_column(storage::Column::Value)
                    .to_owned(),
            )
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        storage::Entity::delete_by_id(key)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn keys(&self) -> ResultEngine<Vec<String>> {
        let models = storage::Entity::find().all(&self.database).await?;
        Ok(models.into_iter().map(|m| m.key).collect())
    }

    async fn multi_get(&self, keys: &[String]) -> ResultEngine<Vec<(String, Option<String>)>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let models = storage::Entity::find()
            .filter(storage::Column::Key.is_in(keys.iter().cloned()))
            .all(&self.database)
            .await?;
        let mut found: HashMap<String, String> =
            models.into_iter().map(|m| (m.key, m.value)).collect();
        Ok(keys
            .iter()
            .map(|key| (key.clone(), found.remove(key)))
            .collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> ResultEngine<()> {
        if keys.is_empty() {
            return Ok(());
        }
        storage::Entity::delete_many()
            .filter(storage::Column::Key.is_in(keys.iter().cloned()))
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
