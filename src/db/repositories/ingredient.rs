use crate::entities::{ingredients, prelude::*};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Repository for ingredient rows.
pub struct IngredientRepository {
    conn: DatabaseConnection,
}

impl IngredientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<ingredients::Model>> {
        let mut query = Ingredients::find().order_by_asc(ingredients::Column::Name);

        if let Some(needle) = search {
            query = query.filter(ingredients::Column::Name.contains(needle));
        }

        Ok(query.all(&self.conn).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<ingredients::Model>> {
        Ok(Ingredients::find_by_id(id).one(&self.conn).await?)
    }

    /// Inserts a new ingredient. Returns `None` when the name is already taken.
    pub async fn create(&self, name: &str, amount: i32) -> Result<Option<ingredients::Model>> {
        let active_model = ingredients::ActiveModel {
            name: Set(name.to_string()),
            amount: Set(amount),
            ..Default::default()
        };

        match Ingredients::insert(active_model).exec(&self.conn).await {
            Ok(res) => Ok(Ingredients::find_by_id(res.last_insert_id)
                .one(&self.conn)
                .await?),
            Err(e) => match e.sql_err() {
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => Ok(None),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn update(
        &self,
        id: i32,
        name: Option<String>,
        amount: Option<i32>,
    ) -> Result<IngredientUpdateOutcome> {
        let Some(existing) = Ingredients::find_by_id(id).one(&self.conn).await? else {
            return Ok(IngredientUpdateOutcome::NotFound);
        };

        let mut active_model: ingredients::ActiveModel = existing.into();
        if let Some(name) = name {
            active_model.name = Set(name);
        }
        if let Some(amount) = amount {
            active_model.amount = Set(amount);
        }

        match active_model.update(&self.conn).await {
            Ok(updated) => Ok(IngredientUpdateOutcome::Done(updated)),
            Err(e) => match e.sql_err() {
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                    Ok(IngredientUpdateOutcome::DuplicateName)
                }
                _ => Err(e.into()),
            },
        }
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Ingredients::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

#[derive(Debug)]
pub enum IngredientUpdateOutcome {
    Done(ingredients::Model),
    NotFound,
    DuplicateName,
}
