use std::collections::HashMap;

use crate::entities::{ingredients, prelude::*, recipe_ingredients, recipes};
use anyhow::Result;
use sea_orm::sea_query::{Expr, ExprTrait as _, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

/// Repository for recipes and their ingredient associations.
pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn load_ingredients<C: ConnectionTrait>(
        conn: &C,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<RecipeIngredientRow>>> {
        let rows = RecipeIngredients::find()
            .find_also_related(Ingredients)
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .order_by_asc(recipe_ingredients::Column::IngredientId)
            .all(conn)
            .await?;

        let mut by_recipe: HashMap<i32, Vec<RecipeIngredientRow>> = HashMap::new();
        for (link, ingredient) in rows {
            // The FK guarantees the ingredient side resolves.
            let Some(ingredient) = ingredient else {
                continue;
            };
            by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(RecipeIngredientRow {
                    id: ingredient.id,
                    name: ingredient.name,
                    weight: link.weight,
                });
        }
        Ok(by_recipe)
    }

    async fn assemble<C: ConnectionTrait>(
        conn: &C,
        models: Vec<recipes::Model>,
    ) -> Result<Vec<RecipeWithIngredients>> {
        let ids: Vec<i32> = models.iter().map(|r| r.id).collect();
        let mut by_recipe = Self::load_ingredients(conn, &ids).await?;

        Ok(models
            .into_iter()
            .map(|r| RecipeWithIngredients {
                id: r.id,
                name: r.name,
                ingredients: by_recipe.remove(&r.id).unwrap_or_default(),
            })
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<RecipeWithIngredients>> {
        let models = Recipes::find()
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?;
        Self::assemble(&self.conn, models).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<RecipeWithIngredients>> {
        let Some(model) = Recipes::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        Ok(Self::assemble(&self.conn, vec![model]).await?.pop())
    }

    /// Creates the recipe row and bulk-inserts every association in one
    /// transaction, so a failure leaves no partial state behind.
    pub async fn create(
        &self,
        name: &str,
        entries: &[NewRecipeIngredient],
    ) -> Result<RecipeWriteOutcome> {
        let txn = self.conn.begin().await?;

        if let Some(missing) = Self::find_unknown_ingredient(&txn, entries).await? {
            return Ok(RecipeWriteOutcome::UnknownIngredient(missing));
        }

        let insert = Recipes::insert(recipes::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        })
        .exec(&txn)
        .await;

        let recipe_id = match insert {
            Ok(res) => res.last_insert_id,
            Err(e) => match e.sql_err() {
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                    return Ok(RecipeWriteOutcome::DuplicateName);
                }
                _ => return Err(e.into()),
            },
        };

        Self::insert_associations(&txn, recipe_id, entries).await?;

        let Some(model) = Recipes::find_by_id(recipe_id).one(&txn).await? else {
            anyhow::bail!("recipe {} vanished inside its own transaction", recipe_id);
        };
        let full = Self::assemble(&txn, vec![model]).await?.pop();
        txn.commit().await?;

        info!("Created recipe '{}' with {} ingredients", name, entries.len());
        full.map_or_else(
            || anyhow::bail!("recipe {} missing after insert", recipe_id),
            |r| Ok(RecipeWriteOutcome::Done(r)),
        )
    }

    /// Partial update. A new ingredient list, when given, atomically replaces
    /// the existing associations.
    pub async fn update(
        &self,
        id: i32,
        name: Option<String>,
        entries: Option<&[NewRecipeIngredient]>,
    ) -> Result<RecipeWriteOutcome> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Recipes::find_by_id(id).one(&txn).await? else {
            return Ok(RecipeWriteOutcome::NotFound);
        };

        if let Some(new_name) = name {
            if new_name != existing.name {
                let update = Recipes::update(recipes::ActiveModel {
                    id: Set(id),
                    name: Set(new_name),
                })
                .exec(&txn)
                .await;

                if let Err(e) = update {
                    return match e.sql_err() {
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                            Ok(RecipeWriteOutcome::DuplicateName)
                        }
                        _ => Err(e.into()),
                    };
                }
            }
        }

        if let Some(entries) = entries {
            if let Some(missing) = Self::find_unknown_ingredient(&txn, entries).await? {
                return Ok(RecipeWriteOutcome::UnknownIngredient(missing));
            }

            RecipeIngredients::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(id))
                .exec(&txn)
                .await?;
            Self::insert_associations(&txn, id, entries).await?;
        }

        let Some(model) = Recipes::find_by_id(id).one(&txn).await? else {
            return Ok(RecipeWriteOutcome::NotFound);
        };
        let full = Self::assemble(&txn, vec![model]).await?.pop();
        txn.commit().await?;

        full.map_or(Ok(RecipeWriteOutcome::NotFound), |r| {
            Ok(RecipeWriteOutcome::Done(r))
        })
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Recipes::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Get-or-create on the `(recipe, ingredient)` pair, inside a single
    /// transaction so two concurrent calls cannot both take the insert path.
    ///
    /// A pre-existing association resubmitted with its current weight is
    /// reported as `Added`, matching the behavior this service replaced.
    pub async fn attach_ingredient(
        &self,
        recipe_id: i32,
        ingredient_id: i32,
        weight: i32,
    ) -> Result<AttachOutcome> {
        let txn = self.conn.begin().await?;

        if Recipes::find_by_id(recipe_id).one(&txn).await?.is_none() {
            return Ok(AttachOutcome::RecipeMissing);
        }
        if Ingredients::find_by_id(ingredient_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Ok(AttachOutcome::IngredientMissing);
        }

        let existing = RecipeIngredients::find_by_id((recipe_id, ingredient_id))
            .one(&txn)
            .await?;

        let outcome = match existing {
            None => {
                RecipeIngredients::insert(recipe_ingredients::ActiveModel {
                    recipe_id: Set(recipe_id),
                    ingredient_id: Set(ingredient_id),
                    weight: Set(weight),
                })
                .exec(&txn)
                .await?;
                AttachOutcome::Added
            }
            Some(link) if link.weight != weight => {
                RecipeIngredients::update_many()
                    .col_expr(recipe_ingredients::Column::Weight, Expr::value(weight))
                    .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                    .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
                    .exec(&txn)
                    .await?;
                AttachOutcome::WeightUpdated
            }
            Some(_) => AttachOutcome::Added,
        };

        txn.commit().await?;
        Ok(outcome)
    }

    /// Increments the usage counter of every ingredient the recipe references,
    /// as one transaction. The increment is evaluated by the store
    /// (`amount = amount + 1`), so concurrent cooks never lose updates.
    ///
    /// Returns the number of incremented ingredients, or `None` when the
    /// recipe does not exist.
    pub async fn cook(&self, recipe_id: i32) -> Result<Option<u64>> {
        let txn = self.conn.begin().await?;

        if Recipes::find_by_id(recipe_id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let ingredient_ids: Vec<i32> = RecipeIngredients::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.ingredient_id)
            .collect();

        let mut touched = 0;
        if !ingredient_ids.is_empty() {
            let result = Ingredients::update_many()
                .col_expr(
                    ingredients::Column::Amount,
                    Expr::col(ingredients::Column::Amount).add(1),
                )
                .filter(ingredients::Column::Id.is_in(ingredient_ids))
                .exec(&txn)
                .await?;
            touched = result.rows_affected;
        }

        txn.commit().await?;
        info!("Cooked recipe {}: {} ingredients consumed", recipe_id, touched);
        Ok(Some(touched))
    }

    /// Recipes that contain none of the given ingredients at or above the
    /// threshold weight, expressed as a set-exclusion subquery so the store's
    /// planner does the filtering.
    pub async fn without_ingredients(
        &self,
        ingredient_ids: &[i32],
        threshold: i32,
    ) -> Result<Vec<RecipeWithIngredients>> {
        let heavy_links = Query::select()
            .column(recipe_ingredients::Column::RecipeId)
            .from(RecipeIngredients)
            .and_where(recipe_ingredients::Column::IngredientId.is_in(ingredient_ids.to_vec()))
            .and_where(recipe_ingredients::Column::Weight.gte(threshold))
            .to_owned();

        let models = Recipes::find()
            .filter(recipes::Column::Id.not_in_subquery(heavy_links))
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?;

        Self::assemble(&self.conn, models).await
    }

    async fn find_unknown_ingredient<C: ConnectionTrait>(
        conn: &C,
        entries: &[NewRecipeIngredient],
    ) -> Result<Option<i32>> {
        let wanted: Vec<i32> = entries.iter().map(|e| e.ingredient_id).collect();
        let known: Vec<i32> = Ingredients::find()
            .filter(ingredients::Column::Id.is_in(wanted.clone()))
            .all(conn)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();

        Ok(wanted.into_iter().find(|id| !known.contains(id)))
    }

    async fn insert_associations<C: ConnectionTrait>(
        conn: &C,
        recipe_id: i32,
        entries: &[NewRecipeIngredient],
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let links: Vec<recipe_ingredients::ActiveModel> = entries
            .iter()
            .map(|e| recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(e.ingredient_id),
                weight: Set(e.weight),
            })
            .collect();

        RecipeIngredients::insert_many(links).exec(conn).await?;
        Ok(())
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecipeWithIngredients {
    pub id: i32,
    pub name: String,
    pub ingredients: Vec<RecipeIngredientRow>,
}

#[derive(Debug, Clone)]
pub struct RecipeIngredientRow {
    pub id: i32,
    pub name: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct NewRecipeIngredient {
    pub ingredient_id: i32,
    pub weight: i32,
}

#[derive(Debug)]
pub enum RecipeWriteOutcome {
    Done(RecipeWithIngredients),
    NotFound,
    DuplicateName,
    UnknownIngredient(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Added,
    WeightUpdated,
    RecipeMissing,
    IngredientMissing,
}
