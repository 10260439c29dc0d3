use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::ingredients;

pub mod migrator;
pub mod repositories;

pub use repositories::ingredient::IngredientUpdateOutcome;
pub use repositories::recipe::{
    AttachOutcome, NewRecipeIngredient, RecipeIngredientRow, RecipeWithIngredients,
    RecipeWriteOutcome,
};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database is its own database.
        let max_connections = if db_url.contains(":memory:") {
            1
        } else {
            max_connections
        };

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn ingredient_repo(&self) -> repositories::ingredient::IngredientRepository {
        repositories::ingredient::IngredientRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    pub async fn list_ingredients(&self, search: Option<&str>) -> Result<Vec<ingredients::Model>> {
        self.ingredient_repo().list(search).await
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<ingredients::Model>> {
        self.ingredient_repo().get(id).await
    }

    pub async fn create_ingredient(
        &self,
        name: &str,
        amount: i32,
    ) -> Result<Option<ingredients::Model>> {
        self.ingredient_repo().create(name, amount).await
    }

    pub async fn update_ingredient(
        &self,
        id: i32,
        name: Option<String>,
        amount: Option<i32>,
    ) -> Result<IngredientUpdateOutcome> {
        self.ingredient_repo().update(id, name, amount).await
    }

    pub async fn remove_ingredient(&self, id: i32) -> Result<bool> {
        self.ingredient_repo().remove(id).await
    }

    pub async fn list_recipes(&self) -> Result<Vec<RecipeWithIngredients>> {
        self.recipe_repo().list().await
    }

    pub async fn get_recipe(&self, id: i32) -> Result<Option<RecipeWithIngredients>> {
        self.recipe_repo().get(id).await
    }

    pub async fn create_recipe(
        &self,
        name: &str,
        entries: &[NewRecipeIngredient],
    ) -> Result<RecipeWriteOutcome> {
        self.recipe_repo().create(name, entries).await
    }

    pub async fn update_recipe(
        &self,
        id: i32,
        name: Option<String>,
        entries: Option<&[NewRecipeIngredient]>,
    ) -> Result<RecipeWriteOutcome> {
        self.recipe_repo().update(id, name, entries).await
    }

    pub async fn remove_recipe(&self, id: i32) -> Result<bool> {
        self.recipe_repo().remove(id).await
    }

    pub async fn attach_ingredient(
        &self,
        recipe_id: i32,
        ingredient_id: i32,
        weight: i32,
    ) -> Result<AttachOutcome> {
        self.recipe_repo()
            .attach_ingredient(recipe_id, ingredient_id, weight)
            .await
    }

    pub async fn cook_recipe(&self, recipe_id: i32) -> Result<Option<u64>> {
        self.recipe_repo().cook(recipe_id).await
    }

    pub async fn recipes_without_ingredients(
        &self,
        ingredient_ids: &[i32],
        threshold: i32,
    ) -> Result<Vec<RecipeWithIngredients>> {
        self.recipe_repo()
            .without_ingredients(ingredient_ids, threshold)
            .await
    }
}
