use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CreateRecipeRequest, RecipeDto, RecipeIngredientEntry,
    StatusDto, UpdateRecipeRequest,
};
use crate::api::validation::{validate_id, validate_name, validate_weight};
use crate::constants::weight;
use crate::db::{AttachOutcome, NewRecipeIngredient, RecipeWriteOutcome};

pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RecipeDto>>>, ApiError> {
    let recipes = state.store().list_recipes().await?;

    Ok(Json(ApiResponse::success(
        recipes.into_iter().map(RecipeDto::from).collect(),
    )))
}

pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeDto>>), ApiError> {
    let name = validate_name(&request.name)?;
    let entries = validate_entries(&request.ingredients)?;

    let outcome = state.store().create_recipe(name, &entries).await?;
    let recipe = unwrap_write_outcome(outcome, name)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(recipe.into())),
    ))
}

pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    let recipe = state
        .store()
        .get_recipe(id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(id))?;

    Ok(Json(ApiResponse::success(recipe.into())))
}

pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    let name = match &request.name {
        Some(n) => Some(validate_name(n)?.to_string()),
        None => None,
    };
    let entries = match &request.ingredients {
        Some(items) => Some(validate_entries(items)?),
        None => None,
    };

    let outcome = state
        .store()
        .update_recipe(id, name.clone(), entries.as_deref())
        .await?;
    let recipe = unwrap_write_outcome(outcome, name.as_deref().unwrap_or_default())?;

    Ok(Json(ApiResponse::success(recipe.into())))
}

pub async fn remove_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store().remove_recipe(id).await? {
        return Err(ApiError::recipe_not_found(id));
    }

    Ok(Json(ApiResponse::success(())))
}

#[derive(Deserialize)]
pub struct AddProductQuery {
    pub recipe_id: i32,
    pub product_id: i32,
    pub weight: Option<i32>,
}

pub async fn add_product_to_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddProductQuery>,
) -> Result<(StatusCode, Json<ApiResponse<StatusDto>>), ApiError> {
    let recipe_id = validate_id("recipe_id", query.recipe_id)?;
    let product_id = validate_id("product_id", query.product_id)?;
    let weight = query
        .weight
        .ok_or_else(|| ApiError::validation("Weight field is required"))?;
    let weight = validate_weight(weight)?;

    let outcome = state
        .store()
        .attach_ingredient(recipe_id, product_id, weight)
        .await?;

    match outcome {
        AttachOutcome::Added => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(StatusDto::new("Продукт добавлен"))),
        )),
        AttachOutcome::WeightUpdated => Ok((
            StatusCode::OK,
            Json(ApiResponse::success(StatusDto::new(
                "Вес продукта обновлен",
            ))),
        )),
        AttachOutcome::RecipeMissing => Err(ApiError::recipe_not_found(recipe_id)),
        AttachOutcome::IngredientMissing => Err(ApiError::ingredient_not_found(product_id)),
    }
}

#[derive(Deserialize)]
pub struct CookQuery {
    pub recipe_id: i32,
}

pub async fn cook_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CookQuery>,
) -> Result<Json<ApiResponse<StatusDto>>, ApiError> {
    let recipe_id = validate_id("recipe_id", query.recipe_id)?;

    state
        .store()
        .cook_recipe(recipe_id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(recipe_id))?;

    Ok(Json(ApiResponse::success(StatusDto::new("success"))))
}

pub async fn show_recipes_without_product(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Vec<RecipeDto>>>, ApiError> {
    // product_id may repeat; any ingredient at >= 10г excludes the recipe.
    let mut product_ids = Vec::new();
    for (key, value) in params {
        if key == "product_id" {
            let id: i32 = value
                .parse()
                .map_err(|_| ApiError::validation(format!("Invalid product_id: {}", value)))?;
            product_ids.push(validate_id("product_id", id)?);
        }
    }

    if product_ids.is_empty() {
        return Err(ApiError::validation(
            "At least one product_id is required",
        ));
    }

    let recipes = state
        .store()
        .recipes_without_ingredients(&product_ids, weight::EXCLUSION_THRESHOLD_GRAMS)
        .await?;

    Ok(Json(ApiResponse::success(
        recipes.into_iter().map(RecipeDto::from).collect(),
    )))
}

fn validate_entries(entries: &[RecipeIngredientEntry]) -> Result<Vec<NewRecipeIngredient>, ApiError> {
    if entries.is_empty() {
        return Err(ApiError::validation("Ingredients field is required"));
    }

    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id) {
            return Err(ApiError::validation(format!(
                "Ingredient {} is listed more than once",
                entry.id
            )));
        }
    }

    entries
        .iter()
        .map(|entry| {
            let weight = entry
                .weight
                .ok_or_else(|| ApiError::validation("Weight field is required"))?;
            Ok(NewRecipeIngredient {
                ingredient_id: validate_id("ingredient id", entry.id)?,
                weight: validate_weight(weight)?,
            })
        })
        .collect()
}

fn unwrap_write_outcome(
    outcome: RecipeWriteOutcome,
    name: &str,
) -> Result<crate::db::RecipeWithIngredients, ApiError> {
    match outcome {
        RecipeWriteOutcome::Done(recipe) => Ok(recipe),
        RecipeWriteOutcome::NotFound => Err(ApiError::NotFound("Recipe not found".to_string())),
        RecipeWriteOutcome::DuplicateName => Err(ApiError::conflict(format!(
            "Recipe '{}' already exists",
            name
        ))),
        RecipeWriteOutcome::UnknownIngredient(id) => Err(ApiError::ingredient_not_found(id)),
    }
}
