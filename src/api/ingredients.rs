use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreateIngredientRequest, IngredientDto,
    UpdateIngredientRequest};
use crate::api::validation::{validate_name, validate_number};
use crate::constants::NUMBER_BOUNDS;
use crate::db::IngredientUpdateOutcome;

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<IngredientDto>>>, ApiError> {
    let ingredients = state.store().list_ingredients(query.search.as_deref()).await?;

    Ok(Json(ApiResponse::success(
        ingredients.into_iter().map(IngredientDto::from).collect(),
    )))
}

pub async fn create_ingredient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IngredientDto>>), ApiError> {
    let name = validate_name(&request.name)?;
    if request.amount != 0 {
        validate_number(&NUMBER_BOUNDS, "amount", request.amount)?;
    }

    let Some(created) = state.store().create_ingredient(name, request.amount).await? else {
        return Err(ApiError::conflict(format!(
            "Ingredient '{}' already exists",
            name
        )));
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IngredientDto>>, ApiError> {
    let ingredient = state
        .store()
        .get_ingredient(id)
        .await?
        .ok_or_else(|| ApiError::ingredient_not_found(id))?;

    Ok(Json(ApiResponse::success(ingredient.into())))
}

pub async fn update_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateIngredientRequest>,
) -> Result<Json<ApiResponse<IngredientDto>>, ApiError> {
    let name = match &request.name {
        Some(n) => Some(validate_name(n)?.to_string()),
        None => None,
    };
    if let Some(amount) = request.amount {
        if amount != 0 {
            validate_number(&NUMBER_BOUNDS, "amount", amount)?;
        }
    }

    let outcome = state
        .store()
        .update_ingredient(id, name.clone(), request.amount)
        .await?;

    match outcome {
        IngredientUpdateOutcome::Done(updated) => Ok(Json(ApiResponse::success(updated.into()))),
        IngredientUpdateOutcome::NotFound => Err(ApiError::ingredient_not_found(id)),
        IngredientUpdateOutcome::DuplicateName => Err(ApiError::conflict(format!(
            "Ingredient '{}' already exists",
            name.unwrap_or_default()
        ))),
    }
}

pub async fn remove_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store().remove_ingredient(id).await? {
        return Err(ApiError::ingredient_not_found(id));
    }

    Ok(Json(ApiResponse::success(())))
}
