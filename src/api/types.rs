use serde::{Deserialize, Serialize};

use crate::constants::weight;
use crate::db::RecipeWithIngredients;
use crate::entities::ingredients;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientDto {
    pub id: i32,
    pub name: String,
    pub amount: i32,
}

impl From<ingredients::Model> for IngredientDto {
    fn from(model: ingredients::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            amount: model.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDto {
    pub id: i32,
    pub name: String,
    pub ingredients: Vec<RecipeIngredientDto>,
}

/// One ingredient inside a recipe's read shape. The weight carries the gram
/// suffix, e.g. "150г".
#[derive(Debug, Serialize)]
pub struct RecipeIngredientDto {
    pub id: i32,
    pub name: String,
    pub weight: String,
}

impl From<RecipeWithIngredients> for RecipeDto {
    fn from(recipe: RecipeWithIngredients) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|i| RecipeIngredientDto {
                    id: i.id,
                    name: i.name,
                    weight: format!("{}{}", i.weight, weight::UNIT_LABEL),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub status: String,
}

impl StatusDto {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    #[serde(default)]
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub amount: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub ingredients: Vec<RecipeIngredientEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredientEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeIngredientEntry {
    pub id: i32,
    pub weight: Option<i32>,
}
