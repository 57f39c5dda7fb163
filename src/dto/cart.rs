use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::OrderLine;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleCartItemRequest {
    pub slug: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToggleResult {
    Created,
    Updated,
    Removed,
}

impl ToggleResult {
    pub fn message(&self) -> &'static str {
        match self {
            ToggleResult::Created => "Item Added To Cart",
            ToggleResult::Updated => "Item Updated In Cart",
            ToggleResult::Removed => "Item Removed From Cart",
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleCartItemResponse {
    pub result: ToggleResult,
    pub item: Option<OrderLine>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<OrderLine>)]
    pub items: Vec<OrderLine>,
}
