use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderLine};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SellerApplicationRequest {
    pub business_name: String,
    pub inn_identification_number: Option<String>,
    pub website_url: Option<String>,
    pub phone_number: Option<String>,
    pub business_description: Option<String>,
    pub business_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SellerOrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerOrderItems {
    pub order_id: Uuid,
    pub tx_ref: String,
    pub items: Vec<OrderLine>,
}
