use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ShippingAddress;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingAddressRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShippingAddressList {
    #[schema(value_type = Vec<ShippingAddress>)]
    pub items: Vec<ShippingAddress>,
}
