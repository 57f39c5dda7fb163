use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Buyer,
    Seller,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Buyer => "BUYER",
            AccountType::Seller => "SELLER",
        }
    }

    pub fn is_seller(&self) -> bool {
        matches!(self, AccountType::Seller)
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUYER" => Ok(AccountType::Buyer),
            "SELLER" => Ok(AccountType::Seller),
            other => Err(format!("unknown account type {other}")),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Pending,
    Packing,
    Shipping,
    Arriving,
    Success,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Packing => "PACKING",
            DeliveryStatus::Shipping => "SHIPPING",
            DeliveryStatus::Arriving => "ARRIVING",
            DeliveryStatus::Success => "SUCCESS",
        }
    }

    /// Case-insensitive lookup by column value.
    pub fn parse(value: &str) -> Option<Self> {
        [
            DeliveryStatus::Pending,
            DeliveryStatus::Packing,
            DeliveryStatus::Shipping,
            DeliveryStatus::Arriving,
            DeliveryStatus::Success,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Successful,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Successful => "SUCCESSFUL",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: AccountType,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Seller {
    pub id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub inn_identification_number: Option<String>,
    pub website_url: Option<String>,
    pub phone_number: Option<String>,
    pub business_description: Option<String>,
    pub business_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// The public face of a seller embedded in product payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SellerShop {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller: SellerShop,
    pub category: Category,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_old: Option<Decimal>,
    pub price_current: Decimal,
    pub in_stock: i32,
    pub image1: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

/// Product summary carried by a cart or order line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineProduct {
    pub seller: String,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub product: LineProduct,
    pub quantity: i32,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub tx_ref: String,
    pub email: String,
    pub delivery_status: String,
    pub payment_status: String,
    pub date_delivered: Option<DateTime<Utc>>,
    pub shipping_details: ShippingDetails,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewAuthor {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub review_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub user: ReviewAuthor,
    pub rating: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
