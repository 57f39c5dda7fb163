use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 20
    pub page_size: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    /// Returns `(page, page_size, offset)`.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(page_size);
        (page, page_size, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Review ordering values accepted by the review listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Ordering {
    Increase,
    Decrease,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Filter products by MAX current price
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Filter products by MIN current price
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Filter products with at least this many in stock
    pub in_stock: Option<i32>,
    /// Filter products created at or after this instant
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Filter reviews by MIN rating
    pub min_rating: Option<i32>,
    /// Filter reviews by MAX rating
    pub max_rating: Option<i32>,
    /// Reviews created on or after this date
    pub date_after: Option<NaiveDate>,
    /// Order by rating (increase, decrease)
    pub ordering_rating: Option<Ordering>,
    /// Order by creation date (increase, decrease)
    pub ordering_created: Option<Ordering>,
}

impl ReviewQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub delivery_status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(Pagination::new(Some(3), Some(10)).normalize(), (3, 10, 20));
        assert_eq!(Pagination::new(Some(0), Some(500)).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(Some(-4), Some(0)).normalize(), (1, 1, 0));
        assert_eq!(
            Pagination::new(Some(i64::MAX), Some(100)).normalize(),
            (i64::MAX, 100, i64::MAX)
        );
    }

    #[test]
    fn review_query_parses_orderings() {
        let query: ReviewQuery =
            serde_json::from_str(r#"{"ordering_rating":"decrease","min_rating":2}"#).unwrap();
        assert_eq!(query.ordering_rating, Some(Ordering::Decrease));
        assert_eq!(query.min_rating, Some(2));
        assert!(query.ordering_created.is_none());
    }
}
