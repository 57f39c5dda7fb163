use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{CartList, ToggleCartItemRequest, ToggleCartItemResponse, ToggleResult},
        catalog::{CategoryList, CreateCategoryRequest},
        orders::{CheckoutRequest, OrderList, OrderWithItems},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{ReviewList, ReviewRequest},
        sellers::{SellerApplicationRequest, SellerOrderItems, SellerOrderList},
        shipping::{ShippingAddressList, ShippingAddressRequest},
    },
    models::{
        AccountType, Category, DeliveryStatus, LineProduct, Order, OrderLine, PaymentStatus,
        Product, Review, ReviewAuthor, Seller, SellerShop, ShippingAddress, ShippingDetails, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products, reviews, sellers, shipping},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_categories,
        products::create_category,
        products::list_category_products,
        products::list_products,
        products::get_product,
        products::list_seller_shop,
        reviews::list_reviews,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        cart::cart_list,
        cart::toggle_cart_item,
        cart::checkout,
        orders::list_orders,
        orders::get_order,
        shipping::list_shipping,
        shipping::create_shipping,
        shipping::get_shipping,
        shipping::update_shipping,
        shipping::delete_shipping,
        sellers::apply,
        sellers::list_products,
        sellers::create_product,
        sellers::update_product,
        sellers::delete_product,
        sellers::list_orders,
        sellers::list_order_items,
        admin::list_all_orders,
        admin::approve_seller
    ),
    components(
        schemas(
            AccountType,
            DeliveryStatus,
            PaymentStatus,
            User,
            Seller,
            SellerShop,
            Category,
            Product,
            ShippingAddress,
            ShippingDetails,
            LineProduct,
            OrderLine,
            Order,
            ReviewAuthor,
            Review,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ToggleCartItemRequest,
            ToggleCartItemResponse,
            ToggleResult,
            CartList,
            CheckoutRequest,
            OrderList,
            OrderWithItems,
            CreateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ReviewRequest,
            ReviewList,
            SellerApplicationRequest,
            SellerOrderList,
            SellerOrderItems,
            ShippingAddressRequest,
            ShippingAddressList,
            params::Pagination,
            params::Ordering,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<ReviewList>,
            ApiResponse<CartList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Shop", description = "Public catalog"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Cart", description = "Cart and checkout"),
        (name = "Orders", description = "Buyer orders"),
        (name = "Shipping", description = "Shipping addresses"),
        (name = "Sellers", description = "Seller profile, products and orders"),
        (name = "Admin", description = "Staff endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
