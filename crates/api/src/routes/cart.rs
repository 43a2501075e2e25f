//! Shopping cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::CartStore;
use chrono::{DateTime, Utc};
use domain::{
    AddItemToCart, ApplyVoucherToCart, CartItem, CartService, DiscountType, Money, RemoveCartItem,
    ShoppingCart, UpdateCartItem, Voucher,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::CustomerIdentity;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CartStore> {
    pub cart_service: CartService<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct ApplyVoucherRequest {
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub percentage: u32,
    #[serde(default)]
    pub value_cents: i64,
    pub expiration_date: DateTime<Utc>,
    pub active: bool,
    #[serde(default)]
    pub first_time_use_only: bool,
    /// Whether this customer has already consumed their first-use
    /// allowance, as resolved by the upstream voucher service.
    #[serde(default)]
    pub first_use_consumed: bool,
}

impl ApplyVoucherRequest {
    fn into_voucher(self) -> (Voucher, bool) {
        let voucher = Voucher {
            code: self.code,
            discount_type: self.discount_type,
            percentage: self.percentage,
            value: Money::from_cents(self.value_cents),
            expiration_date: self.expiration_date,
            active: self.active,
            first_time_use_only: self.first_time_use_only,
        };
        (voucher, self.first_use_consumed)
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub customer_id: String,
    pub items: Vec<ItemResponse>,
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub voucher_code: Option<String>,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub total_cents: i64,
}

impl From<&CartItem> for ItemResponse {
    fn from(item: &CartItem) -> Self {
        ItemResponse {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            unit_price_cents: item.unit_price.cents(),
            quantity: item.quantity,
            total_cents: item.total_price().cents(),
        }
    }
}

impl From<&ShoppingCart> for CartResponse {
    fn from(cart: &ShoppingCart) -> Self {
        CartResponse {
            cart_id: cart.id().to_string(),
            customer_id: cart.customer_id().to_string(),
            items: cart.items().iter().map(ItemResponse::from).collect(),
            amount_cents: cart.amount().cents(),
            discount_cents: cart.discount().cents(),
            voucher_code: cart.voucher().map(|v| v.code.clone()),
        }
    }
}

// -- Handlers --

/// GET /cart — the customer's current cart, empty if none exists yet.
#[tracing::instrument(skip(state))]
pub async fn get_cart<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CustomerIdentity(customer_id): CustomerIdentity,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart_service.get_cart(customer_id).await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// POST /cart/items — add an item, creating the cart on first use.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CustomerIdentity(customer_id): CustomerIdentity,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = CartItem::new(
        req.product_id.as_str(),
        req.name.as_str(),
        req.image.as_str(),
        Money::from_cents(req.unit_price_cents),
        req.quantity,
    );
    let product_id = item.product_id.clone();

    let cart = state
        .cart_service
        .add_item(AddItemToCart::new(customer_id, item))
        .await?;

    // The merged item carries the combined quantity, so echo from the cart.
    let item = cart
        .item(&product_id)
        .ok_or_else(|| ApiError::Internal("Added item missing from cart".to_string()))?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// PUT /cart/items/:product_id — replace an item's quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CustomerIdentity(customer_id): CustomerIdentity,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .cart_service
        .update_item(UpdateCartItem::new(
            customer_id,
            product_id,
            req.product_id,
            req.quantity,
        ))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart/items/:product_id — remove an item from the cart.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CustomerIdentity(customer_id): CustomerIdentity,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .cart_service
        .remove_item(RemoveCartItem::new(customer_id, product_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/voucher — apply a discount voucher to the cart.
#[tracing::instrument(skip(state, req), fields(voucher = %req.code))]
pub async fn apply_voucher<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CustomerIdentity(customer_id): CustomerIdentity,
    Json(req): Json<ApplyVoucherRequest>,
) -> Result<StatusCode, ApiError> {
    let (voucher, first_use_consumed) = req.into_voucher();

    state
        .cart_service
        .apply_voucher(
            ApplyVoucherToCart::new(customer_id, voucher)
                .with_first_use_consumed(first_use_consumed),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
