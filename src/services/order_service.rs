use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, is_owner_or_admin},
    models::NewOrderLine,
    repository::OrderRepository,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
    validate::validate_create_order,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, _) = query.pagination.normalize();
    let (items, total) = state.orders.find_page(&state.orm, None, &query).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Pedidos", OrderList { items }, Some(meta)))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, _) = query.pagination.normalize();
    let (items, total) = state
        .orders
        .find_page(&state.orm, Some(user.user_id), &query)
        .await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Pedidos", OrderList { items }, Some(meta)))
}

/// Fetch one order with its lines. A requester who is neither the owner nor
/// an admin gets NotFound, the same answer as for an id that does not exist.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let (order, items) = state
        .orders
        .find_with_lines(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !is_owner_or_admin(user, order.user_id) {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Pedido",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let errors = validate_create_order(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let lines: Vec<NewOrderLine> = payload.items.iter().map(NewOrderLine::from).collect();

    // The transaction spans every availability check, the header, the lines
    // and any immediate completion; an error on any line drops it unharmed.
    let txn = state.orm.begin().await?;
    let (order, items) = state
        .engine
        .create_order(&txn, user.user_id, &lines, payload.status)
        .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Pedido criado",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let (order, items) = state
        .engine
        .update_order_status(&txn, id, payload.status)
        .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Status do pedido atualizado",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}
