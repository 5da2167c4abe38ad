use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    repository::{OrderLineRepository, ProductRepository},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
    validate::{validate_create_product, validate_update_product},
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, _) = query.pagination.normalize();
    let (items, total) = state.products.find_page(&state.orm, &query).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Produtos", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = state
        .products
        .find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Produto", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let errors = validate_create_product(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let product = state.products.insert(&state.orm, payload.into()).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Produto criado",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let errors = validate_update_product(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let product = state
        .products
        .update(&state.orm, id, &payload.into())
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Produto atualizado",
        product,
        Some(Meta::empty()),
    ))
}

/// Delete a product unless an order line still references it. The check and
/// the delete share one transaction so a concurrent order cannot slip a new
/// reference in between.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let references = state.order_lines.count_by_product(&txn, id).await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Produto não pode ser removido: existem pedidos que o referenciam".into(),
        ));
    }

    let deleted = state.products.delete(&txn, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::message("Produto removido"))
}
