use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/{id}", get(get_product))
        .route("/{id}", put(update_product))
        .route("/{id}", delete(delete_product))
}

#[utoipa::path(
    get,
    path = "/produtos",
    params(
        ("page" = Option<i64>, Query, description = "Página, padrão 1"),
        ("per_page" = Option<i64>, Query, description = "Itens por página, padrão 20"),
        ("q" = Option<String>, Query, description = "Busca em nome e descrição"),
        ("categoria" = Option<String>, Query, description = "Filtrar por categoria"),
        ("min_price" = Option<String>, Query, description = "Preço mínimo"),
        ("max_price" = Option<String>, Query, description = "Preço máximo"),
        ("sort_by" = Option<String>, Query, description = "created_at, preco ou nome"),
        ("sort_order" = Option<String>, Query, description = "asc ou desc")
    ),
    responses(
        (status = 200, description = "Lista de produtos", body = ApiResponse<ProductList>)
    ),
    tag = "Produtos"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/produtos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto encontrado", body = ApiResponse<Product>),
        (status = 404, description = "Produto não encontrado")
    ),
    tag = "Produtos"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/produtos",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Produto criado", body = ApiResponse<Product>),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("bearer_auth" = [])),
    tag = "Produtos"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/produtos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Produto atualizado", body = ApiResponse<Product>),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Produtos"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/produtos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto removido"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto referenciado por pedidos")
    ),
    security(("bearer_auth" = [])),
    tag = "Produtos"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}
