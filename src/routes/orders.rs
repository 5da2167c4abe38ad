use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders))
        .route("/", post(create_order))
        .route("/meus-pedidos", get(list_my_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_order_status))
}

#[utoipa::path(
    get,
    path = "/pedidos",
    params(
        ("page" = Option<i64>, Query, description = "Página, padrão 1"),
        ("per_page" = Option<i64>, Query, description = "Itens por página, padrão 20"),
        ("status" = Option<String>, Query, description = "Pendente, Concluído ou Cancelado"),
        ("sort_order" = Option<String>, Query, description = "asc ou desc")
    ),
    responses(
        (status = 200, description = "Todos os pedidos", body = ApiResponse<OrderList>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("bearer_auth" = [])),
    tag = "Pedidos"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/pedidos/meus-pedidos",
    params(
        ("page" = Option<i64>, Query, description = "Página, padrão 1"),
        ("per_page" = Option<i64>, Query, description = "Itens por página, padrão 20"),
        ("status" = Option<String>, Query, description = "Pendente, Concluído ou Cancelado"),
        ("sort_order" = Option<String>, Query, description = "asc ou desc")
    ),
    responses(
        (status = 200, description = "Pedidos do usuário autenticado", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Pedidos"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/pedidos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    responses(
        (status = 200, description = "Pedido com itens", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Pedidos"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/pedidos",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Pedido criado", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Dados inválidos ou estoque insuficiente"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Pedidos"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/pedidos/{id}/status",
    params(
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status atualizado", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Estoque insuficiente para concluir"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Pedidos"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
