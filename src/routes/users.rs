use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::Pagination,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/", post(create_user))
        .route("/{id}", get(get_user))
        .route("/{id}", put(update_user))
        .route("/{id}", delete(delete_user))
}

#[utoipa::path(
    get,
    path = "/usuarios",
    params(
        ("page" = Option<i64>, Query, description = "Página, padrão 1"),
        ("per_page" = Option<i64>, Query, description = "Itens por página, padrão 20")
    ),
    responses(
        (status = 200, description = "Lista de usuários", body = ApiResponse<UserList>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("bearer_auth" = [])),
    tag = "Usuários"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Usuário encontrado", body = ApiResponse<User>),
        (status = 403, description = "Acesso restrito ao próprio usuário"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Usuários"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/usuarios",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Usuário criado", body = ApiResponse<User>),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Email já está em uso")
    ),
    tag = "Usuários"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::create_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Usuário atualizado", body = ApiResponse<User>),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Acesso restrito"),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "Email já está em uso")
    ),
    security(("bearer_auth" = [])),
    tag = "Usuários"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Usuário removido"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("bearer_auth" = [])),
    tag = "Usuários"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = user_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}
