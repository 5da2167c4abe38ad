use uuid::Uuid;

use crate::{
    audit,
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, is_owner_or_admin},
    models::{NewUser, User, UserPatch},
    repository::UserRepository,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::hash_password,
    state::AppState,
    validate::{validate_create_user, validate_update_user},
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, _) = pagination.normalize();
    let (items, total) = state.users.find_page(&state.orm, &pagination).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Usuários", UserList { items }, Some(meta)))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    if !is_owner_or_admin(user, id) {
        return Err(AppError::Forbidden);
    }

    let found = state
        .users
        .find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Usuário", found, None))
}

/// Open registration. The payload may name a role; it defaults to `user`.
pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let errors = validate_create_user(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if state.users.email_taken(&state.orm, &payload.email, None).await? {
        return Err(AppError::Conflict("Este email já está em uso".into()));
    }

    let senha_hash = hash_password(&payload.senha)?;
    let data = NewUser {
        nome: payload.nome,
        email: payload.email,
        senha_hash,
        role: payload.role.unwrap_or_default(),
    };
    let created = state.users.insert(&state.orm, data).await?;

    audit::record(
        &state.pool,
        Some(created.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": created.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Usuário criado",
        created,
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    if !is_owner_or_admin(user, id) {
        return Err(AppError::Forbidden);
    }

    let errors = validate_update_user(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Only admins may move a user between roles.
    if payload.role.is_some() {
        ensure_admin(user)?;
    }

    if let Some(email) = &payload.email {
        if state.users.email_taken(&state.orm, email, Some(id)).await? {
            return Err(AppError::Conflict("Este email já está em uso".into()));
        }
    }

    let senha_hash = match &payload.senha {
        Some(senha) => Some(hash_password(senha)?),
        None => None,
    };
    let patch = UserPatch {
        nome: payload.nome,
        email: payload.email,
        senha_hash,
        role: payload.role,
    };

    let updated = state
        .users
        .update(&state.orm, id, &patch)
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Usuário atualizado",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;

    let deleted = state.users.delete(&state.orm, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await;

    Ok(ApiResponse::message("Usuário removido"))
}
