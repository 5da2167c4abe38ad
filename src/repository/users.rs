use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::AppResult,
    models::{NewUser, User, UserPatch},
    routes::params::Pagination,
};

/// A user together with its stored password hash. Only `authenticate` ever
/// sees the hash; every other read returns the bare projection.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub senha_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        pagination: &Pagination,
    ) -> AppResult<(Vec<User>, i64)>;

    async fn find_by_id<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
    ) -> AppResult<Option<UserCredentials>>;

    async fn email_taken<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool>;

    async fn insert<C: ConnectionTrait>(&self, conn: &C, data: NewUser) -> AppResult<User>;

    async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        patch: &UserPatch,
    ) -> AppResult<Option<User>>;

    async fn delete<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmUsers;

#[async_trait]
impl UserRepository for SeaOrmUsers {
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        pagination: &Pagination,
    ) -> AppResult<(Vec<User>, i64)> {
        let (_, limit, offset) = pagination.normalize();

        let finder = Users::find().order_by_desc(Column::CreatedAt);
        let total = finder.clone().count(conn).await? as i64;

        let users = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(conn)
            .await?
            .into_iter()
            .map(user_from_entity)
            .collect();

        Ok((users, total))
    }

    async fn find_by_id<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<Option<User>> {
        let found = Users::find_by_id(id).one(conn).await?;
        Ok(found.map(user_from_entity))
    }

    async fn find_by_email<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
    ) -> AppResult<Option<UserCredentials>> {
        let found = Users::find()
            .filter(Column::Email.eq(email))
            .one(conn)
            .await?;
        Ok(found.map(|model| UserCredentials {
            senha_hash: model.senha_hash.clone(),
            user: user_from_entity(model),
        }))
    }

    async fn email_taken<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let mut condition = Condition::all().add(Column::Email.eq(email));
        if let Some(id) = exclude {
            condition = condition.add(Column::Id.ne(id));
        }
        let count = Users::find().filter(condition).count(conn).await?;
        Ok(count > 0)
    }

    async fn insert<C: ConnectionTrait>(&self, conn: &C, data: NewUser) -> AppResult<User> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            nome: Set(data.nome),
            email: Set(data.email),
            senha_hash: Set(data.senha_hash),
            role: Set(data.role),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let user = active.insert(conn).await?;
        Ok(user_from_entity(user))
    }

    async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        patch: &UserPatch,
    ) -> AppResult<Option<User>> {
        let existing = Users::find_by_id(id).one(conn).await?;
        let existing = match existing {
            Some(u) => u,
            None => return Ok(None),
        };

        let mut active: ActiveModel = existing.into();
        if let Some(nome) = patch.nome.clone() {
            active.nome = Set(nome);
        }
        if let Some(email) = patch.email.clone() {
            active.email = Set(email);
        }
        if let Some(senha_hash) = patch.senha_hash.clone() {
            active.senha_hash = Set(senha_hash);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now().into());

        let user = active.update(conn).await?;
        Ok(Some(user_from_entity(user)))
    }

    async fn delete<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<bool> {
        let result = Users::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        nome: model.nome,
        email: model.email,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
