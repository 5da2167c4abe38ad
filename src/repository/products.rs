use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::AppResult,
    models::{NewProduct, Product, ProductPatch},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
};

/// Data access for the product catalog. Methods take the connection so the
/// same repository serves pooled reads and transactional writes.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &ProductQuery,
    ) -> AppResult<(Vec<Product>, i64)>;

    async fn find_by_id<C: ConnectionTrait>(&self, conn: &C, id: Uuid)
    -> AppResult<Option<Product>>;

    /// Load the product row with a row lock, for stock adjustments.
    async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Product>>;

    async fn insert<C: ConnectionTrait>(&self, conn: &C, data: NewProduct) -> AppResult<Product>;

    async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        patch: &ProductPatch,
    ) -> AppResult<Option<Product>>;

    async fn set_stock<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        quantidade_estoque: i32,
    ) -> AppResult<Product>;

    async fn delete<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmProducts;

#[async_trait]
impl ProductRepository for SeaOrmProducts {
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &ProductQuery,
    ) -> AppResult<(Vec<Product>, i64)> {
        let (_, limit, offset) = query.pagination.normalize();
        let mut condition = Condition::all();

        if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(Column::Nome).ilike(pattern.clone()))
                    .add(Expr::col(Column::Descricao).ilike(pattern)),
            );
        }

        if let Some(categoria) = query.categoria.as_ref().filter(|s| !s.is_empty()) {
            condition = condition.add(Column::Categoria.eq(categoria.clone()));
        }

        if let Some(min_price) = query.min_price {
            condition = condition.add(Column::Preco.gte(min_price));
        }

        if let Some(max_price) = query.max_price {
            condition = condition.add(Column::Preco.lte(max_price));
        }

        let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
        let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
        let sort_col = match sort_by {
            ProductSortBy::CreatedAt => Column::CreatedAt,
            ProductSortBy::Preco => Column::Preco,
            ProductSortBy::Nome => Column::Nome,
        };

        let mut finder = Products::find().filter(condition);
        finder = match sort_order {
            SortOrder::Asc => finder.order_by_asc(sort_col),
            SortOrder::Desc => finder.order_by_desc(sort_col),
        };

        let total = finder.clone().count(conn).await? as i64;

        let items = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(conn)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();

        Ok((items, total))
    }

    async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Product>> {
        let found = Products::find_by_id(id).one(conn).await?;
        Ok(found.map(product_from_entity))
    }

    async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Product>> {
        let found = Products::find_by_id(id)
            .lock(LockType::Update)
            .one(conn)
            .await?;
        Ok(found.map(product_from_entity))
    }

    async fn insert<C: ConnectionTrait>(&self, conn: &C, data: NewProduct) -> AppResult<Product> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            nome: Set(data.nome),
            categoria: Set(data.categoria),
            descricao: Set(data.descricao),
            preco: Set(data.preco),
            quantidade_estoque: Set(data.quantidade_estoque),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let product = active.insert(conn).await?;
        Ok(product_from_entity(product))
    }

    async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        patch: &ProductPatch,
    ) -> AppResult<Option<Product>> {
        let existing = Products::find_by_id(id).one(conn).await?;
        let existing = match existing {
            Some(p) => p,
            None => return Ok(None),
        };

        let mut active: ActiveModel = existing.into();
        if let Some(nome) = patch.nome.clone() {
            active.nome = Set(nome);
        }
        if let Some(categoria) = patch.categoria.clone() {
            active.categoria = Set(categoria);
        }
        if let Some(descricao) = patch.descricao.clone() {
            active.descricao = Set(Some(descricao));
        }
        if let Some(preco) = patch.preco {
            active.preco = Set(preco);
        }
        if let Some(quantidade) = patch.quantidade_estoque {
            active.quantidade_estoque = Set(quantidade);
        }
        active.updated_at = Set(Utc::now().into());

        let product = active.update(conn).await?;
        Ok(Some(product_from_entity(product)))
    }

    async fn set_stock<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        quantidade_estoque: i32,
    ) -> AppResult<Product> {
        let active = ActiveModel {
            id: Unchanged(id),
            quantidade_estoque: Set(quantidade_estoque),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let product = active.update(conn).await?;
        Ok(product_from_entity(product))
    }

    async fn delete<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<bool> {
        let result = Products::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        nome: model.nome,
        categoria: model.categoria,
        descricao: model.descricao,
        preco: model.preco,
        quantidade_estoque: model.quantidade_estoque,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
