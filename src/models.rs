use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order lifecycle. Stored and serialized with the Portuguese labels the
/// API contract uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pendente")]
    Pendente,
    #[sea_orm(string_value = "Concluído")]
    #[serde(rename = "Concluído")]
    Concluido,
    #[sea_orm(string_value = "Cancelado")]
    Cancelado,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderStatus::Pendente => "Pendente",
            OrderStatus::Concluido => "Concluído",
            OrderStatus::Cancelado => "Cancelado",
        })
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[default]
    #[sea_orm(string_value = "user")]
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::User => "user",
        })
    }
}

/// Public user projection. The password hash never leaves the repository
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub nome: String,
    pub categoria: String,
    pub descricao: Option<String>,
    #[schema(example = "50.00")]
    pub preco: Decimal,
    pub quantidade_estoque: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Order header. Lines are carried separately and nested by the single-order
/// projection in `dto::orders`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[schema(example = "100.00")]
    pub total_pedido: Decimal,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantidade: i32,
    #[schema(example = "50.00")]
    pub preco_unitario: Decimal,
    #[schema(example = "100.00")]
    pub subtotal: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub nome: String,
    pub categoria: String,
    pub descricao: Option<String>,
    pub preco: Decimal,
    pub quantidade_estoque: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub nome: Option<String>,
    pub categoria: Option<String>,
    pub descricao: Option<String>,
    pub preco: Option<Decimal>,
    pub quantidade_estoque: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub senha_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha_hash: Option<String>,
    pub role: Option<Role>,
}

/// Requested line at order creation, before prices are snapshotted.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantidade: i32,
}

/// Line with price and subtotal resolved, ready to persist.
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub product_id: Uuid,
    pub quantidade: i32,
    pub preco_unitario: Decimal,
    pub subtotal: Decimal,
}
