use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{NewProduct, Product, ProductPatch};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Smartphone XYZ")]
    pub nome: String,
    #[schema(example = "Eletrônicos")]
    pub categoria: String,
    pub descricao: Option<String>,
    #[schema(example = "1299.99")]
    pub preco: Decimal,
    #[schema(example = 50)]
    pub quantidade_estoque: i32,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(payload: CreateProductRequest) -> Self {
        NewProduct {
            nome: payload.nome,
            categoria: payload.categoria,
            descricao: payload.descricao,
            preco: payload.preco,
            quantidade_estoque: payload.quantidade_estoque,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub nome: Option<String>,
    pub categoria: Option<String>,
    pub descricao: Option<String>,
    pub preco: Option<Decimal>,
    pub quantidade_estoque: Option<i32>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(payload: UpdateProductRequest) -> Self {
        ProductPatch {
            nome: payload.nome,
            categoria: payload.categoria,
            descricao: payload.descricao,
            preco: payload.preco,
            quantidade_estoque: payload.quantidade_estoque,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
