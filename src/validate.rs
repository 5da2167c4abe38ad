use rust_decimal::Decimal;

use crate::dto::{
    auth::LoginRequest,
    orders::CreateOrderRequest,
    products::{CreateProductRequest, UpdateProductRequest},
    users::{CreateUserRequest, UpdateUserRequest},
};
use crate::error::FieldError;

/// Structural email check, enough to catch the typos the API cares about.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

pub fn validate_login(payload: &LoginRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.email.trim().is_empty() {
        errors.push(FieldError::new("email", "O email é obrigatório"));
    } else if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "O email fornecido é inválido"));
    }
    if payload.senha.is_empty() {
        errors.push(FieldError::new("senha", "A senha é obrigatória"));
    }
    errors
}

pub fn validate_create_user(payload: &CreateUserRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.nome.trim().is_empty() {
        errors.push(FieldError::new("nome", "O nome é obrigatório"));
    }
    if payload.email.trim().is_empty() {
        errors.push(FieldError::new("email", "O email é obrigatório"));
    } else if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "O email fornecido é inválido"));
    }
    if payload.senha.is_empty() {
        errors.push(FieldError::new("senha", "A senha é obrigatória"));
    } else if payload.senha.chars().count() < 6 {
        errors.push(FieldError::new(
            "senha",
            "A senha deve ter no mínimo 6 caracteres",
        ));
    }
    errors
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(nome) = &payload.nome {
        if nome.trim().is_empty() {
            errors.push(FieldError::new("nome", "O nome é obrigatório"));
        }
    }
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email", "O email fornecido é inválido"));
        }
    }
    if let Some(senha) = &payload.senha {
        if senha.chars().count() < 6 {
            errors.push(FieldError::new(
                "senha",
                "A senha deve ter no mínimo 6 caracteres",
            ));
        }
    }
    errors
}

pub fn validate_create_product(payload: &CreateProductRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.nome.trim().is_empty() {
        errors.push(FieldError::new("nome", "O nome é obrigatório"));
    }
    if payload.categoria.trim().is_empty() {
        errors.push(FieldError::new("categoria", "A categoria é obrigatória"));
    }
    if payload.preco < Decimal::ZERO {
        errors.push(FieldError::new(
            "preco",
            "O preço deve ser maior ou igual a zero",
        ));
    }
    if payload.quantidade_estoque < 0 {
        errors.push(FieldError::new(
            "quantidade_estoque",
            "A quantidade em estoque deve ser maior ou igual a zero",
        ));
    }
    errors
}

pub fn validate_update_product(payload: &UpdateProductRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(nome) = &payload.nome {
        if nome.trim().is_empty() {
            errors.push(FieldError::new("nome", "O nome é obrigatório"));
        }
    }
    if let Some(categoria) = &payload.categoria {
        if categoria.trim().is_empty() {
            errors.push(FieldError::new("categoria", "A categoria é obrigatória"));
        }
    }
    if let Some(preco) = payload.preco {
        if preco < Decimal::ZERO {
            errors.push(FieldError::new(
                "preco",
                "O preço deve ser maior ou igual a zero",
            ));
        }
    }
    if let Some(quantidade) = payload.quantidade_estoque {
        if quantidade < 0 {
            errors.push(FieldError::new(
                "quantidade_estoque",
                "A quantidade em estoque deve ser maior ou igual a zero",
            ));
        }
    }
    errors
}

pub fn validate_create_order(payload: &CreateOrderRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.items.is_empty() {
        errors.push(FieldError::new(
            "items",
            "O pedido deve conter pelo menos um item",
        ));
    }
    for (index, item) in payload.items.iter().enumerate() {
        if item.quantidade <= 0 {
            errors.push(FieldError::new(
                &format!("items[{index}].quantidade"),
                "A quantidade deve ser um número positivo",
            ));
        }
    }
    errors
}
