use pedidos_api::{
    dto::{
        auth::LoginRequest,
        orders::{CreateOrderRequest, OrderItemRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        users::{CreateUserRequest, UpdateUserRequest},
    },
    validate::{
        validate_create_order, validate_create_product, validate_create_user, validate_login,
        validate_update_product, validate_update_user,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn fields(errors: &[pedidos_api::error::FieldError]) -> Vec<&str> {
    errors.iter().map(|e| e.field.as_str()).collect()
}

#[test]
fn login_requires_email_and_senha() {
    let errors = validate_login(&LoginRequest {
        email: "".into(),
        senha: "".into(),
    });
    assert_eq!(fields(&errors), vec!["email", "senha"]);
}

#[test]
fn login_rejects_malformed_email() {
    let errors = validate_login(&LoginRequest {
        email: "joao.email.com".into(),
        senha: "senha123".into(),
    });
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "email");
    assert_eq!(errors[0].message, "O email fornecido é inválido");
}

#[test]
fn login_accepts_valid_credentials_shape() {
    let errors = validate_login(&LoginRequest {
        email: "joao@email.com".into(),
        senha: "senha123".into(),
    });
    assert!(errors.is_empty());
}

#[test]
fn user_creation_enforces_minimum_password_length() {
    let errors = validate_create_user(&CreateUserRequest {
        nome: "João Silva".into(),
        email: "joao@email.com".into(),
        senha: "12345".into(),
        role: None,
    });
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "senha");
    assert_eq!(errors[0].message, "A senha deve ter no mínimo 6 caracteres");
}

#[test]
fn user_creation_collects_every_failing_field() {
    let errors = validate_create_user(&CreateUserRequest {
        nome: "  ".into(),
        email: "not-an-email".into(),
        senha: "".into(),
        role: None,
    });
    assert_eq!(fields(&errors), vec!["nome", "email", "senha"]);
}

#[test]
fn user_update_only_checks_provided_fields() {
    let errors = validate_update_user(&UpdateUserRequest::default());
    assert!(errors.is_empty());

    let errors = validate_update_user(&UpdateUserRequest {
        senha: Some("123".into()),
        ..Default::default()
    });
    assert_eq!(fields(&errors), vec!["senha"]);
}

#[test]
fn product_creation_rejects_negative_price_and_stock() {
    let errors = validate_create_product(&CreateProductRequest {
        nome: "Notebook".into(),
        categoria: "Eletrônicos".into(),
        descricao: None,
        preco: Decimal::new(-100, 2),
        quantidade_estoque: -1,
    });
    assert_eq!(fields(&errors), vec!["preco", "quantidade_estoque"]);
}

#[test]
fn product_creation_accepts_zero_price_and_stock() {
    let errors = validate_create_product(&CreateProductRequest {
        nome: "Brinde".into(),
        categoria: "Promoções".into(),
        descricao: Some("Item de cortesia".into()),
        preco: Decimal::ZERO,
        quantidade_estoque: 0,
    });
    assert!(errors.is_empty());
}

#[test]
fn product_update_rejects_blank_nome() {
    let errors = validate_update_product(&UpdateProductRequest {
        nome: Some("   ".into()),
        ..Default::default()
    });
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "nome");
}

#[test]
fn order_must_carry_at_least_one_item() {
    let errors = validate_create_order(&CreateOrderRequest {
        items: vec![],
        status: None,
    });
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "items");
    assert_eq!(errors[0].message, "O pedido deve conter pelo menos um item");
}

#[test]
fn order_lines_require_positive_quantities() {
    let errors = validate_create_order(&CreateOrderRequest {
        items: vec![
            OrderItemRequest {
                product_id: Uuid::new_v4(),
                quantidade: 2,
            },
            OrderItemRequest {
                product_id: Uuid::new_v4(),
                quantidade: 0,
            },
            OrderItemRequest {
                product_id: Uuid::new_v4(),
                quantidade: -3,
            },
        ],
        status: None,
    });
    assert_eq!(
        fields(&errors),
        vec!["items[1].quantidade", "items[2].quantidade"]
    );
}
