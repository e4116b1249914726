#![allow(clippy::needless_borrows_for_generic_args)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

mod common;
use common::*;

fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("Failed to parse decimal")
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let env = TestEnvironment::new().await;

    let response = env.get("/health/status").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let health: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["database"], "up");

    let response = env.get("/metrics").await;
    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("database_connections_idle"));
}

#[tokio::test]
async fn test_anonymous_visitors_are_sent_to_login() {
    let env = TestEnvironment::new().await;

    let response = env.get("/").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/login");

    let response = env.get("/menu").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/login");

    let response = env.get("/carrito").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/login");

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 1, "cantidad": 1}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Debe iniciar sesión");
}

#[tokio::test]
async fn test_register_login_and_view_menu() {
    let env = TestEnvironment::signed_in("Ana", "ana@example.com").await;

    let response = env.get("/menu").await;
    assert_eq!(response.status().as_u16(), 200);

    let page: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(page["nombre"], "Ana");
    assert_eq!(page["items"]["bebidas"].as_array().unwrap().len(), 5);
    assert_eq!(page["items"]["snacks"].as_array().unwrap().len(), 5);

    let week = page["semana_rotativa"].as_u64().unwrap();
    assert!((1..=6).contains(&week));

    let flashes = page["flashes"].as_array().unwrap();
    assert!(flashes.contains(&json!("Usuario registrado con éxito")));
    assert!(flashes.contains(&json!("Inicio de sesión exitoso")));

    // flashes are consumed by the first page that shows them
    let page: Value = env.get("/menu").await.json().await.unwrap();
    assert!(page["flashes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_flow() {
    let env = TestEnvironment::signed_in("Luis", "luis@example.com").await;

    // Latte, 40.00
    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 2, "cantidad": 2}))
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["message"], "Producto agregado al carrito");
    assert_eq!(reply["total_items"], 2);

    // form-style string ids accumulate onto the same line
    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": "2", "cantidad": "1"}))
        .await;
    assert_eq!(reply["total_items"], 3);

    // Galletas, 15.00, default quantity of one
    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 7}))
        .await;
    assert_eq!(reply["total_items"], 4);

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 999, "cantidad": 1}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Producto no encontrado");

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 2, "cantidad": 0}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Cantidad inválida");

    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert_eq!(page["total_items"], 4);
    assert_eq!(decimal(&page["total"]), dec!(135));
    assert_eq!(page["carrito"].as_array().unwrap().len(), 2);

    let reply = env
        .post_json("/quitar_del_carrito", json!({"producto_id": 999}))
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["total_items"], 4);

    let reply = env
        .post_json("/actualizar_cantidad", json!({"producto_id": 2, "cantidad": 5}))
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["message"], "Cantidad actualizada");
    assert_eq!(reply["total_items"], 6);

    let reply = env
        .post_json("/actualizar_cantidad", json!({"producto_id": 7, "cantidad": 0}))
        .await;
    assert_eq!(reply["message"], "Producto removido del carrito");
    assert_eq!(reply["total_items"], 5);

    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert_eq!(decimal(&page["total"]), dec!(200));

    let reply = env
        .post_json("/quitar_del_carrito", json!({"producto_id": 2}))
        .await;
    assert_eq!(reply["total_items"], 0);

    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert!(page["carrito"].as_array().unwrap().is_empty());
    assert_eq!(decimal(&page["total"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let env = TestEnvironment::new().await;

    let response = env.register("Eva", "eva@example.com").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/login");

    let response = env.login("eva@example.com", "incorrecta").await;
    assert_eq!(response.status().as_u16(), 200);

    let page: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(page["page"], "login");
    let flashes = page["flashes"].as_array().unwrap();
    assert!(flashes.contains(&json!("Correo o contraseña incorrectos")));

    let response = env.get("/menu").await;
    assert_eq!(response.status().as_u16(), 303);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let env = TestEnvironment::new().await;

    let response = env.register("Eva", "eva@example.com").await;
    assert_eq!(response.status().as_u16(), 303);

    let response = env.register("Otra Eva", "eva@example.com").await;
    assert_eq!(response.status().as_u16(), 200);

    let page: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(page["page"], "register");
    let flashes = page["flashes"].as_array().unwrap();
    assert!(flashes.contains(&json!("No se pudo completar el registro")));
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let env = TestEnvironment::new().await;

    let response = env.register("Eva", "no-es-un-correo").await;
    assert_eq!(response.status().as_u16(), 200);

    let page: Value = response.json().await.expect("Failed to parse response");
    assert!(page["flashes"]
        .as_array()
        .unwrap()
        .contains(&json!("Datos de registro inválidos")));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let env = TestEnvironment::signed_in("Sofía", "sofia@example.com").await;

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 1, "cantidad": 1}))
        .await;
    assert_eq!(reply["success"], true);

    let response = env.get("/logout").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/login");

    let page: Value = env.get("/login").await.json().await.unwrap();
    assert!(page["flashes"]
        .as_array()
        .unwrap()
        .contains(&json!("Sesión cerrada")));

    let response = env.get("/carrito").await;
    assert_eq!(response.status().as_u16(), 303);

    // logging back in starts with an empty cart
    let response = env.login("sofia@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status().as_u16(), 303);
    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert_eq!(page["total_items"], 0);
}

#[tokio::test]
async fn test_rejects_unsupported_content_type() {
    let env = TestEnvironment::new().await;

    let response = env
        .client
        .post(env.url("/login"))
        .header("content-type", "text/plain")
        .body("correo=a")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 415);
}

#[tokio::test]
async fn test_anonymous_cart_requests_fail_before_body_parsing() {
    let env = TestEnvironment::new().await;

    for path in ["/agregar_al_carrito", "/quitar_del_carrito", "/actualizar_cantidad"] {
        let response = env
            .client
            .post(env.url(path))
            .json(&json!({}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status().as_u16(), 200);

        let reply: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(reply["success"], false);
        assert_eq!(reply["message"], "Debe iniciar sesión");
    }
}

#[tokio::test]
async fn test_malformed_cart_body_is_a_failure_reply() {
    let env = TestEnvironment::signed_in("Marta", "marta@example.com").await;

    let reply = env.post_json("/quitar_del_carrito", json!({})).await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Solicitud inválida");

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": "dos"}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Solicitud inválida");
}

#[tokio::test]
async fn test_line_quantity_limit() {
    let env = TestEnvironment::signed_in("Raúl", "raul@example.com").await;

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 1, "cantidad": 4294967295u64}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Cantidad inválida");

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 1, "cantidad": 1000}))
        .await;
    assert_eq!(reply["total_items"], 1000);

    // a second line still counts correctly
    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 2, "cantidad": 1}))
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["total_items"], 1001);

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 1, "cantidad": 1}))
        .await;
    assert_eq!(reply["message"], "Cantidad inválida");

    let reply = env
        .post_json("/actualizar_cantidad", json!({"producto_id": 2, "cantidad": 4294967295u64}))
        .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Cantidad inválida");

    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert_eq!(page["total_items"], 1001);
}

#[tokio::test]
async fn test_login_starts_with_empty_cart() {
    let env = TestEnvironment::signed_in("Nora", "nora@example.com").await;

    let reply = env
        .post_json("/agregar_al_carrito", json!({"producto_id": 3, "cantidad": 2}))
        .await;
    assert_eq!(reply["total_items"], 2);

    // logging in again without logging out
    let response = env.login("nora@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status().as_u16(), 303);

    let page: Value = env.get("/carrito").await.json().await.unwrap();
    assert_eq!(page["total_items"], 0);
}
