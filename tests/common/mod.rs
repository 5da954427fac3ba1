#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use harborcrate::{AppState, database::create_schema};
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde_json::{Value, json};
use tower::ServiceExt;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    create_schema(&db).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    harborcrate::app(AppState::new(db), &[])
}

pub async fn test_app() -> Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    setup_test_app(db)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends the request and returns status plus parsed body.
pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = send(app, method, uri, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

pub fn port_body(nombre: &str, capacidad_teu: i64, activo: bool) -> Value {
    json!({
        "nombre": nombre,
        "ciudad": "Ciudad",
        "pais": "España",
        "capacidad_teu": capacidad_teu,
        "activo": activo,
        "fecha_inauguracion": "1990-05-20",
        "profundidad_media": 14.5
    })
}

pub fn dock_body(id_puerto: i64, nombre: &str, longitud_m: f64) -> Value {
    json!({
        "id_puerto": id_puerto,
        "nombre": nombre,
        "longitud_m": longitud_m,
        "calado_m": 12,
        "operativo": true,
        "fecha_construccion": "2005-03-01",
        "tipo": "carga"
    })
}

/// Creates a port and returns its id.
pub async fn create_port(app: &Router, nombre: &str, capacidad_teu: i64, activo: bool) -> i64 {
    let (status, body) = call(app, "POST", "/api/puertos", Some(port_body(nombre, capacidad_teu, activo))).await;
    assert_eq!(status, StatusCode::CREATED, "port creation failed: {body}");
    body["data"]["id_puerto"].as_i64().unwrap()
}

/// Creates a dock and returns its id.
pub async fn create_dock(app: &Router, id_puerto: i64, nombre: &str, longitud_m: f64) -> i64 {
    let (status, body) = call(app, "POST", "/api/muelles", Some(dock_body(id_puerto, nombre, longitud_m))).await;
    assert_eq!(status, StatusCode::CREATED, "dock creation failed: {body}");
    body["data"]["id_muelle"].as_i64().unwrap()
}

/// Names of the rows in a list response, in order.
pub fn row_names(body: &Value) -> Vec<String> {
    body["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["nombre"].as_str().unwrap().to_string())
        .collect()
}

/// Field names reported in the `details` of an error envelope.
pub fn detail_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap().to_string())
        .collect()
}
