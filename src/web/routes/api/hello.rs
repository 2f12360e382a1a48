use axum::Json;
use serde_json::{json, Value};

pub async fn hello() -> Json<Value> {
    Json(json!({ "text": "Hello from Azure Functions!" }))
}
