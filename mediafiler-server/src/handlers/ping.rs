use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

pub async fn ping() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
