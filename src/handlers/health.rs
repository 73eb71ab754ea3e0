use actix_web::{web::Data, HttpResponse};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::activity::ActivityService;

pub async fn health_check(service: Data<ActivityService>) -> AppResult<HttpResponse> {
    service.database().health_check().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    })))
}
