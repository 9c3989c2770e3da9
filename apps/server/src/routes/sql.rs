use actix_web::{HttpResponse, get, web};
use fleetwatch::{DiagnosticsContext, FleetError};

use crate::error::ApiResult;

macros_utils::routes! {
    route test_default_route,
    route test_route,
}

/// Id of the registered database target
fn default_database(ctx: &DiagnosticsContext) -> ApiResult<String> {
    ctx.registry()
        .database()
        .map(|db| db.id.clone())
        .ok_or_else(|| FleetError::UnknownDevice("database".into()).into())
}

#[get("/api/sql/test")]
pub async fn test_default_route(ctx: web::Data<DiagnosticsContext>) -> ApiResult<HttpResponse> {
    let database = default_database(&ctx)?;
    Ok(HttpResponse::Ok().json(ctx.test_database(&database).await?))
}

#[get("/api/sql/test/{database}")]
pub async fn test_route(ctx: web::Data<DiagnosticsContext>, database: web::Path<String>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.test_database(&database).await?))
}
