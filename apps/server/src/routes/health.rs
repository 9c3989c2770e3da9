use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, web};
use fleetwatch::DiagnosticsContext;

macros_utils::routes! {
    route health_route,
    route detailed_health_route,
    route readiness_route,
    route liveness_route,
}

fn serving_status(serving: bool) -> StatusCode {
    if serving { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE }
}

/// Overall verdict; 503 when CRITICAL or ERROR
#[get("/health")]
pub async fn health_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    let verdict = ctx.health().status().await;
    HttpResponse::build(serving_status(verdict.status.is_serving())).json(verdict)
}

#[get("/health/detailed")]
pub async fn detailed_health_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.health().detailed().await)
}

#[get("/health/ready")]
pub async fn readiness_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    let readiness = ctx.health().readiness().await;
    HttpResponse::build(serving_status(readiness.ready)).json(readiness)
}

/// Liveness only; never touches a device
#[get("/health/live")]
pub async fn liveness_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.health().liveness())
}
