use actix_web::{HttpResponse, Responder, get, web};
use fleetwatch::DiagnosticsContext;
use serde_json::json;

macros_utils::routes! {
    route full_route,
    route last_route,
    route report_route,
    route network_route,
    route database_route,
    route printers_route,
    route system_route,
}

#[get("/api/diagnostics/full")]
pub async fn full_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(&*ctx.run_full_diagnostics().await)
}

/// Latest cached pass, 404 before the first one
#[get("/api/diagnostics/last")]
pub async fn last_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    match ctx.last_results().await {
        Some(snapshot) => HttpResponse::Ok().json(&*snapshot),
        None => HttpResponse::NotFound().json(json!({ "message": "No diagnostic results available" })),
    }
}

#[get("/api/diagnostics/report")]
pub async fn report_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.generate_report().await)
}

#[get("/api/diagnostics/network")]
pub async fn network_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.aggregator().test_network().await)
}

#[get("/api/diagnostics/database")]
pub async fn database_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.aggregator().test_databases().await)
}

#[get("/api/diagnostics/printers")]
pub async fn printers_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.aggregator().test_printers().await)
}

#[get("/api/diagnostics/system")]
pub async fn system_route(ctx: web::Data<DiagnosticsContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.aggregator().system_info().await)
}
