use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use fleetwatch::DiagnosticsContext;
use fleetwatch::zpl;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

macros_utils::routes! {
    route test_connection_route,
    route command_route,
    route printer_status_route,
    route all_status_route,
    route test_print_route,
    route commands_route,
}

const MAX_COMMAND_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    printer_id: String,
    command: String,
}

impl CommandRequest {
    fn validate(&self) -> ApiResult<()> {
        match self.command.chars().count() {
            0 => Err(ApiError::Validation("\"command\" is not allowed to be empty".into())),
            n if n > MAX_COMMAND_CHARS => Err(ApiError::Validation(format!(
                "\"command\" length must be less than or equal to {MAX_COMMAND_CHARS} characters long"
            ))),
            _ => Ok(()),
        }
    }
}

#[get("/api/zebra/test/{printer_id}")]
pub async fn test_connection_route(
    ctx: web::Data<DiagnosticsContext>,
    printer_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.test_printer(&printer_id).await?))
}

/// Raw command, reply read until the printer closes
#[post("/api/zebra/command")]
pub async fn command_route(
    ctx: web::Data<DiagnosticsContext>,
    request: web::Json<CommandRequest>,
) -> ApiResult<HttpResponse> {
    request.validate()?;
    let reply = ctx.send_command(&request.printer_id, request.command.as_bytes()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

#[get("/api/zebra/status/{printer_id}")]
pub async fn printer_status_route(
    ctx: web::Data<DiagnosticsContext>,
    printer_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.printer_web_status(&printer_id).await?))
}

#[get("/api/zebra/status")]
pub async fn all_status_route(ctx: web::Data<DiagnosticsContext>) -> HttpResponse {
    HttpResponse::Ok().json(ctx.all_printers_status().await)
}

#[post("/api/zebra/test-print/{printer_id}")]
pub async fn test_print_route(
    ctx: web::Data<DiagnosticsContext>,
    printer_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.print_test_label(&printer_id).await?))
}

/// Catalogue as a `{name: command}` object
#[get("/api/zebra/commands")]
pub async fn commands_route() -> HttpResponse {
    let catalogue: serde_json::Map<String, serde_json::Value> = zpl::common_commands(Utc::now())
        .into_iter()
        .map(|template| (template.name.to_string(), template.command.into()))
        .collect();

    HttpResponse::Ok().json(catalogue)
}
