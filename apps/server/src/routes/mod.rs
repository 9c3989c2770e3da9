use actix_web::web::ServiceConfig;

mod diagnostics;
mod health;
mod sql;
mod zebra;

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.configure(health::routes)
        .configure(diagnostics::routes)
        .configure(zebra::routes)
        .configure(sql::routes);
}
