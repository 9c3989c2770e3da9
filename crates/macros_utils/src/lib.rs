//! Small declarative helpers shared by the binaries

/// Generate a `routes` function registering every listed actix-web handler.
///
/// ```ignore
/// macros_utils::routes! {
///     route health,
///     route readiness,
/// }
/// ```
///
/// expands to `pub fn routes(cfg: &mut actix_web::web::ServiceConfig)` calling
/// `cfg.service(...)` for each handler in order.
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $( cfg.service($handler); )*
        }
    };
}

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;
