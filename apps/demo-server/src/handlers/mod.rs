//! HTTP handlers and route configuration.

mod health;
mod items;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/items", web::get().to(items::list_items))
            .route("/fail", web::get().to(items::fail))
            .route("/panic", web::get().to(items::share_stock)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity;
    use actix_web::body::{MessageBody, to_bytes};
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::web::Bytes;
    use actix_web::{App, Error, test};
    use lumen_core::domain::{FieldValue, LogLevel};
    use lumen_infra::{InMemoryLogSink, NoopSpanReporter};
    use lumen_web::{PANIC_MESSAGE, PanicRecoverer, RequestLogger, SUCCESS_MESSAGE};
    use std::sync::Arc;

    macro_rules! demo_app {
        ($sink:expr) => {
            test::init_service(
                App::new()
                    .wrap_fn(|req, srv| {
                        identity::attach(&req);
                        srv.call(req)
                    })
                    .wrap(RequestLogger::new($sink.clone()))
                    .wrap(PanicRecoverer::new($sink.clone(), Arc::new(NoopSpanReporter)))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn rendered<B: MessageBody>(result: Result<ServiceResponse<B>, Error>) -> (u16, Bytes) {
        match result {
            Ok(res) => {
                let status = res.status().as_u16();
                (status, to_bytes(res.into_body()).await.unwrap_or_default())
            }
            Err(err) => {
                let res = err.error_response();
                let status = res.status().as_u16();
                (status, to_bytes(res.into_body()).await.unwrap_or_default())
            }
        }
    }

    #[actix_web::test]
    async fn test_health_is_logged_at_info() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
                .await;
        assert_eq!(resp.status(), 200);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].message, SUCCESS_MESSAGE);
    }

    #[actix_web::test]
    async fn test_demo_user_header_reaches_the_log() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let user = "7f1c2a4e-9b0d-4c8e-a1f3-5d6e7b8c9a0b";
        let req = test::TestRequest::get()
            .uri("/api/items")
            .insert_header((identity::USER_HEADER, user))
            .insert_header((identity::EMAIL_HEADER, "demo@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["viewer"], "demo@example.com");
        assert_eq!(body["items"].as_array().map(Vec::len), Some(3));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.get("user.id"), Some(&FieldValue::from(user)));
    }

    #[actix_web::test]
    async fn test_malformed_demo_user_is_ignored() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let req = test::TestRequest::get()
            .uri("/api/items")
            .insert_header((identity::USER_HEADER, "not-a-uuid"))
            .to_request();
        test::call_service(&app, req).await;

        assert!(!sink.records()[0].fields.contains_key("user.id"));
    }

    #[actix_web::test]
    async fn test_fail_records_error_and_keeps_response() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/api/fail").to_request()).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "restock feed unavailable");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Error);
        assert_eq!(
            records[0].message,
            "request failed: Error #01: restock feed rejected the request"
        );
    }

    #[actix_web::test]
    async fn test_panic_route_is_contained() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let result =
            test::try_call_service(&app, test::TestRequest::get().uri("/api/panic").to_request())
                .await;
        let (status, body) = rendered(result).await;
        assert_eq!(status, 500);
        assert!(body.is_empty());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, PANIC_MESSAGE);
        let message = records[0]
            .fields
            .get("error.message")
            .and_then(FieldValue::as_str)
            .unwrap();
        assert!(message.contains("divide by zero"));
    }

    #[actix_web::test]
    async fn test_panic_route_with_buyers_succeeds() {
        let sink = Arc::new(InMemoryLogSink::new());
        let app = demo_app!(sink);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/panic?buyers=4").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["per_buyer"], 3);
    }
}
