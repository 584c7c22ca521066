//! Inventory endpoints used to exercise the request middlewares.

use actix_web::{HttpRequest, HttpResponse, web};
use lumen_web::RequestContextExt;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct Item {
    pub id: u32,
    pub name: &'static str,
    pub stock: u32,
}

const ITEMS: [Item; 3] = [
    Item { id: 1, name: "anvil", stock: 12 },
    Item { id: 2, name: "bellows", stock: 3 },
    Item { id: 3, name: "crucible", stock: 0 },
];

#[derive(Serialize)]
pub struct ItemsResponse {
    /// Email of the demo user, when one is attached to the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    pub items: &'static [Item],
}

/// GET /api/items
pub async fn list_items(req: HttpRequest) -> HttpResponse {
    let viewer = match req.identity() {
        Ok(claims) => claims.map(|c| c.email),
        Err(e) => {
            req.record_error(e);
            None
        }
    };
    HttpResponse::Ok().json(ItemsResponse {
        viewer,
        items: &ITEMS,
    })
}

/// Records a non-fatal failure and answers `400`.
///
/// GET /api/fail
pub async fn fail(req: HttpRequest) -> HttpResponse {
    req.record_error("restock feed rejected the request");
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": "restock feed unavailable"
    }))
}

#[derive(Deserialize)]
pub struct ShareQuery {
    #[serde(default)]
    pub buyers: u32,
}

/// Splits the first item's stock between `buyers`; panics when there are none.
///
/// GET /api/panic
pub async fn share_stock(query: web::Query<ShareQuery>) -> HttpResponse {
    let per_buyer = ITEMS[0].stock / query.buyers;
    HttpResponse::Ok().json(serde_json::json!({ "per_buyer": per_buyer }))
}
