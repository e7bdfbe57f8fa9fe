use actix_web::{HttpResponse, Responder};
use common::requests::HealthResponse;

const SERVICE_NAME: &str = "api-gw";

pub async fn process() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
    })
}
