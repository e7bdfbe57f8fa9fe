use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::answer::AnswerView;

/// `GET /api/doc/{doc_id}/answer`: the stored answers, or `{"body": {}}` when
/// none were submitted yet.
pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    if !state.storage.document_exists(&doc_id)? {
        return Err(ApiError::DocumentNotFound);
    }
    let view = state
        .storage
        .latest_answer(&doc_id)?
        .map(AnswerView::from)
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(view))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn empty_body_before_first_submission() {
        let ctx = TestContext::new();
        ctx.seed_document("doc-1");
        let app = test::init_service(ctx.app()).await;

        let request = test::TestRequest::get().uri("/api/doc/doc-1/answer").to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body, json!({"body": {}}));
    }

    #[actix_web::test]
    async fn unknown_document_is_not_found() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        let request = test::TestRequest::get().uri("/api/doc/missing/answer").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
