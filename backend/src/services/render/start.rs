//! # Document Render Service
//!
//! Backs `POST /api/doc/{doc_id}/render`.
//!
//! ## Workflow
//!
//! 1.  **Prerequisites**: the document must exist and already have a schema
//!     and an answer set. Missing ones are reported together as `incomplete`.
//! 2.  **Bytes**: the template is read back from the blob store.
//! 3.  **Mapping**: schema, answers and placeholder metadata are resolved into
//!     the token → value mapping.
//! 4.  **Render**: the document service substitutes the mapping once; the
//!     filled bytes are returned as an attachment under the filename it chose.

use crate::doc_service::{DocServiceError, RenderedDocument};
use crate::error::{ApiError, Prerequisite};
use crate::mapping::{resolve_mapping, PlaceholderIndex};
use crate::state::AppState;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse};
use common::model::answer::StoredAnswer;
use common::model::document::Document;
use common::model::schema::StoredSchema;
use log::{info, warn};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let rendered = render_document(&state, &doc_id).await?;
    Ok(HttpResponse::Ok()
        .content_type(DOCX_MIME)
        .insert_header(ContentDisposition::attachment(rendered.filename))
        .body(rendered.bytes))
}

/// Everything a render needs, loaded before the document service is called.
struct RenderInputs {
    document: Document,
    schema: StoredSchema,
    answers: StoredAnswer,
}

fn load_inputs(state: &AppState, doc_id: &str) -> Result<RenderInputs, ApiError> {
    let document = state
        .storage
        .get_document(doc_id)?
        .ok_or(ApiError::DocumentNotFound)?;

    match (
        state.storage.latest_schema(doc_id)?,
        state.storage.latest_answer(doc_id)?,
    ) {
        (Some(schema), Some(answers)) => Ok(RenderInputs {
            document,
            schema,
            answers,
        }),
        (schema, answers) => {
            let mut needs = Vec::new();
            if schema.is_none() {
                needs.push(Prerequisite::Schema);
            }
            if answers.is_none() {
                needs.push(Prerequisite::Answers);
            }
            Err(ApiError::Incomplete(needs))
        }
    }
}

/// `<stem>_filled.docx` for a template filename.
fn filled_filename(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename);
    format!("{}_filled.docx", stem)
}

fn render_error(err: DocServiceError) -> ApiError {
    match err {
        DocServiceError::Unreachable(_) => ApiError::DocService(err),
        other => ApiError::RenderFailed(other.detail().unwrap_or_else(|| other.to_string())),
    }
}

async fn render_document(state: &AppState, doc_id: &str) -> Result<RenderedDocument, ApiError> {
    let RenderInputs {
        document,
        schema,
        answers,
    } = load_inputs(state, doc_id)?;

    let bytes = state
        .storage
        .blobs()
        .read(&document.storage_url)?
        .ok_or(ApiError::DocBytesMissing)?;

    let placeholders = state.storage.list_placeholders(doc_id)?;
    let index = PlaceholderIndex::new(document.parse_result.as_ref(), &placeholders);
    let mapping = resolve_mapping(&schema.schema, &answers.body, &index);
    if mapping.is_empty() {
        warn!("no tokens resolved for document {}, rendering it unchanged", doc_id);
    }

    let mut rendered = state
        .doc_service
        .render(&document.filename, &bytes, &mapping)
        .await
        .map_err(render_error)?;
    if rendered.filename.trim().is_empty() {
        rendered.filename = filled_filename(&document.filename);
    }

    info!(
        "rendered document {} with {} tokens as {}",
        doc_id,
        mapping.len(),
        rendered.filename
    );
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        multipart_body, FakeDocService, TestContext, FILLED_BYTES, TEMPLATE_BYTES,
    };
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use common::model::answer::AnswerBody;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn answers(pairs: &[(&str, &str)]) -> AnswerBody {
        pairs.iter().copied().collect()
    }

    fn render_request(doc_id: &str) -> test::TestRequest {
        test::TestRequest::post().uri(&format!("/api/doc/{doc_id}/render"))
    }

    #[rstest]
    #[case("safe.docx", "safe_filled.docx")]
    #[case("Series.A.docx", "Series.A_filled.docx")]
    #[case("README", "README_filled.docx")]
    #[::core::prelude::v1::test]
    fn filled_filename_keeps_the_stem(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(filled_filename(filename), expected);
    }

    #[actix_web::test]
    async fn reports_missing_prerequisites_in_order() {
        let ctx = TestContext::new();
        ctx.seed_document("doc-1");
        let app = test::init_service(ctx.app()).await;

        let response = test::call_service(&app, render_request("doc-1").to_request()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "incomplete", "needs": ["schema", "answers"]}));

        ctx.state
            .storage
            .insert_schema_if_absent("doc-1", None, &ctx.fake.schema)
            .unwrap();
        let response = test::call_service(&app, render_request("doc-1").to_request()).await;
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "incomplete", "needs": ["answers"]}));
        assert_eq!(FakeDocService::calls(&ctx.fake.render_calls), 0);
    }

    #[actix_web::test]
    async fn unknown_document_is_not_found() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        let response = test::call_service(&app, render_request("missing").to_request()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn renders_filled_document_as_attachment() {
        let ctx = TestContext::new();
        ctx.seed_document("doc-1");
        ctx.state
            .storage
            .insert_schema_if_absent("doc-1", None, &ctx.fake.schema)
            .unwrap();
        ctx.state
            .storage
            .upsert_answer(
                "doc-1",
                &answers(&[("company_name", "Acme"), ("date", "2024-01-01")]),
                None,
            )
            .unwrap();
        let app = test::init_service(ctx.app()).await;

        let response = test::call_service(&app, render_request("doc-1").to_request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), DOCX_MIME);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("safe_filled.docx"));
        assert_eq!(test::read_body(response).await.as_ref(), FILLED_BYTES);

        let sent = ctx.fake.last_mapping.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent,
            vec![
                ("[COMPANY NAME]".to_string(), "Acme".to_string()),
                ("DATE____".to_string(), "2024-01-01".to_string()),
            ]
        );
        assert_eq!(FakeDocService::calls(&ctx.fake.render_calls), 1);
    }

    #[actix_web::test]
    async fn collaborator_failure_is_render_failed() {
        let ctx = TestContext::with_fake(FakeDocService {
            fail_render: true,
            ..FakeDocService::default()
        });
        ctx.seed_document("doc-1");
        ctx.state
            .storage
            .insert_schema_if_absent("doc-1", None, &ctx.fake.schema)
            .unwrap();
        ctx.state
            .storage
            .upsert_answer("doc-1", &answers(&[("company_name", "Acme")]), None)
            .unwrap();
        let app = test::init_service(ctx.app()).await;

        let response = test::call_service(&app, render_request("doc-1").to_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "render_failed", "detail": "docx corrupted"}));
        assert_eq!(FakeDocService::calls(&ctx.fake.render_calls), 1);
    }

    #[actix_web::test]
    async fn missing_bytes_are_reported() {
        let ctx = TestContext::new();
        let document = ctx.seed_document("doc-1");
        ctx.state
            .storage
            .insert_schema_if_absent("doc-1", None, &ctx.fake.schema)
            .unwrap();
        ctx.state
            .storage
            .upsert_answer("doc-1", &answers(&[("date", "2024-01-01")]), None)
            .unwrap();
        ctx.state.storage.blobs().remove(&document.storage_url).unwrap();
        let app = test::init_service(ctx.app()).await;

        let response = test::call_service(&app, render_request("doc-1").to_request()).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "doc_bytes_missing"}));
    }

    #[actix_web::test]
    async fn upload_schema_answer_render_pipeline() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        let (content_type, payload) = multipart_body("file", "safe.docx", TEMPLATE_BYTES);
        let request = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(payload)
            .to_request();
        let uploaded: Value = test::call_and_read_body_json(&app, request).await;
        let doc_id = uploaded["documentId"].as_str().unwrap().to_string();

        let response = test::call_service(&app, render_request(&doc_id).to_request()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["needs"], json!(["schema", "answers"]));

        let request = test::TestRequest::post()
            .uri(&format!("/api/doc/{doc_id}/schema"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = test::call_service(&app, render_request(&doc_id).to_request()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["needs"], json!(["answers"]));

        let request = test::TestRequest::post()
            .uri(&format!("/api/doc/{doc_id}/answer"))
            .set_json(json!({"body": {"company_name": "Acme", "date": "2024-01-01"}}))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = test::call_service(&app, render_request(&doc_id).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await.as_ref(), FILLED_BYTES);

        let sent = ctx.fake.last_mapping.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent,
            vec![
                ("[COMPANY NAME]".to_string(), "Acme".to_string()),
                ("DATE____".to_string(), "2024-01-01".to_string()),
            ]
        );
        assert_eq!(FakeDocService::calls(&ctx.fake.schema_calls), 1);
        assert_eq!(FakeDocService::calls(&ctx.fake.render_calls), 1);
    }
}
