//! In-process fixtures for handler tests: a scripted document service, a
//! temporary storage and the fully routed application.

use crate::doc_service::{DocServiceError, DocumentProcessor, GeneratedSchema, RenderedDocument};
use crate::mapping::Mapping;
use crate::services;
use crate::state::AppState;
use crate::storage::Storage;
use actix_web::{web, App};
use async_trait::async_trait;
use chrono::Utc;
use common::model::document::{Document, ParseResult, ParsedPlaceholder};
use common::model::schema::{Field, FieldType, Group, Schema};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const MULTIPART_BOUNDARY: &str = "----fluidfill-test-boundary";

/// Bytes standing in for a `.docx` archive.
pub const TEMPLATE_BYTES: &[u8] = b"PK\x03\x04 safe template";

pub const FILLED_BYTES: &[u8] = b"PK\x03\x04 filled template";

fn placeholder(key: &str, label: &str, tokens: &[&str]) -> ParsedPlaceholder {
    ParsedPlaceholder {
        key: key.into(),
        label: label.into(),
        occurrences: Some(1),
        example_context: None,
        tokens: tokens.iter().map(|t| t.to_string()).collect(),
    }
}

fn text_field(key: &str, label: &str) -> Field {
    Field {
        key: key.into(),
        label: label.into(),
        field_type: FieldType::Text,
        required: true,
        help: None,
        repeat_group: None,
        targets: Vec::new(),
    }
}

/// Scripted [`DocumentProcessor`] counting every call it receives.
pub struct FakeDocService {
    pub placeholders: Vec<ParsedPlaceholder>,
    pub schema: Schema,
    pub fail_parse: bool,
    pub fail_html: bool,
    pub fail_render: bool,
    pub parse_calls: AtomicUsize,
    pub html_calls: AtomicUsize,
    pub schema_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
    pub last_mapping: Mutex<Option<Vec<(String, String)>>>,
}

impl Default for FakeDocService {
    /// A SAFE-like template with a bracketed company name and a blank-line date.
    fn default() -> Self {
        Self {
            placeholders: vec![
                placeholder("company_name", "Company Name", &["[COMPANY NAME]"]),
                placeholder("date", "Date", &["DATE____"]),
            ],
            schema: Schema {
                groups: vec![Group {
                    id: "main".into(),
                    title: "Agreement".into(),
                    description: None,
                    fields: vec![
                        text_field("company_name", "Company Name"),
                        text_field("date", "Date"),
                    ],
                }],
            },
            fail_parse: false,
            fail_html: false,
            fail_render: false,
            parse_calls: AtomicUsize::new(0),
            html_calls: AtomicUsize::new(0),
            schema_calls: AtomicUsize::new(0),
            render_calls: AtomicUsize::new(0),
            last_mapping: Mutex::new(None),
        }
    }
}

impl FakeDocService {
    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn parse_result(&self, filename: &str) -> ParseResult {
        ParseResult {
            document_id: filename.into(),
            placeholders: self.placeholders.clone(),
        }
    }
}

fn server_error(detail: &str) -> DocServiceError {
    DocServiceError::Status {
        status: 500,
        detail: detail.into(),
    }
}

#[async_trait]
impl DocumentProcessor for FakeDocService {
    async fn parse(&self, filename: &str, _bytes: &[u8]) -> Result<ParseResult, DocServiceError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_parse {
            return Err(server_error("parser crashed"));
        }
        Ok(self.parse_result(filename))
    }

    async fn to_html(&self, filename: &str, _bytes: &[u8]) -> Result<String, DocServiceError> {
        self.html_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_html {
            return Err(DocServiceError::Unreachable("connection refused".into()));
        }
        Ok(format!("<p>{filename}</p>"))
    }

    async fn generate_schema(
        &self,
        _placeholders: &[ParsedPlaceholder],
    ) -> Result<GeneratedSchema, DocServiceError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedSchema {
            model_name: Some("test-model".into()),
            schema: self.schema.clone(),
        })
    }

    async fn render(
        &self,
        filename: &str,
        _bytes: &[u8],
        mapping: &Mapping,
    ) -> Result<RenderedDocument, DocServiceError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_mapping.lock() {
            *last = Some(
                mapping
                    .iter()
                    .map(|(token, value)| (token.to_string(), value.to_string()))
                    .collect(),
            );
        }
        if self.fail_render {
            return Err(server_error("docx corrupted"));
        }
        let stem = filename.trim_end_matches(".docx");
        Ok(RenderedDocument {
            bytes: FILLED_BYTES.to_vec(),
            filename: format!("{stem}_filled.docx"),
        })
    }
}

/// Application state over a temporary directory that lives as long as the context.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
    pub fake: Arc<FakeDocService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_fake(FakeDocService::default())
    }

    pub fn with_fake(fake: FakeDocService) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage =
            Storage::open(dir.path().join("gateway.sqlite"), dir.path().join("blobs")).unwrap();
        let fake = Arc::new(fake);
        let doc_service: Arc<dyn DocumentProcessor> = fake.clone();
        let state = AppState {
            storage,
            doc_service,
            max_upload_bytes: 1024,
        };
        Self { dir, state, fake }
    }

    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(services::json_config(64 * 1024))
            .app_data(web::Data::new(self.state.clone()))
            .service(services::configure_routes())
    }

    /// Stores an already parsed document with its blob and returns it.
    pub fn seed_document(&self, id: &str) -> Document {
        let location = self
            .state
            .storage
            .blobs()
            .write(id, "0123456789abcdef", TEMPLATE_BYTES)
            .unwrap();
        let document = Document {
            id: id.into(),
            filename: "safe.docx".into(),
            storage_url: location,
            mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
            size_bytes: TEMPLATE_BYTES.len() as u64,
            blob_url: None,
            parse_result: Some(self.fake.parse_result("safe.docx")),
            preview_html: None,
            created_at: Utc::now(),
        };
        self.state.storage.insert_document(&document).unwrap();
        document
    }

    /// Number of files currently in the blob directory.
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("blobs")).unwrap().count()
    }
}

/// A `multipart/form-data` body with a single part, plus its content type.
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
}
