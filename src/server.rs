//! HTTP transport for the pipeline.
//!
//! One resource, `POST /generate-test-cases` (trailing slash accepted):
//! - `multipart/form-data` with a `file` part (a PDF) and/or an `srs` text part; the
//!   document wins when both are present.
//! - any other body is read as JSON `{"srs": "..."}`.
//!
//! Responses are `{"test_cases": [...]}` on success and `{"error": "..."}` otherwise:
//! 400 for input problems, 500 for internal failures, 405 for any verb but POST.

use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{dev::Server, http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use srs_testgen_core::contract::{PipelineError, SrsInput};
use srs_testgen_core::Pipeline;
use tracing::{debug, error, info, Instrument};

pub const GENERATE_PATHS: [&str; 2] = ["/generate-test-cases", "/generate-test-cases/"];

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
struct SrsRequest {
    #[serde(default)]
    srs: String,
}

/// Registers the service routes; shared by [`build_server`] and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(GENERATE_PATHS)
            .route(web::post().to(generate_test_cases))
            .default_service(web::to(method_not_allowed)),
    );
}

pub fn build_server(state: web::Data<AppState>, host: &str, port: u16) -> std::io::Result<Server> {
    info!(host, port, "Starting HTTP server");
    let server = HttpServer::new(move || {
        // The browser front-end is served from another origin.
        let cors = Cors::permissive();
        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

async fn generate_test_cases(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("generate_test_cases", %request_id);

    async move {
        let input = match read_input(&req, payload, state.max_upload_bytes).await {
            Ok(input) => input,
            Err(e) => return error_response(&e),
        };

        match state.pipeline.generate_test_cases(input).await {
            Ok(cases) => {
                info!(test_cases = cases.len(), "Responding with generated test cases");
                HttpResponse::Ok().json(cases)
            }
            Err(e) => error_response(&e),
        }
    }
    .instrument(span)
    .await
}

async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    debug!(method = %req.method(), path = req.path(), "Rejected request method");
    HttpResponse::MethodNotAllowed().json(ErrorBody {
        error: "Invalid request method".to_string(),
    })
}

fn error_response(err: &PipelineError) -> HttpResponse {
    let body = ErrorBody {
        error: err.to_string(),
    };
    if err.is_client_fault() {
        info!(error = %err, "Rejecting request");
        HttpResponse::BadRequest().json(body)
    } else {
        error!(error = %err, "Request failed");
        HttpResponse::InternalServerError().json(body)
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

async fn read_input(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<SrsInput, PipelineError> {
    if is_multipart(req) {
        read_multipart(Multipart::new(req.headers(), payload), limit).await
    } else {
        let body = read_body(payload, limit).await?;
        let request: SrsRequest = serde_json::from_slice(&body)
            .map_err(|e| PipelineError::Internal(format!("Malformed request body: {e}")))?;
        Ok(SrsInput::PlainText(request.srs))
    }
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, PipelineError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|e| PipelineError::Internal(format!("Failed to read request body: {e}")))?;
        if body.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_multipart(mut multipart: Multipart, limit: usize) -> Result<SrsInput, PipelineError> {
    let mut document: Option<(String, Vec<u8>)> = None;
    let mut text: Option<String> = None;
    let mut received = 0usize;

    while let Some(field) = multipart.next().await {
        let mut field = field
            .map_err(|e| PipelineError::Internal(format!("Malformed multipart body: {e}")))?;
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| PipelineError::Internal(format!("Malformed multipart body: {e}")))?;
            received += chunk.len();
            if received > limit {
                return Err(too_large(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => {
                let filename = filename.unwrap_or_default();
                info!(filename = %filename, size = data.len(), "Received uploaded document");
                document = Some((filename, data));
            }
            "srs" => text = Some(String::from_utf8_lossy(&data).into_owned()),
            other => debug!(field = other, "Ignoring multipart field"),
        }
    }

    Ok(match (document, text) {
        (Some((filename, bytes)), _) => SrsInput::Document { filename, bytes },
        (None, Some(text)) => SrsInput::PlainText(text),
        (None, None) => SrsInput::PlainText(String::new()),
    })
}

fn too_large(limit: usize) -> PipelineError {
    PipelineError::Internal(format!("Request body exceeds the {limit} byte limit"))
}
