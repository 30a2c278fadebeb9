//! Upload form front end: four images and two text fields in, one collage out.

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::collage::{CollageError, CollageRequest, IMAGE_COUNT, generate_collage};
use crate::config::WebConfig;

pub const WRONG_COUNT_MESSAGE: &str = "You must upload exactly 4 images.";

#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Bytes,
}

#[derive(Debug, Default)]
struct UploadForm {
    images: Vec<Upload>,
    sat_model: String,
    orbit: String,
}

pub fn router(config: WebConfig) -> Router {
    let result_files = ServeDir::new(&config.result_dir);
    let body_limit = config.body_limit;

    Router::new()
        .route("/", get(index))
        .route("/upload", get(upload_form).post(upload))
        .route("/result", get(result))
        .nest_service("/results", result_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

/// Creates the staging folders and serves until the listener fails.
pub async fn serve(config: WebConfig) -> io::Result<()> {
    config.ensure_dirs()?;
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("serving http://{}/", listener.local_addr()?);
    axum::serve(listener, router(config)).await
}

async fn index() -> Html<String> {
    page(
        "Satellite collage",
        r#"<p>Combine one quadrant from each of four satellite images into a single collage.</p>
<p><a href="/upload">Upload images</a></p>"#,
    )
}

async fn upload_form() -> Html<String> {
    page(
        "Upload images",
        r#"<form action="/upload" method="post" enctype="multipart/form-data">
  <p><label>Satellite model <input type="text" name="sat_model"></label></p>
  <p><label>Orbit type <input type="text" name="orbit" placeholder="polar, geostationary"></label></p>
  <p><label>Images (exactly 4) <input type="file" name="images" accept=".jpg,.jpeg,.png,.tif,.tiff" multiple></label></p>
  <p><button type="submit">Create collage</button></p>
</form>"#,
    )
}

async fn result(State(config): State<Arc<WebConfig>>) -> Html<String> {
    let body = format!(
        r#"<img src="{}" alt="collage" style="max-width: 100%">
<p><a href="/upload">Create another</a></p>"#,
        config.result_url()
    );
    page("Collage", &body)
}

async fn upload(State(config): State<Arc<WebConfig>>, mut multipart: Multipart) -> Response {
    let form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => {
            warn!(status = %err.status(), "unreadable upload: {err}");
            return (err.status(), err.body_text()).into_response();
        }
    };

    if form.images.len() != IMAGE_COUNT {
        warn!(count = form.images.len(), "rejected upload");
        return (StatusCode::BAD_REQUEST, WRONG_COUNT_MESSAGE).into_response();
    }

    let outcome = tokio::task::spawn_blocking(move || store_and_generate(&config, form)).await;
    match outcome {
        Ok(Ok(path)) => {
            info!(output = %path.display(), "upload processed");
            Redirect::to("/result").into_response()
        }
        Ok(Err(err)) => processing_error(err),
        Err(err) => processing_error(err),
    }
}

fn processing_error(err: impl std::fmt::Display) -> Response {
    error!("processing failed: {err}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Processing error: {err}")).into_response()
}

/// Collects `images` file parts and the two text fields. File inputs left
/// empty by the browser arrive as nameless, empty parts and are skipped.
async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("images") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.images.push(Upload { file_name, bytes });
            }
            Some("sat_model") => form.sat_model = field.text().await?,
            Some("orbit") => form.orbit = field.text().await?,
            _ => {}
        }
    }

    Ok(form)
}

fn store_and_generate(config: &WebConfig, form: UploadForm) -> Result<PathBuf, CollageError> {
    let mut paths = Vec::with_capacity(form.images.len());
    for (index, upload) in form.images.iter().enumerate() {
        let path = config
            .upload_dir
            .join(format!("{index}_{}", secure_filename(&upload.file_name)));
        fs::write(&path, &upload.bytes)?;
        paths.push(path);
    }

    let request = CollageRequest::new(paths, form.sat_model, form.orbit);
    generate_collage(&request, &config.collage, &config.result_path())
}

/// Reduces a client-supplied file name to something safe to join onto the
/// staging folder: last path component only, ASCII `[A-Za-z0-9._-]`,
/// whitespace runs turned into `_`. The extension survives even when nothing
/// of the stem does.
pub fn secure_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, extension) = match last.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, extension),
        _ => (last, ""),
    };

    let stem = sanitize_stem(stem);
    let stem = if stem.is_empty() { "upload" } else { stem.as_str() };
    let extension: String = extension.chars().filter(char::is_ascii_alphanumeric).collect();
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut pending_gap = false;
    for ch in stem.chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')) {
            continue;
        }
        if pending_gap && !out.is_empty() {
            out.push('_');
        }
        pending_gap = false;
        out.push(ch);
    }
    out.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>"#
    ))
}
