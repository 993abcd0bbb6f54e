#![allow(dead_code)]

// Shared test fixtures: archive builders and a local HTTP server standing in
// for the distribution host (redirects, error statuses, archive bodies).

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, LOCATION, USER_AGENT};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Files inside the fake interpreter tarball, all under `python/`
pub const TARBALL_FILES: &[(&str, &[u8])] = &[
    ("python/bin/python3", b"#!/bin/sh\necho python\n"),
    ("python/lib/python3.11/os.py", b"# os module\n"),
    ("python/include/python3.11/Python.h", b"/* header */\n"),
];

/// Build a tar.gz with a single top-level `python/` directory
pub fn python_tarball() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder
        .append_data(&mut dir, "python/", std::io::empty())
        .unwrap();

    for (path, data) in TARBALL_FILES {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        builder.append_data(&mut header, path, *data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Build a zip laid out like the Windows embeddable distribution
pub fn python_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in [
        ("python.exe", b"MZ python".as_slice()),
        ("python311.zip", b"PK stdlib".as_slice()),
    ] {
        writer
            .start_file(name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
struct ServerState {
    addr: SocketAddr,
    tarball: Arc<Vec<u8>>,
    zip: Arc<Vec<u8>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local distribution host
///
/// Routes:
/// - `/python.tar.gz`, `/python.zip`: archive bodies
/// - `/redirect`: 302 to `/python.tar.gz` (relative Location)
/// - `/moved`: 301 to the absolute tarball URL
/// - `/chain/{n}`: n redirect hops, then the tarball
/// - `/loop`: 302 to itself
/// - `/no-location`: 302 without Location
/// - `/garbage.tar.gz`: 200 with a body that is not an archive
/// - `/server-error`: 500, anything else: 404
pub struct FixtureServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = ServerState {
            addr,
            tarball: Arc::new(python_tarball()),
            zip: Arc::new(python_zip()),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn redirect(status: StatusCode, location: String) -> Response {
    (status, [(LOCATION, location)]).into_response()
}

async fn handle(State(state): State<ServerState>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });

    if let Some(hops) = path.strip_prefix("/chain/") {
        return match hops.parse::<u32>() {
            Ok(0) => redirect(StatusCode::FOUND, "/python.tar.gz".to_string()),
            Ok(n) => redirect(StatusCode::FOUND, format!("/chain/{}", n - 1)),
            Err(_) => StatusCode::BAD_REQUEST.into_response(),
        };
    }

    match path.as_str() {
        "/python.tar.gz" => (
            StatusCode::OK,
            [(CONTENT_TYPE, "application/gzip")],
            state.tarball.as_ref().clone(),
        )
            .into_response(),
        "/python.zip" => (
            StatusCode::OK,
            [(CONTENT_TYPE, "application/zip")],
            state.zip.as_ref().clone(),
        )
            .into_response(),
        "/redirect" => redirect(StatusCode::FOUND, "/python.tar.gz".to_string()),
        "/moved" => redirect(
            StatusCode::MOVED_PERMANENTLY,
            format!("http://{}/python.tar.gz", state.addr),
        ),
        "/loop" => redirect(StatusCode::FOUND, "/loop".to_string()),
        "/no-location" => StatusCode::FOUND.into_response(),
        "/garbage.tar.gz" => (StatusCode::OK, b"this is not a tarball".to_vec()).into_response(),
        "/server-error" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
