#![allow(dead_code)]

use assert_cmd::Command;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

pub const REPO: &str = "https://github.com/o/r";

/// `codelore` with a clean environment pointed at `base_url`.
#[allow(deprecated)]
pub fn codelore(base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("codelore").expect("binary");
    cmd.env_remove("CODELORE_TIMEOUT_SECS")
        .env_remove("CODELORE_MMDC")
        .env("CODELORE_API_URL", base_url)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn");
    cmd
}

/// Base URL of a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

/// A canned analysis service on a background thread. Routes on the request
/// path; unknown paths get `404`.
pub fn spawn_service(routes: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let request = String::from_utf8_lossy(&buf);
            let target = request.split_whitespace().nth(1).unwrap_or("/");
            let path = target.split('?').next().unwrap_or("/");

            let (status, body) = match routes.iter().find(|(route, _)| *route == path) {
                Some((_, body)) => ("200 OK", body.clone()),
                None => ("404 Not Found", r#"{"detail":"Not Found"}"#.to_string()),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}

pub fn full_service() -> String {
    spawn_service(vec![
        (
            "/",
            r#"{"message":"CodeLore API is running"}"#.to_string(),
        ),
        (
            "/architecture",
            serde_json::json!({
                "repo": REPO,
                "project_summary": "A small web app.",
                "project_details": {"type": "Web Application", "tech_stack": ["React", "FastAPI"]},
                "key_files": {
                    "src/App.tsx": {"role": "Root component", "category": "UI Component"}
                },
                "dependency_graph": {},
                "mermaid_diagram": "",
                "architecture_stats": {
                    "total_files": 3, "frontend_files": 2, "backend_files": 1,
                    "total_imports": 2, "total_exports": 1
                }
            })
            .to_string(),
        ),
        (
            "/file-roles",
            serde_json::json!({
                "repo": REPO,
                "total_files_analyzed": 2,
                "file_roles": {
                    "src/App.tsx": {"role": "Root component", "category": "UI Component", "complexity": "medium",
                                     "key_functions": ["App"], "summary": "App.tsx – Root component"},
                    "api/main.py": {"role": "HTTP entry point", "category": "API Endpoint", "complexity": "high"}
                }
            })
            .to_string(),
        ),
        (
            "/evolution",
            serde_json::json!({
                "repo": REPO,
                "file_evolution": {
                    "src/App.tsx": [
                        {"commit_sha": "bbbbbbbbbbbb", "timestamp": "2024-02-01T10:00:00+00:00", "author": "Bea",
                         "summary": "Tweak layout", "change_type": "modified", "additions": 3, "deletions": 1}
                    ],
                    "README.md": [
                        {"commit_sha": "cccccccccccc", "timestamp": "2024-03-01T10:00:00+00:00", "author": "Cy",
                         "summary": "Docs", "change_type": "added", "additions": 5, "deletions": 0}
                    ]
                }
            })
            .to_string(),
        ),
        (
            "/dependencies",
            serde_json::json!({
                "dependencies": {
                    "src/App.tsx": {
                        "imports": [{"module": "api/main.py", "type": "internal"}],
                        "exports": ["App"],
                        "imported_by": []
                    }
                },
                "mermaid_diagram": "graph TD\n  A --> B"
            })
            .to_string(),
        ),
    ])
}
