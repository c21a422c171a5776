use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use spectro_backend::services::knowledge::{Lesson, MediaRef};

pub fn lesson(name: &str, week_num: u32, summary: &str, terms: &[&str]) -> Lesson {
    Lesson {
        lesson_id: name.to_lowercase().replace(' ', "-"),
        lesson_name: name.to_string(),
        week: format!("Week {week_num}"),
        week_num,
        summary: summary.to_string(),
        key_terms: terms.iter().map(|t| t.to_string()).collect(),
        slide_count: 10,
        videos: vec![],
        documents: vec![],
    }
}

pub fn lesson_with_video(name: &str, week_num: u32, summary: &str) -> Lesson {
    let mut l = lesson(name, week_num, summary, &[]);
    l.videos = vec![MediaRef {
        filename: "intro.mp4".to_string(),
        cdn_url: "https://cdn.example.com/intro.mp4".to_string(),
    }];
    l
}

pub fn sample_lessons() -> Vec<Lesson> {
    vec![
        lesson(
            "Light and Molecular Absorption",
            1,
            "Near-infrared light excites overtone and combination vibrations.",
            &["wavelength", "absorption"],
        ),
        lesson(
            "Detector and Spectrometer Hardware",
            2,
            "Instrument choice drives signal-to-noise ratio.",
            &["instrument", "detector"],
        ),
        lesson_with_video(
            "Calibration Model Development",
            3,
            "Calibration links spectra to reference values using PLS regression.",
        ),
    ]
}

/// Minimal HTTP/1.1 stub standing in for the provider. Reads one full request,
/// then answers with the canned status and body. `hits` counts accepted
/// connections so tests can assert "no outbound call happened".
pub async fn spawn_provider_stub(
    status: u16,
    body: &str,
    hits: Arc<AtomicUsize>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            hits.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            tokio::spawn(async move {
                read_full_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A provider that accepts connections but never answers. Used to exercise the
/// client-side timeout.
pub async fn spawn_stalled_provider_stub(hits: Arc<AtomicUsize>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            hits.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                // Hold the connection open without ever responding.
                let _socket = socket;
                tokio::time::sleep(Duration::from_secs(3600)).await;
            });
        }
    });

    addr
}

pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

async fn read_full_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 4096];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_headers_end(&buf) {
                    let content_length = parse_content_length(&buf[..pos]);
                    if buf.len() >= pos + 4 + content_length {
                        break;
                    }
                }
            }
        }
    }
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_content_length(headers: &[u8]) -> usize {
    String::from_utf8_lossy(headers)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}
