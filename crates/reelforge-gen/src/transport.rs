//! Transport seam between the generation client and the network
//!
//! `HttpTransport` is the real thing (ureq with a global timeout).
//! `MockTransport` fabricates provider responses and placeholder media
//! bytes offline; tests and `--dry-run` batches go through it.

use reelforge_core::{ReelError, Result};
use std::sync::Mutex;
use std::time::Duration;

/// Blocking HTTP operations the generation client needs
pub trait Transport: Send {
    /// POST a JSON payload, return the parsed JSON response
    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<serde_json::Value>;

    /// GET raw bytes (asset download)
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Real HTTP transport backed by ureq
pub struct HttpTransport {
    api_key: String,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(api_key: &str, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.to_string(),
            timeout_secs,
        }
    }

    fn build_agent(&self) -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(self.timeout_secs)))
            .build();
        config.into()
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let agent = self.build_agent();
        let response = agent
            .post(url)
            .header("Authorization", &format!("Key {}", self.api_key))
            .header("Content-Type", "application/json")
            .send_json(payload);

        match response {
            Ok(mut ok) => ok.body_mut().read_json().map_err(|e| {
                ReelError::ResponseUnparseable(format!("Failed to parse response body: {}", e))
            }),
            Err(e) => Err(ReelError::RequestFailed(format!(
                "POST {} failed: {}",
                url, e
            ))),
        }
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let agent = self.build_agent();
        let response = agent.get(url).call();

        match response {
            Ok(ok) => {
                let mut reader = ok.into_body().into_reader();
                let mut bytes = Vec::new();
                std::io::Read::read_to_end(&mut reader, &mut bytes).map_err(|e| {
                    ReelError::RequestFailed(format!("Failed to read download body: {}", e))
                })?;
                Ok(bytes)
            }
            Err(e) => Err(ReelError::RequestFailed(format!(
                "GET {} failed: {}",
                url, e
            ))),
        }
    }
}

/// Offline transport that fabricates responses in the provider's shape.
///
/// The fabricated result URL extension is inferred from the payload shape
/// (image_size -> png, aspect_ratio -> mp4, duration_seconds -> mp3), and
/// `get_bytes` produces real placeholder media for it so downstream
/// normalization can run for real.
#[derive(Default)]
pub struct MockTransport {
    /// Models whose submissions should fail with a provider error
    fail_models: Vec<String>,
    /// Models whose responses should come back in an unexpected shape
    malformed_models: Vec<String>,
    submissions: Mutex<u64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make submissions for the given model fail
    pub fn fail_model(mut self, model: &str) -> Self {
        self.fail_models.push(model.to_string());
        self
    }

    /// Make responses for the given model come back without a result URL
    pub fn malform_model(mut self, model: &str) -> Self {
        self.malformed_models.push(model.to_string());
        self
    }

    /// Number of POST submissions seen so far
    pub fn submission_count(&self) -> u64 {
        *self.submissions.lock().unwrap()
    }

    fn model_from_url(url: &str) -> &str {
        // Endpoint is "<base>/<model-id>"; the model id itself contains slashes,
        // so strip the scheme and host only.
        url.splitn(4, '/').nth(3).unwrap_or(url)
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let n = {
            let mut count = self.submissions.lock().unwrap();
            *count += 1;
            *count
        };

        let model = Self::model_from_url(url);
        if self.fail_models.iter().any(|m| m == model) {
            return Err(ReelError::RequestFailed(format!(
                "mock provider error for {}",
                model
            )));
        }
        if self.malformed_models.iter().any(|m| m == model) {
            return Ok(serde_json::json!({ "detail": "unexpected response shape" }));
        }

        if payload.get("image_size").is_some() {
            Ok(serde_json::json!({
                "images": [{
                    "url": format!("https://mock.local/results/{}.png", n),
                    "content_type": "image/png"
                }],
                "seed": payload.get("seed").cloned().unwrap_or(serde_json::json!(0))
            }))
        } else if payload.get("aspect_ratio").is_some() {
            Ok(serde_json::json!({
                "video": { "url": format!("https://mock.local/results/{}.mp4", n) }
            }))
        } else if payload.get("duration_seconds").is_some() {
            Ok(serde_json::json!({
                "audio": { "url": format!("https://mock.local/results/{}.mp3", n) }
            }))
        } else {
            Ok(serde_json::json!({ "detail": "unrecognized payload" }))
        }
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if url.ends_with(".png") {
            placeholder_png(64, 64)
        } else if url.ends_with(".svg") {
            Ok(PLACEHOLDER_SVG.as_bytes().to_vec())
        } else {
            // Opaque placeholder bytes for video/audio containers
            Ok(vec![0u8; 256])
        }
    }
}

/// Encode a solid-color opaque PNG in memory
fn placeholder_png(width: u32, height: u32) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.extend_from_slice(&[96, 128, 160, 255]);
    }
    let img = image::RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        ReelError::ConversionFailed("Failed to build placeholder image buffer".to_string())
    })?;

    let mut bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| ReelError::ConversionFailed(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64"><rect width="64" height="64" fill="#6080a0"/></svg>"##;
