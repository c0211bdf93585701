//! Record/replay of provider HTTP traffic so model-backed tests can run offline.
//!
//! # Environment Variables
//!
//! - `TRIAGE_VCR_MODE`: `record` (live calls, saved to disk), `replay` (cassettes only),
//!   anything else or unset: off
//! - `TRIAGE_VCR_DIR`: cassette directory (default: `tests/fixtures/cassettes`)
//!
//! Requests match on method + URL + canonicalized JSON body. The Authorization header is
//! never part of the match and never written to a cassette.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const MODE_ENV: &str = "TRIAGE_VCR_MODE";
pub const DIR_ENV: &str = "TRIAGE_VCR_DIR";
const DEFAULT_DIR: &str = "tests/fixtures/cassettes";
const CASSETTE_SUBDIR: &str = "chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcrMode {
    /// Serve from cassettes; unknown requests fail
    Replay,
    /// Make real requests and save them
    Record,
    /// Live network, nothing recorded
    #[default]
    Off,
}

impl VcrMode {
    pub fn from_env() -> Self {
        match env::var(MODE_ENV)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "record" => VcrMode::Record,
            "replay" => VcrMode::Replay,
            _ => VcrMode::Off,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CassetteEntry {
    pub method: String,
    pub url: String,
    pub request_body: Option<serde_json::Value>,
    pub status: u16,
    pub response_body: serde_json::Value,
    pub fingerprint: String,
}

pub struct VcrClient {
    mode: VcrMode,
    cassette_dir: PathBuf,
    cache: HashMap<String, CassetteEntry>,
    inner: reqwest::Client,
}

impl VcrClient {
    pub fn from_env() -> Self {
        let cassette_dir = env::var(DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DIR));
        Self::new(VcrMode::from_env(), cassette_dir)
    }

    pub fn new(mode: VcrMode, cassette_dir: PathBuf) -> Self {
        let mut client = Self {
            mode,
            cassette_dir,
            cache: HashMap::new(),
            inner: reqwest::Client::new(),
        };
        if mode == VcrMode::Replay {
            client.load_cassettes();
        }
        client
    }

    pub fn fingerprint(method: &str, url: &str, body: Option<&serde_json::Value>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");
        if let Some(b) = body {
            let canonical = serde_jcs::to_string(b).unwrap_or_else(|_| b.to_string());
            hasher.update(canonical.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn load_cassettes(&mut self) {
        let root = self.cassette_dir.clone();
        if !root.exists() {
            tracing::debug!(dir = %root.display(), "VCR: cassette dir missing, nothing to replay");
            return;
        }
        self.load_cassettes_from_dir(&root.join(CASSETTE_SUBDIR));
        self.load_cassettes_from_dir(&root);
        tracing::debug!(count = self.cache.len(), "VCR: cassettes loaded");
    }

    fn load_cassettes_from_dir(&mut self, dir: &Path) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match fs::read_to_string(&path)
                    .map_err(anyhow::Error::from)
                    .and_then(|s| Ok(serde_json::from_str::<CassetteEntry>(&s)?))
                {
                    Ok(cassette) => {
                        self.cache.insert(cassette.fingerprint.clone(), cassette);
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            "VCR: skipping unreadable cassette: {}",
                            e
                        )
                    }
                }
            }
        }
    }

    fn save_cassette(&self, entry: &CassetteEntry) -> anyhow::Result<PathBuf> {
        let dir = self.cassette_dir.join(CASSETTE_SUBDIR);
        fs::create_dir_all(&dir)?;
        let prefix = &entry.fingerprint[..entry.fingerprint.len().min(16)];
        let path = dir.join(format!("{}.json", prefix));
        fs::write(&path, serde_json::to_string_pretty(entry)?)?;
        Ok(path)
    }

    pub async fn post_json(
        &mut self,
        url: &str,
        body: &serde_json::Value,
        auth_header: Option<&str>,
    ) -> anyhow::Result<VcrResponse> {
        let fingerprint = Self::fingerprint("POST", url, Some(body));

        if self.mode == VcrMode::Replay {
            return match self.cache.get(&fingerprint) {
                Some(entry) => Ok(VcrResponse {
                    status: entry.status,
                    body: entry.response_body.clone(),
                }),
                None => anyhow::bail!(
                    "VCR replay: no cassette found for POST {} (fingerprint: {}). \
                     Run with {}=record to record responses.",
                    url,
                    &fingerprint[..16],
                    MODE_ENV
                ),
            };
        }

        crate::providers::network::check_outbound(url)?;
        let mut req = self.inner.post(url).json(body);
        if let Some(auth) = auth_header {
            req = req.header("Authorization", auth);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let raw = resp.text().await?;
        let response_body = decode_body(status, raw)?;

        if self.mode == VcrMode::Record {
            let entry = CassetteEntry {
                method: "POST".to_string(),
                url: url.to_string(),
                request_body: Some(body.clone()),
                status,
                response_body: response_body.clone(),
                fingerprint: fingerprint.clone(),
            };
            match self.save_cassette(&entry) {
                Ok(path) => tracing::debug!(path = %path.display(), "VCR: cassette saved"),
                Err(e) => tracing::warn!("VCR: failed to save cassette: {}", e),
            }
            self.cache.insert(fingerprint, entry);
        }

        Ok(VcrResponse {
            status,
            body: response_body,
        })
    }

    pub fn cassette_count(&self) -> usize {
        self.cache.len()
    }
}

/// Error responses keep non-JSON bodies (proxy HTML, plain text) as a string so the
/// caller can still report the status.
fn decode_body(status: u16, raw: String) -> anyhow::Result<serde_json::Value> {
    match serde_json::from_str(&raw) {
        Ok(v) => Ok(v),
        Err(_) if !(200..300).contains(&status) => Ok(serde_json::Value::String(raw)),
        Err(e) => anyhow::bail!("response (status {}) is not JSON: {}", status, e),
    }
}

#[derive(Debug)]
pub struct VcrResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl VcrResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::TempDir;

    const URL: &str = "https://api.openai.com/v1/chat/completions";

    #[test]
    fn fingerprint_ignores_key_order() {
        let a = json!({"model": "gpt-4o", "temperature": 0.0});
        let b = json!({"temperature": 0.0, "model": "gpt-4o"});
        assert_eq!(
            VcrClient::fingerprint("POST", URL, Some(&a)),
            VcrClient::fingerprint("POST", URL, Some(&b))
        );

        let c = json!({"model": "gpt-4o-mini", "temperature": 0.0});
        assert_ne!(
            VcrClient::fingerprint("POST", URL, Some(&a)),
            VcrClient::fingerprint("POST", URL, Some(&c))
        );
    }

    #[test]
    fn error_bodies_survive_decoding() {
        let body = decode_body(502, "<html>Bad Gateway</html>".to_string()).unwrap();
        assert_eq!(body, json!("<html>Bad Gateway</html>"));
        let resp = VcrResponse { status: 502, body };
        assert!(!resp.is_success());

        let ok = decode_body(200, r#"{"id": "x"}"#.to_string()).unwrap();
        assert_eq!(ok["id"], "x");

        let err = decode_body(200, "not json".to_string()).unwrap_err();
        assert!(err.to_string().contains("status 200"));
    }

    #[test]
    #[serial(vcr_env)]
    fn mode_from_env_defaults_to_off() {
        env::remove_var(MODE_ENV);
        assert_eq!(VcrMode::from_env(), VcrMode::Off);

        env::set_var(MODE_ENV, "record");
        assert_eq!(VcrMode::from_env(), VcrMode::Record);

        env::set_var(MODE_ENV, "REPLAY");
        assert_eq!(VcrMode::from_env(), VcrMode::Replay);

        env::set_var(MODE_ENV, "live");
        assert_eq!(VcrMode::from_env(), VcrMode::Off);

        env::remove_var(MODE_ENV);
    }

    #[tokio::test]
    async fn replay_serves_saved_cassette_and_rejects_unknown() {
        let tmp = TempDir::new().unwrap();
        let body = json!({"model": "gpt-4o", "messages": []});
        let fingerprint = VcrClient::fingerprint("POST", URL, Some(&body));

        let recorder = VcrClient::new(VcrMode::Record, tmp.path().to_path_buf());
        recorder
            .save_cassette(&CassetteEntry {
                method: "POST".to_string(),
                url: URL.to_string(),
                request_body: Some(body.clone()),
                status: 200,
                response_body: json!({"choices": [{"message": {"content": "ok"}}]}),
                fingerprint,
            })
            .unwrap();

        let mut replay = VcrClient::new(VcrMode::Replay, tmp.path().to_path_buf());
        assert_eq!(replay.cassette_count(), 1);

        let resp = replay.post_json(URL, &body, Some("Bearer x")).await.unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.body["choices"][0]["message"]["content"], "ok");

        let other = json!({"model": "gpt-4o", "messages": [{"role": "user"}]});
        let err = replay.post_json(URL, &other, None).await.unwrap_err();
        assert!(err.to_string().contains("no cassette found"));
    }
}
