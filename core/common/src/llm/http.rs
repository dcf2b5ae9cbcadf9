//! ベンダー共通の HTTP 送受信

use crate::error::Error;
use serde_json::Value;

/// JSON を POST して応答 JSON を返す
///
/// 非 2xx は本文の `error.message`（無ければステータスと本文）を Error::http にする。
/// 送受信エラーの文言には URL を含めない（クエリに秘密が乗るベンダーがある）。
pub(crate) async fn post_json(
    builder: reqwest::RequestBuilder,
    payload: &Value,
    label: &str,
) -> Result<Value, Error> {
    let response = builder
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|e| Error::http(format!("HTTP request failed: {}", e.without_url())))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("Failed to read response: {}", e.without_url())))?;

    if !status.is_success() {
        let msg = upstream_error(&body).unwrap_or_else(|| format!("HTTP {}: {}", status, body));
        return Err(Error::http(format!("{} error: {}", label, msg)));
    }

    let v: Value = serde_json::from_str(&body)
        .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;
    if let Some(msg) = v.get("error").and_then(|e| e["message"].as_str()) {
        return Err(Error::http(format!("{} error: {}", label, msg)));
    }
    Ok(v)
}

fn upstream_error(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v["error"]["message"].as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_extracts_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            upstream_error(body).as_deref(),
            Some("Incorrect API key provided")
        );
        assert_eq!(upstream_error("<html>bad gateway</html>"), None);
    }
}
