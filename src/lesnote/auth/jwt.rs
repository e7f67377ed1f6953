//! JWT payload 解码（不校验签名）
//!
//! 只用于显示和区分本地缓存（例如聊天会话 ID、会话轮询的过期判断），
//! 不能作为任何授权依据。

use base64::Engine;
use serde_json::{Map, Value};

/// 依次尝试作为用户标识的 claim
const IDENTITY_CLAIMS: [&str; 5] = [
    "sub",
    "nameid",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "email",
    "unique_name",
];

/// 解码 JWT 第二段（payload），失败返回 None
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let payload = payload.trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// 由 token 推导本地聊天会话 ID
///
/// payload 无法解码时退化为 token 签名段末尾字符，保证不同 token 得到不同 ID。
pub fn session_id_for(token: &str) -> String {
    if let Some(claims) = decode_claims(token) {
        for claim in IDENTITY_CLAIMS {
            match claims.get(claim) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Number(n)) => return n.to_string(),
                _ => {}
            }
        }
    }
    let tail: String = token.chars().rev().take(16).collect::<Vec<_>>().into_iter().rev().collect();
    format!("anon-{}", tail)
}

/// `exp` 已过期返回 true；没有 `exp` 或无法解码时返回 false
pub fn is_expired(token: &str, now_unix_secs: i64) -> bool {
    decode_claims(token)
        .and_then(|claims| claims.get("exp").and_then(Value::as_i64))
        .is_some_and(|exp| exp <= now_unix_secs)
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.signature",
        engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        engine.encode(payload.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_id_prefers_sub_claim() {
        let token = encode_test_token(&json!({"sub": "42", "email": "ada@school.ng"}));
        assert_eq!(session_id_for(&token), "42");

        let token = encode_test_token(&json!({"email": "ada@school.ng"}));
        assert_eq!(session_id_for(&token), "ada@school.ng");
    }

    #[test]
    fn padded_payload_still_decodes() {
        let engine = base64::engine::general_purpose::URL_SAFE;
        let token = format!("h.{}.s", engine.encode(r#"{"sub":"7"}"#));
        assert_eq!(decode_claims(&token).unwrap()["sub"], "7");
    }

    #[test]
    fn garbage_token_falls_back_to_anon_id() {
        let id = session_id_for("not-a-jwt-but-long-enough");
        assert_eq!(id, "anon--but-long-enough");
        assert!(decode_claims("a.b").is_none());
    }

    #[test]
    fn expiry_uses_exp_claim() {
        let token = encode_test_token(&json!({"sub": "1", "exp": 1_000}));
        assert!(is_expired(&token, 1_000));
        assert!(!is_expired(&token, 999));
        let token = encode_test_token(&json!({"sub": "1"}));
        assert!(!is_expired(&token, i64::MAX));
    }
}
