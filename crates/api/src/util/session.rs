use db::TOKEN_LEN;
use hyper::{header::COOKIE, HeaderMap};

pub const COOKIE_NAME: &str = "sid";

/// Extracts the raw session ID from the `Cookie` header, if any.
pub fn extract_session(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|&byte| byte == b';'))
        .filter_map(|section| {
            let mid = section.iter().copied().position(|byte| byte == b'=')?;
            let (left, right) = section.split_at(mid);
            Some((left.trim_ascii(), &right[1..]))
        })
        .find_map(|(key, session)| (key == COOKIE_NAME.as_bytes()).then_some(session))
}

/// Decodes the hex session ID from the cookie into its raw token bytes.
pub fn parse_token(session: &[u8]) -> Option<[u8; TOKEN_LEN]> {
    let mut token = [0; TOKEN_LEN];
    hex::decode_to_slice(session, &mut token).ok()?;
    Some(token)
}

/// Digest under which a token is stored. The raw token only ever lives in the cookie.
pub fn hash_token(token: &[u8; TOKEN_LEN]) -> [u8; TOKEN_LEN] {
    *blake3::hash(token).as_bytes()
}

pub fn generate_token() -> [u8; TOKEN_LEN] {
    rand::random()
}

pub fn set_cookie(token: &[u8; TOKEN_LEN], max_age: u64) -> String {
    let hex = hex::encode(token);
    format!("{COOKIE_NAME}={hex}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}")
}

pub fn clear_cookie() -> &'static str {
    "sid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
}
