use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64ct::{Base64, Encoding};

/// Identifier and secret carried by a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub pass: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Read Basic credentials from request headers. `None` when the header is
/// missing, uses another scheme, or does not decode to `name:pass`.
pub fn from_headers(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    parse(value)
}

pub fn parse(header: &str) -> Option<Credentials> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, pass) = decoded.split_once(':')?;
    Some(Credentials {
        name: name.to_string(),
        pass: pass.to_string(),
    })
}

/// Value for an `Authorization` header carrying the given credentials.
#[cfg(test)]
pub fn header_value(name: &str, pass: &str) -> String {
    format!("Basic {}", Base64::encode_string(format!("{name}:{pass}").as_bytes()))
}
