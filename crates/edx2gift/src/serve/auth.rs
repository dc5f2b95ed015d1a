//! HTTP Basic authentication against a single configured account.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check the `Authorization` header of a request.
    ///
    /// Username and password are both compared in constant time, even when
    /// the username is already known to be wrong.
    pub fn check(&self, headers: &HeaderMap) -> Result<String, Error> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(Error::NotAuthenticated)?
            .to_str()
            .map_err(|_| Error::MalformedCredentials)?;

        let (username, password) = parse_basic(value)?;

        let username_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if !(username_ok & password_ok) {
            return Err(Error::InvalidCredentials);
        }

        Ok(username)
    }
}

/// Split a `Basic <base64(username:password)>` header value.
fn parse_basic(value: &str) -> Result<(String, String), Error> {
    let (scheme, token) = value.trim().split_once(' ').ok_or(Error::NotAuthenticated)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(Error::NotAuthenticated);
    }

    let decoded = STANDARD
        .decode(token.trim())
        .map_err(|_| Error::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| Error::MalformedCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(Error::MalformedCredentials)?;

    Ok((username.to_string(), password.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// `Authorization` header for the given account.
#[cfg(test)]
pub(crate) fn basic_auth(username: &str, password: &str) -> HeaderMap {
    let token = STANDARD.encode(format!("{username}:{password}"));
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        axum::http::HeaderValue::from_str(&format!("Basic {token}")).unwrap(),
    );
    headers
}
