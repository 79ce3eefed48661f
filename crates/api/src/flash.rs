//! One-shot flash messages carried in a cookie across a redirect.
//!
//! A successful mutation answers with a redirect that sets the `flash`
//! cookie. The next rendered page reads it through [`IncomingFlash`], shows
//! it, and clears the cookie so it appears once.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "flash";

/// Lifetime of an unread flash message.
const FLASH_MAX_AGE_SECS: i64 = 60;

/// Flash message sent by the browser with this request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingFlash(pub Option<String>);

impl IncomingFlash {
    pub fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(read_flash(&parts.headers)))
    }
}

/// Find a non-empty flash cookie in the request's `Cookie` headers.
pub fn read_flash(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|c| c.name() == FLASH_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// `Set-Cookie` value carrying `message`.
pub fn flash_cookie(message: &str) -> Option<HeaderValue> {
    let cookie = Cookie::build((FLASH_COOKIE, message.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(FLASH_MAX_AGE_SECS))
        .build();
    to_header(&cookie)
}

/// `Set-Cookie` value that removes the flash cookie.
pub fn clear_flash_cookie() -> Option<HeaderValue> {
    let mut cookie = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    cookie.make_removal();
    to_header(&cookie)
}

fn to_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    match HeaderValue::from_str(&cookie.encoded().to_string()) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "Dropping unencodable flash cookie");
            None
        }
    }
}

/// `303 See Other` to `location` that leaves `message` for the next page.
pub fn redirect_with_flash(location: &str, message: &str) -> Response {
    let mut response = Redirect::to(location).into_response();
    if let Some(value) = flash_cookie(message) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}
