//! One-shot flash payloads carried across a redirect.
//!
//! A mutating admin action answers with a [`FlashRedirect`]: a `303 See Other`
//! plus a cookie holding the serialized [`Flash`]. The next page that renders
//! reads it through the [`IncomingFlash`] extractor and appends
//! [`clear_cookie_header`] to its response, so each payload is shown once.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cookie::{Cookie, SameSite};
use rolegate_core::roles::MAX_FIELD_LENGTH;
use rolegate_core::validation::FieldErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the cookie carrying the pending flash payload.
pub const FLASH_COOKIE: &str = "rolegate_flash";

/// Strings echoed back in `old` are cut to this many characters. Anything
/// longer has already failed the length check.
const OLD_VALUE_MAX_CHARS: usize = MAX_FIELD_LENGTH + 1;

/// Encoded payloads above this size drop `old` so the cookie stays below the
/// 4096-byte limit browsers enforce.
pub const MAX_ENCODED_FLASH_LEN: usize = 3500;

/// Status messages and form state for the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level validation errors.
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    /// The submitted form, for repopulating inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<serde_json::Value>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Validation failure: field errors plus the input to repopulate.
    ///
    /// String values in `old` are truncated to [`OLD_VALUE_MAX_CHARS`].
    pub fn invalid(errors: FieldErrors, mut old: Value) -> Self {
        truncate_strings(&mut old);
        Self {
            errors,
            old: Some(old),
            ..Self::default()
        }
    }

    /// Serialize into a cookie-safe token (base64url of the JSON form).
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Like [`Flash::encode`], but sheds `old` when the token would exceed
    /// [`MAX_ENCODED_FLASH_LEN`]. Messages and field errors are always kept.
    pub fn encode_bounded(&self) -> Result<String, serde_json::Error> {
        let token = self.encode()?;
        if token.len() <= MAX_ENCODED_FLASH_LEN || self.old.is_none() {
            return Ok(token);
        }
        tracing::debug!(len = token.len(), "Flash payload too large, dropping old input");
        Self {
            old: None,
            ..self.clone()
        }
        .encode()
    }

    /// Inverse of [`Flash::encode`]. Returns `None` for anything malformed.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Merge this payload into a view's data object.
    pub fn merge_into(self, data: &mut serde_json::Map<String, serde_json::Value>) {
        if let Some(success) = self.success {
            data.insert("success".into(), success.into());
        }
        if let Some(error) = self.error {
            data.insert("error".into(), error.into());
        }
        if !self.errors.is_empty() {
            data.insert("errors".into(), serde_json::json!(self.errors));
        }
        if let Some(old) = self.old {
            data.insert("old".into(), old);
        }
    }
}

fn truncate_strings(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Some((cut, _)) = s.char_indices().nth(OLD_VALUE_MAX_CHARS) {
                s.truncate(cut);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(truncate_strings),
        Value::Object(map) => map.values_mut().for_each(truncate_strings),
        _ => {}
    }
}

/// `Set-Cookie` value that stores `flash`.
fn set_cookie_header(flash: &Flash) -> Option<HeaderValue> {
    let token = match flash.encode_bounded() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode flash payload");
            return None;
        }
    };
    let cookie = Cookie::build((FLASH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// `Set-Cookie` value that deletes the flash cookie.
pub fn clear_cookie_header() -> Option<HeaderValue> {
    let mut cookie = Cookie::build((FLASH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// A `303 See Other` that carries a flash payload to the next page.
#[derive(Debug)]
pub struct FlashRedirect {
    location: String,
    flash: Flash,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>, flash: Flash) -> Self {
        Self {
            location: location.into(),
            flash,
        }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();
        if let Some(value) = set_cookie_header(&self.flash) {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }
}

/// The flash payload left by the previous response, if any.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash {
    pub flash: Option<Flash>,
    /// The request carried a flash cookie, decodable or not.
    pub present: bool,
}

impl IncomingFlash {
    /// Find and decode the flash cookie among the request's `Cookie` headers.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(raw).flatten() {
                if cookie.name() == FLASH_COOKIE {
                    return Self {
                        flash: Flash::decode(cookie.value()),
                        present: true,
                    };
                }
            }
        }
        Self::default()
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
