use crate::ccproxy::errors::{CCProxyError, ProxyResult};

use http::{header::AUTHORIZATION, HeaderMap};

/// Authenticates the request against the configured `Authorization` value.
///
/// The whole header is compared, so the configured key carries its own
/// `Bearer ` prefix. On success the header value is returned for forwarding.
pub fn authenticate_request<'a>(
    headers: &'a HeaderMap,
    authorization_key: &str,
) -> ProxyResult<&'a str> {
    let Some(header_value) = headers.get(AUTHORIZATION) else {
        log::warn!("Proxy authentication: missing 'Authorization' header.");
        return Err(CCProxyError::Unauthorized);
    };

    let header_str = header_value.to_str().map_err(|_| {
        log::warn!("Proxy authentication: 'Authorization' header is not valid UTF-8.");
        CCProxyError::Unauthorized
    })?;

    if header_str == authorization_key {
        #[cfg(debug_assertions)]
        log::debug!("Proxy authentication: Token is valid.");

        Ok(header_str)
    } else {
        #[cfg(debug_assertions)]
        log::debug!(
            "Proxy authentication: Token is invalid. Token: {:?}******",
            header_str.get(..12).unwrap_or(header_str)
        );

        Err(CCProxyError::Unauthorized)
    }
}
