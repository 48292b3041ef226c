//! URL normalization helpers used to derive identity keys.

use url::Url;

use crate::errors::MonitorError;
use crate::types::IdentityKey;

/// Derive the identity key for a resource URL.
///
/// The URL must be absolute. When `ignore_query` is set the query component is
/// removed entirely (no trailing `?`). The fragment is kept. The result is the
/// canonical serialization, so `HTTPS://CDN/a.js` and `https://cdn/a.js` share a key.
pub fn identity_key(url: &str, ignore_query: bool) -> Result<IdentityKey, MonitorError> {
    let mut parsed = Url::parse(url).map_err(|source| MonitorError::MalformedUrl {
        url: url.to_string(),
        source,
    })?;
    if ignore_query {
        parsed.set_query(None);
    }
    Ok(parsed.into())
}
