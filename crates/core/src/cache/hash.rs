//! Request key generation.
//!
//! A cached entry is addressed by the request's method and URL. The fragment
//! never reaches the key because URLs are stored without it.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the cache key for a request.
pub fn compute_request_key(method: &str, url: &Url) -> String {
    let mut without_fragment = url.clone();
    without_fragment.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(without_fragment.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
