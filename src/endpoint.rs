//! Service endpoint construction and host validation

use url::Url;

use crate::auth::Auth;
use crate::error::{Error, Result};

/// The well-known public service instance, used when no host is configured.
pub const DEFAULT_HOST: &str = "https://ntfy.sh";

/// Path suffix of a topic's event-stream endpoint.
const STREAM_SUFFIX: &str = "sse";

/// Validate a host string: `http`/`https` scheme plus an authority.
///
/// Failing this is a configuration error, not a transport error.
pub fn validate_host(host: &str) -> Result<()> {
    let parsed = Url::parse(host).map_err(|_| Error::InvalidHost(host.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidHost(host.to_string()));
    }
    if parsed.host_str().is_none() {
        return Err(Error::InvalidHost(host.to_string()));
    }
    Ok(())
}

/// `<host>/<topic>`, the topic appended as a path segment so hosts with a
/// base path keep working.
pub(crate) fn publish_url(host: &str, topic: &str) -> Result<Url> {
    let mut url = Url::parse(host).map_err(|_| Error::InvalidHost(host.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidHost(host.to_string()))?
        .pop_if_empty()
        .push(topic);
    Ok(url)
}

/// `<host>/<topic>/sse[?auth=<encoded>]`
pub(crate) fn stream_url(host: &str, topic: &str, auth: Option<&Auth>) -> Result<Url> {
    let mut url = publish_url(host, topic)?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidHost(host.to_string()))?
        .push(STREAM_SUFFIX);
    if let Some(auth) = auth {
        url.query_pairs_mut().append_pair("auth", &auth.query_token());
    }
    Ok(url)
}
