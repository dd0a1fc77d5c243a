use http::Uri;

const RESTORABLE_SCHEMES: [&str; 4] = ["http:", "https:", "file:", "ftp:"];

/// Returns true when the url starts with one of the schemes a browser can
/// reopen from storage. The scheme match ignores ASCII case.
pub fn is_restorable_url(url: &str) -> bool {
    RESTORABLE_SCHEMES.iter().any(|scheme| {
        url.len() >= scheme.len()
            && url.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    })
}

/// Tabs without a url (e.g. still loading, or hidden by the browser) are never restorable.
pub fn is_restorable(url: Option<&str>) -> bool {
    url.map_or(false, is_restorable_url)
}

/// Host part of a url for display, or the url itself when it has none.
// http::Uri is stricter than browser url parsing (IDN hosts, some paths);
// those show the full url.
pub fn display_hostname(url: &str) -> String {
    match url.parse::<Uri>() {
        Ok(uri) => match uri.host() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}
