use email_address::EmailAddress;
use url::Url;

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` when `value` is an http(s) URL served from `cdn_host` or one of its subdomains.
pub fn is_cdn_url(value: &str, cdn_host: &str) -> bool {
    let Ok(url) = Url::parse(value.trim()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host_str() {
        Some(host) => host == cdn_host || host.ends_with(&format!(".{cdn_host}")),
        None => false,
    }
}
