use url::Url;

/// Sentinel assigned when a result URL is empty or has no parseable host.
pub const UNKNOWN_DOMAIN: &str = "unknown";

pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_ascii_lowercase();

    match lowered.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => lowered,
    }
}

pub fn extract_domain(raw_url: &str) -> String {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return UNKNOWN_DOMAIN.to_string();
    }

    match Url::parse(trimmed) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => normalize_domain(host),
            _ => UNKNOWN_DOMAIN.to_string(),
        },
        Err(_) => UNKNOWN_DOMAIN.to_string(),
    }
}
