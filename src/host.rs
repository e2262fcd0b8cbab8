//! Host label resolution for links and document footers.

use tracing::warn;

use crate::error::ConfigError;

/// The host label: the configured override, or the OS host name.
///
/// The OS name is often unqualified, which leaves mailed links unreachable
/// off the local network. Production runs set `QA_NOTIFY_HOST`.
pub fn resolve_host_label(configured: Option<&str>) -> Result<String, ConfigError> {
    if let Some(host) = configured.map(str::trim).filter(|h| !h.is_empty()) {
        return Ok(host.to_string());
    }
    let name = hostname::get().map_err(|e| ConfigError::HostName(e.to_string()))?;
    let name = name.to_string_lossy().trim().to_string();
    if name.is_empty() {
        return Err(ConfigError::HostName("empty host name".into()));
    }
    if !is_qualified(&name) {
        warn!(
            host = %name,
            "Host name is not fully qualified; set QA_NOTIFY_HOST for links outside the local network"
        );
    }
    Ok(name)
}

/// Whether a host label carries a domain part.
fn is_qualified(host: &str) -> bool {
    host.trim_end_matches('.').contains('.')
}

/// `http://<host>/`.
pub fn host_url(host_label: &str) -> String {
    let mut url = format!("http://{host_label}");
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        assert_eq!(
            resolve_host_label(Some(" qa.example.org ")).unwrap(),
            "qa.example.org"
        );
    }

    #[test]
    fn falls_back_to_os_host_name() {
        let host = resolve_host_label(None).unwrap();
        assert!(!host.is_empty());
        assert_eq!(resolve_host_label(Some("")).unwrap(), host);
    }

    #[test]
    fn qualified_host_names() {
        assert!(is_qualified("qa.example.org"));
        assert!(is_qualified("qa.example.org."));
        assert!(!is_qualified("qa"));
        assert!(!is_qualified("qa."));
    }

    #[test]
    fn host_url_has_single_trailing_slash() {
        assert_eq!(host_url("qa.example.org"), "http://qa.example.org/");
        assert_eq!(host_url("qa.example.org/"), "http://qa.example.org/");
    }
}
