/// Default DNS domain appended to short service names.
pub const DEFAULT_DOMAIN: &str = "service.consul";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed hostname {hostname:?}: {reason}")]
pub struct MalformedHostname {
    pub hostname: String,
    pub reason: &'static str,
}

/// Maps short registry service names to mesh hostnames and back.
///
/// `parse_hostname(&to_hostname(n)) == Ok(n)` for every name accepted by
/// [`HostnameCodec::is_valid_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameCodec {
    domain: String,
}

impl HostnameCodec {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            domain: domain.trim_matches('.').to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// A name round-trips when it is non-empty and holds no dot.
    pub fn is_valid_name(&self, name: &str) -> bool {
        !name.is_empty() && !name.contains('.')
    }

    pub fn to_hostname(&self, name: &str) -> String {
        format!("{}.{}", name, self.domain)
    }

    pub fn parse_hostname(&self, hostname: &str) -> Result<String, MalformedHostname> {
        let malformed = |reason| MalformedHostname {
            hostname: hostname.to_string(),
            reason,
        };

        let name = hostname
            .strip_suffix(self.domain.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| malformed("missing domain suffix"))?;

        if name.is_empty() {
            return Err(malformed("missing service name"));
        }
        if name.contains('.') {
            return Err(malformed("service name contains a dot"));
        }

        Ok(name.to_string())
    }
}

impl Default for HostnameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}
