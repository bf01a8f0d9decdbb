//! DestinationConfig - construction-time destination descriptor

use url::Url;

use crate::RelayError;

/// Everything needed to construct one destination.
///
/// The address is parsed eagerly so a typo fails at configuration time,
/// not on the first send. Immutable once built.
///
/// # Examples
/// ```
/// use contracts::DestinationConfig;
///
/// let config = DestinationConfig::new("audit", "file:///var/log/audit.log").unwrap();
/// assert_eq!(config.scheme(), "file");
///
/// assert!(DestinationConfig::new("bad", "not a url").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DestinationConfig {
    /// Diagnostic name, used in logs and metrics only.
    pub name: String,

    /// Parsed destination address.
    pub url: Url,
}

impl DestinationConfig {
    /// Parse an address into a destination config.
    ///
    /// # Errors
    /// Returns [`RelayError::InvalidAddress`] when the address is not a
    /// valid URL.
    pub fn new(name: impl Into<String>, address: &str) -> Result<Self, RelayError> {
        let url = Url::parse(address)
            .map_err(|e| RelayError::invalid_address(address, e.to_string()))?;
        Ok(Self {
            name: name.into(),
            url,
        })
    }

    /// The full (unsplit) address scheme, e.g. `tcp+json`.
    #[inline]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_composite_scheme() {
        let config = DestinationConfig::new("peer", "tcp+json://collector:9000").unwrap();
        assert_eq!(config.name, "peer");
        assert_eq!(config.scheme(), "tcp+json");
        assert_eq!(config.url.host_str(), Some("collector"));
        assert_eq!(config.url.port(), Some(9000));
    }

    #[test]
    fn test_rejects_unparsable_address() {
        let err = DestinationConfig::new("bad", "://nope").unwrap_err();
        assert!(matches!(err, RelayError::InvalidAddress { .. }));
    }
}
