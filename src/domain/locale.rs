use crate::config::LocaleConfig;
use crate::error::ConfigurationError;

/// The set of locales the portal routes under, e.g. `/en/dashboard`.
#[derive(Debug, Clone)]
pub struct Locales {
    supported: Vec<String>,
    default_locale: String,
}

impl Locales {
    /// # Errors
    /// Fails if no locale is configured, a locale is malformed, or the default is not supported.
    pub fn from_config(config: &LocaleConfig) -> Result<Self, ConfigurationError> {
        let supported: Vec<String> = config.supported.iter().map(|l| l.trim().to_ascii_lowercase()).collect();
        if supported.is_empty() {
            return Err(ConfigurationError::Locale("no supported locales configured".into()));
        }
        if let Some(bad) = supported.iter().find(|l| l.is_empty() || !l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')) {
            return Err(ConfigurationError::Locale(format!("malformed locale '{bad}'")));
        }

        let default_locale = config.default_locale.trim().to_ascii_lowercase();
        if !supported.contains(&default_locale) {
            return Err(ConfigurationError::Locale(format!("default locale '{default_locale}' is not supported")));
        }

        Ok(Self { supported, default_locale })
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    #[must_use]
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// Matches a path segment against the supported locales, case-insensitively.
    #[must_use]
    pub fn resolve(&self, segment: &str) -> Option<&str> {
        self.supported.iter().find(|l| l.eq_ignore_ascii_case(segment)).map(String::as_str)
    }

    /// Picks the best supported locale for an `Accept-Language` header, falling back to the default.
    #[must_use]
    pub fn negotiate(&self, accept_language: Option<&str>) -> &str {
        let Some(header) = accept_language else {
            return &self.default_locale;
        };

        let mut ranges: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let q = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((tag, q))
            })
            .filter(|(_, q)| *q > 0.0)
            .collect();

        // Stable sort keeps header order among equal weights.
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (tag, _) in ranges {
            if let Some(exact) = self.resolve(tag) {
                return exact;
            }
            if let Some(primary) = tag.split('-').next().and_then(|p| self.resolve(p)) {
                return primary;
            }
        }

        &self.default_locale
    }
}
