use thiserror::Error;

const SCHEME_SEPARATOR: &str = "://";

/// Errors raised while decomposing a result locator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocatorError {
    /// The locator has no `://` separator.
    #[error("locator '{0}' has no scheme separator")]
    MissingScheme(String),
    /// The bucket segment is empty.
    #[error("locator '{0}' has an empty bucket")]
    EmptyBucket(String),
    /// The object key is empty.
    #[error("locator '{0}' has an empty object key")]
    EmptyKey(String),
}

/// Storage coordinates parsed out of a `scheme://bucket/key...` locator.
///
/// Derived per fetch, never stored on the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLocator {
    bucket: String,
    key: String,
}

impl ResultLocator {
    /// Decompose a locator.
    ///
    /// The bucket is the first path segment after the scheme; the key is
    /// the verbatim remainder, separators included.
    pub fn parse(locator: &str) -> Result<Self, LocatorError> {
        let Some((_scheme, rest)) = locator.split_once(SCHEME_SEPARATOR) else {
            return Err(LocatorError::MissingScheme(locator.to_owned()));
        };

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(LocatorError::EmptyBucket(locator.to_owned()));
        }
        if key.is_empty() {
            return Err(LocatorError::EmptyKey(locator.to_owned()));
        }

        Ok(Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
