use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a fetchable resource: endpoint path plus query parameters.
///
/// Parameters live in a sorted map, so two keys built from the same pairs in a
/// different order compare (and hash) equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    path: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Request path with the form-encoded query string appended.
    pub fn to_path(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

/// Key handed to the resource cache; `Suppressed` means "do not fetch yet".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ResourceKey {
    Key(CacheKey),
    #[default]
    Suppressed,
}

impl ResourceKey {
    pub fn as_key(&self) -> Option<&CacheKey> {
        match self {
            Self::Key(key) => Some(key),
            Self::Suppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

impl From<CacheKey> for ResourceKey {
    fn from(key: CacheKey) -> Self {
        Self::Key(key)
    }
}

impl From<Option<CacheKey>> for ResourceKey {
    fn from(key: Option<CacheKey>) -> Self {
        key.map_or(Self::Suppressed, Self::Key)
    }
}
