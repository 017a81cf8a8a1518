//! errors raised while resolving intrinsic functions
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IntrinsicError {
    /// The argument of an intrinsic function has the wrong shape
    #[error("{function}: {reason}")]
    Structural {
        function: &'static str,
        reason: String,
    },

    /// A named mapping, key or resource is not declared by the template
    #[error("{function}: {missing}")]
    Lookup {
        function: &'static str,
        missing: Missing,
    },

    /// An error raised while resolving the value at `path`
    #[error("{path}: {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<IntrinsicError>,
    },
}

impl IntrinsicError {
    pub fn structural(function: &'static str, reason: impl Into<String>) -> Self {
        Self::Structural {
            function,
            reason: reason.into(),
        }
    }

    pub fn lookup(function: &'static str, missing: Missing) -> Self {
        Self::Lookup { function, missing }
    }

    /// Attach a path unless the error already carries one
    pub(crate) fn at_path(self, path: &Path) -> Self {
        if path.is_empty() || matches!(self, IntrinsicError::AtPath { .. }) {
            return self;
        }

        Self::AtPath {
            path: path.to_string(),
            source: Box::new(self),
        }
    }

    /// The error without any path context
    pub fn root_cause(&self) -> &IntrinsicError {
        match self {
            IntrinsicError::AtPath { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// The component a lookup failed on
#[derive(Debug, Clone, PartialEq)]
pub enum Missing {
    Mapping(String),
    TopLevelKey { mapping: String, key: String },
    SecondLevelKey {
        mapping: String,
        top_level_key: String,
        key: String,
    },
    /// The mapping, or the value under `mapping.key`, exists but is not a map
    NotAMap { mapping: String, key: Option<String> },
    Resource(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Mapping(mapping) => write!(f, "mapping '{mapping}' not found"),
            Missing::TopLevelKey { mapping, key } => {
                write!(f, "key '{key}' not found in mapping '{mapping}'")
            }
            Missing::SecondLevelKey {
                mapping,
                top_level_key,
                key,
            } => write!(
                f,
                "key '{key}' not found in mapping '{mapping}' under '{top_level_key}'"
            ),
            Missing::NotAMap { mapping, key: None } => {
                write!(f, "mapping '{mapping}' is not a map")
            }
            Missing::NotAMap {
                mapping,
                key: Some(key),
            } => write!(f, "value at '{mapping}.{key}' is not a map"),
            Missing::Resource(resource) => write!(f, "resource '{resource}' not found"),
        }
    }
}

/// Location of a value inside the template, e.g. `Resources.MyFunction.Properties.Foo`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn join(&self, segment: impl ToString) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Logical ID of the resource this path points into
    pub fn resource(&self) -> Option<&str> {
        match self.0.as_slice() {
            [section, id, ..] if section == "Resources" => Some(id.as_str()),
            _ => None,
        }
    }
}

impl<S: ToString> FromIterator<S> for Path {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
