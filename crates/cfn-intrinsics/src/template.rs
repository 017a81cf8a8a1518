//! read-only snapshot of a template document
//!
//! [Template] keeps the root object of the document (section order is preserved) and the path it was loaded from.
//! Lookups that are not yet cached in a [crate::context::ResolveContext] go through here:
//! - `Parameters`: declared names and their `Default`
//! - `Mappings`: two-level nested maps for `Fn::FindInMap`
//! - `Resources`: declared logical IDs
use crate::value::{ConversionError, Value};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

#[derive(Default, Debug, Clone)]
pub struct Template {
    source: Option<PathBuf>,
    root: IndexMap<String, Value>,
}

impl Template {
    pub fn new(root: IndexMap<String, Value>, source: impl Into<Option<PathBuf>>) -> Self {
        Self {
            source: source.into(),
            root,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All top-level sections in document order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn section(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.root.get(name).and_then(Value::as_object)
    }

    pub fn parameters(&self) -> Option<&IndexMap<String, Value>> {
        self.section("Parameters")
    }

    pub fn mappings(&self) -> Option<&IndexMap<String, Value>> {
        self.section("Mappings")
    }

    pub fn conditions(&self) -> Option<&IndexMap<String, Value>> {
        self.section("Conditions")
    }

    pub fn resources(&self) -> Option<&IndexMap<String, Value>> {
        self.section("Resources")
    }

    pub fn outputs(&self) -> Option<&IndexMap<String, Value>> {
        self.section("Outputs")
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters().is_some_and(|p| p.contains_key(name))
    }

    /// Declared `Default` of a parameter
    pub fn parameter_default(&self, name: &str) -> Option<&Value> {
        self.parameters()?
            .get(name)?
            .as_object()?
            .get("Default")
    }

    pub fn has_resource(&self, logical_id: &str) -> bool {
        self.resources().is_some_and(|r| r.contains_key(logical_id))
    }

    pub fn mapping(&self, name: &str) -> Option<&Value> {
        self.mappings()?.get(name)
    }
}

impl Template {
    /// Load a YAML or JSON template
    pub fn load_file(file_path: &Path) -> Result<Self, LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading template");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let mut template: Template = file_contents.parse()?;
        template.source = Some(file_path);
        Ok(template)
    }
}

impl std::str::FromStr for Template {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document: serde_yaml::Value = serde_yaml::from_str(s)?;
        Template::try_from(Value::try_from(document)?)
    }
}

impl TryFrom<Value> for Template {
    type Error = LoadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(root) => Ok(Template::new(root, None)),
            // an empty document
            Value::Null => Ok(Template::default()),
            other => Err(LoadError::NotAnObject(other.type_name())),
        }
    }
}

impl From<Template> for Value {
    fn from(template: Template) -> Self {
        Value::Object(template.root)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse template")]
    ParseFailed(#[from] serde_yaml::Error),
    #[error("Unsupported template content")]
    Conversion(#[from] ConversionError),
    #[error("Template root must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// Utility macro to create a [Template] from inline YAML (or JSON)
///
/// ```
/// # use cfn_intrinsics::template;
/// let template = template!(r#"
/// Parameters:
///   Stage:
///     Type: String
///     Default: dev
/// "#);
/// assert!(template.has_parameter("Stage"));
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use cfn_intrinsics::template;
/// template!("- not\n- an object");
/// ```
#[macro_export]
macro_rules! template {
    ($expr:expr) => {
        $expr
            .parse::<$crate::template::Template>()
            .expect("template must parse")
    };
}

#[cfg(test)]
pub(crate) mod test {
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookups() {
        let template = template! {r#"
        Parameters:
          WithDefault:
            Type: String
            Default: hello
          WithoutDefault:
            Type: String
        Mappings:
          Regions:
            us-east-1:
              Ami: ami-123
        Resources:
          Bucket:
            Type: AWS::S3::Bucket
        "#};

        assert!(template.has_parameter("WithDefault"));
        assert!(template.has_parameter("WithoutDefault"));
        assert_eq!(
            template.parameter_default("WithDefault"),
            Some(&Value::from("hello"))
        );
        assert_eq!(template.parameter_default("WithoutDefault"), None);
        assert!(template.has_resource("Bucket"));
        assert!(!template.has_resource("Queue"));
        assert!(template.mapping("Regions").is_some());
    }

    #[test]
    fn empty_document() {
        let template = template!("");
        assert_eq!(template.sections().count(), 0);
        assert!(template.parameters().is_none());
    }

    #[test]
    fn section_order_is_kept() {
        let template = template!("Resources: {}\nParameters: {}\nOutputs: {}\n");
        let sections: Vec<_> = template.sections().map(|(name, _)| name).collect();
        assert_eq!(sections, ["Resources", "Parameters", "Outputs"]);
    }
}
