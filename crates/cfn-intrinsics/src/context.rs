//! state of a single expansion run
use crate::template::Template;
use crate::value::Value;
use indexmap::IndexMap;

pub const NO_VALUE: &str = "AWS::NoValue";

/// Deployment identity every run starts out with
pub(crate) const DEFAULT_PSEUDO_PARAMETERS: [(&str, &str); 7] = [
    ("AWS::AccountId", "123456789012"),
    ("AWS::Region", "us-east-1"),
    ("AWS::StackName", "local"),
    (
        "AWS::StackId",
        "arn:aws:cloudformation:us-east-1:123456789012:stack/local/00000000-0000-0000-0000-000000000000",
    ),
    ("AWS::Partition", "aws"),
    ("AWS::URLSuffix", "amazonaws.com"),
    (NO_VALUE, ""),
];

/// Tables consulted by every action
///
/// Owned by exactly one run, never shared.
#[derive(Debug, Clone)]
pub struct ResolveContext {
    template: Option<Template>,
    pseudo_parameters: IndexMap<String, String>,
    parameters: IndexMap<String, Value>,
    /// known attribute values per logical ID
    resources: IndexMap<String, IndexMap<String, Value>>,
    conditions: IndexMap<String, bool>,
    /// new logical ID -> declared logical ID
    renamed_resources: IndexMap<String, String>,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ResolveContext {
    /// Seed pseudo-parameters with their defaults and parameters with their declared `Default`s
    pub fn new(template: Option<&Template>) -> Self {
        let pseudo_parameters = DEFAULT_PSEUDO_PARAMETERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let parameters = template
            .and_then(Template::parameters)
            .into_iter()
            .flatten()
            .filter_map(|(name, declaration)| {
                let default = declaration.as_object()?.get("Default")?;
                Some((name.clone(), default.clone()))
            })
            .collect();

        Self {
            template: template.cloned(),
            pseudo_parameters,
            parameters,
            resources: Default::default(),
            conditions: Default::default(),
            renamed_resources: Default::default(),
        }
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn set_pseudo_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pseudo_parameters.insert(name.into(), value.into());
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn set_resource_attribute(
        &mut self,
        logical_id: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.resources
            .entry(logical_id.into())
            .or_default()
            .insert(attribute.into(), value.into());
    }

    pub fn set_condition(&mut self, name: impl Into<String>, value: bool) {
        self.conditions.insert(name.into(), value);
    }

    /// Resource `old` is emitted as `new`; `new` counts as declared from now on
    pub fn set_resource_rename(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.renamed_resources.insert(new.into(), old.into());
    }

    pub fn pseudo_parameter(&self, name: &str) -> Option<&str> {
        self.pseudo_parameters.get(name).map(String::as_str)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn resource_attribute(&self, logical_id: &str, attribute: &str) -> Option<&Value> {
        self.resources.get(logical_id)?.get(attribute)
    }

    pub fn condition(&self, name: &str) -> Option<bool> {
        self.conditions.get(name).copied()
    }

    pub fn is_pseudo_parameter(&self, name: &str) -> bool {
        self.pseudo_parameters.contains_key(name)
    }

    /// Declared by the template or given a value during this run
    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
            || self.template().is_some_and(|t| t.has_parameter(name))
    }

    /// Declared by the template (under this or its former name) or with cached attributes
    pub fn is_resource(&self, logical_id: &str) -> bool {
        let declared = |id: &str| self.template().is_some_and(|t| t.has_resource(id));

        self.resources.contains_key(logical_id)
            || declared(logical_id)
            || self
                .renamed_resources
                .get(logical_id)
                .is_some_and(|old| declared(old.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn without_template() {
        let ctx = ResolveContext::new(None);
        assert_eq!(ctx.pseudo_parameter("AWS::Region"), Some("us-east-1"));
        assert_eq!(ctx.pseudo_parameter(NO_VALUE), Some(""));
        assert_eq!(ctx.parameter("Anything"), None);
        assert!(!ctx.is_resource("Anything"));
    }

    #[test]
    fn seeds_declared_defaults() {
        let template = crate::template! {r#"
        Parameters:
          Stage:
            Type: String
            Default: prod
          Count:
            Type: Number
            Default: 3
          Required:
            Type: String
        "#};
        let ctx = ResolveContext::new(Some(&template));

        assert_eq!(ctx.parameter("Stage"), Some(&Value::from("prod")));
        assert_eq!(ctx.parameter("Count"), Some(&Value::Integer(3)));
        assert_eq!(ctx.parameter("Required"), None);
        assert!(ctx.is_parameter("Required"));
    }

    #[test]
    fn renamed_resources_stay_declared() {
        let template = crate::template!("Resources:\n  Old:\n    Type: AWS::SNS::Topic\n");
        let mut ctx = ResolveContext::new(Some(&template));
        assert!(!ctx.is_resource("New"));

        ctx.set_resource_rename("Old", "New");
        assert!(ctx.is_resource("New"));
        assert!(ctx.is_resource("Old"));
    }

    #[test]
    fn setters_overwrite() {
        let mut ctx = ResolveContext::default();
        ctx.set_parameter("Stage", "dev");
        ctx.set_parameter("Stage", "prod");
        ctx.set_pseudo_parameter("AWS::Region", "eu-west-1");
        ctx.set_resource_attribute("Bucket", "Arn", "arn:aws:s3:::bucket");
        ctx.set_resource_attribute("Bucket", "Arn", "arn:aws:s3:::other");
        ctx.set_condition("IsProd", true);

        assert_eq!(ctx.parameter("Stage"), Some(&Value::from("prod")));
        assert_eq!(ctx.pseudo_parameter("AWS::Region"), Some("eu-west-1"));
        assert_eq!(
            ctx.resource_attribute("Bucket", "Arn"),
            Some(&Value::from("arn:aws:s3:::other"))
        );
        assert_eq!(ctx.condition("IsProd"), Some(true));
        assert!(ctx.is_resource("Bucket"));
    }
}
