//! intrinsic function evaluators
//!
//! Every intrinsic function is an [Action]. Actions are stateless: the result depends only on the
//! [ResolveContext] and the argument, which has already been resolved when the action sees it.
//!
//! An action that cannot (or must not) evaluate its argument returns the intrinsic unchanged, see [preserve].
//! CloudFormation resolves those at deploy time.
mod condition;
mod find_in_map;
mod get_att;
mod passthrough;
mod reference;
mod sub;

pub use condition::{Condition, If};
pub use find_in_map::FindInMap;
pub use get_att::GetAtt;
pub use passthrough::{Base64, EagerJoin, GetAZs, ImportValue, Join, Select, Split};
pub use reference::Ref;
pub use sub::Sub;

use crate::context::ResolveContext;
use crate::error::IntrinsicError;
use crate::value::{Resolution, Value};
use indexmap::IndexMap;

/// Evaluator of one intrinsic function
pub trait Action {
    /// Key of the intrinsic object, e.g. `Fn::Sub`
    fn name(&self) -> &'static str;

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError>;
}

/// Keep the intrinsic for deploy-time resolution
pub fn preserve(name: &str, argument: Value) -> Result<Resolution, IntrinsicError> {
    Ok(Value::intrinsic(name, argument).into())
}

/// Intrinsic function name to [Action]
pub struct Registry {
    actions: IndexMap<&'static str, Box<dyn Action>>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Ref));
        registry.register(Box::new(Sub));
        registry.register(Box::new(GetAtt));
        registry.register(Box::new(FindInMap));
        registry.register(Box::new(Join));
        registry.register(Box::new(If));
        registry.register(Box::new(Select));
        registry.register(Box::new(Base64));
        registry.register(Box::new(GetAZs));
        registry.register(Box::new(Split));
        registry.register(Box::new(ImportValue));
        registry.register(Box::new(Condition));
        registry
    }
}

impl Registry {
    /// Registry with the built-in actions
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry without any action, every intrinsic is preserved
    pub fn empty() -> Self {
        Self {
            actions: Default::default(),
        }
    }

    /// Add an action, replacing the one registered under the same name
    pub fn register(&mut self, action: Box<dyn Action>) {
        self.actions.insert(action.name(), action);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(Box::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }

    /// Resolve `value` bottom-up
    ///
    /// No logical-ID renaming, placeholders or dependency tracking, see [crate::resolver::Resolver] for those.
    pub fn resolve(
        &self,
        ctx: &ResolveContext,
        value: &Value,
    ) -> Result<Resolution, IntrinsicError> {
        crate::resolver::Walk::plain(self, ctx).resolve(&Default::default(), value)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}

/// Elements of an argument that must be an array of exactly `N` values
pub(crate) fn fixed_array<const N: usize>(
    function: &'static str,
    argument: Value,
) -> Result<[Value; N], IntrinsicError> {
    let elements = match argument {
        Value::Array(elements) => elements,
        other => {
            return Err(IntrinsicError::structural(
                function,
                format!("expected an array of {N} elements, found {}", other.type_name()),
            ))
        }
    };

    let len = elements.len();
    elements.try_into().map_err(|_| {
        IntrinsicError::structural(
            function,
            format!("expected an array of {N} elements, found {len}"),
        )
    })
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Resolve a json fixture with the default registry
    pub(crate) fn resolve(
        ctx: &ResolveContext,
        value: serde_json::Value,
    ) -> Result<Resolution, IntrinsicError> {
        Registry::new().resolve(ctx, &value.into())
    }

    pub(crate) fn resolved(ctx: &ResolveContext, value: serde_json::Value) -> Value {
        resolve(ctx, value)
            .expect("must resolve")
            .into_value()
            .expect("must not be AWS::NoValue")
    }

    #[test]
    fn builtins() {
        let names: Vec<_> = Registry::new().names().collect();
        assert_eq!(
            names,
            [
                "Ref",
                "Fn::Sub",
                "Fn::GetAtt",
                "Fn::FindInMap",
                "Fn::Join",
                "Fn::If",
                "Fn::Select",
                "Fn::Base64",
                "Fn::GetAZs",
                "Fn::Split",
                "Fn::ImportValue",
                "Condition",
            ]
        );
    }

    #[test]
    fn plain_data_is_unchanged() {
        let ctx = ResolveContext::default();
        let value = json!({
            "Name": "bucket",
            "Count": 3,
            "Ratio": 0.5,
            "Enabled": true,
            "Nothing": null,
            "Tags": [{"Key": "a", "Value": "b"}],
            "Two": {"Keys": 1, "Fn::Sub": "not an intrinsic"},
        });
        assert_eq!(resolved(&ctx, value.clone()), value.into());
    }

    #[test]
    fn unknown_intrinsic_keeps_resolved_argument() {
        let ctx = ResolveContext::default();
        assert_eq!(
            resolved(
                &ctx,
                json!({"Fn::Equals": [{"Ref": "AWS::Region"}, "us-east-1"]})
            ),
            json!({"Fn::Equals": ["us-east-1", "us-east-1"]}).into()
        );
    }

    #[test]
    fn no_value_removes_slots() {
        let ctx = ResolveContext::default();
        assert_eq!(
            resolved(
                &ctx,
                json!({
                    "Keep": "yes",
                    "Drop": {"Ref": "AWS::NoValue"},
                    "List": ["a", {"Ref": "AWS::NoValue"}, "b"],
                })
            ),
            json!({"Keep": "yes", "List": ["a", "b"]}).into()
        );
    }

    #[test]
    fn registered_action_replaces_builtin() {
        let mut registry = Registry::new();
        registry.register(Box::new(EagerJoin));
        assert_eq!(registry.names().count(), 12);

        let ctx = ResolveContext::default();
        let value = json!({"Fn::Join": ["-", ["a", {"Ref": "AWS::Region"}]]}).into();
        assert_eq!(
            registry.resolve(&ctx, &value),
            Ok(Resolution::Value("a-us-east-1".into()))
        );
    }

    #[test]
    fn empty_registry_preserves_everything() {
        let ctx = ResolveContext::default();
        let value = json!({"Ref": "AWS::Region"}).into();
        assert_eq!(
            Registry::empty().resolve(&ctx, &value),
            Ok(Resolution::Value(value))
        );
    }
}
