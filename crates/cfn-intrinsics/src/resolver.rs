//! document tree walker
//!
//! Every value is resolved depth-first. For an intrinsic node logical IDs in the (unresolved) argument are renamed
//! and the argument is resolved, then:
//! 1. placeholders, `Fn::ImportValue` and `Fn::GetAZs` are returned as they are
//! 2. a `Ref`/`Fn::GetAtt` to a resource from inside `Resources.<id>` is recorded as a dependency of `<id>`
//! 3. the registered [Action] evaluates the argument
//!
//! Nested intrinsics rename their own arguments, so every logical ID is renamed exactly once.
//!
//! `Fn::If` is the exception: only its condition name is resolved up front. Once the condition is known just the
//! selected branch is resolved, so a branch of `{"Ref": "AWS::NoValue"}` removes the slot the `Fn::If` occupies.
use crate::actions::{preserve, GetAtt, Registry};
use crate::context::{ResolveContext, NO_VALUE};
use crate::dependency::{DependencyError, DependencyTracker};
use crate::error::{IntrinsicError, Path};
use crate::template::Template;
use crate::util::LogicalIdRewriter;
use crate::value::{Resolution, Value};
use crate::visit::VisitLogicalIdsMut;
use indexmap::IndexMap;
use std::borrow::Cow;

/// Intrinsics that are never evaluated during expansion
const DEFERRED: [&str; 2] = ["Fn::ImportValue", "Fn::GetAZs"];

/// Expands one template (or parts of it) against one [ResolveContext]
#[derive(Debug)]
pub struct Resolver {
    registry: Registry,
    ctx: ResolveContext,
    dependencies: DependencyTracker,
    /// old logical ID -> new logical ID
    logical_ids: IndexMap<String, String>,
    /// values that are kept for a later pass
    placeholders: Vec<Value>,
}

impl Resolver {
    pub fn new(ctx: ResolveContext) -> Self {
        Self {
            registry: Registry::new(),
            ctx,
            dependencies: Default::default(),
            logical_ids: Default::default(),
            placeholders: Default::default(),
        }
    }

    /// Rename resources: references to an old logical ID point to the new one
    pub fn with_logical_id_map<K, V>(mut self, logical_ids: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (old, new) in logical_ids {
            let (old, new) = (old.into(), new.into());
            self.ctx.set_resource_rename(old.clone(), new.clone());
            self.logical_ids.insert(old, new);
        }
        self
    }

    pub fn with_placeholders<V>(mut self, placeholders: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        self.placeholders
            .extend(placeholders.into_iter().map(Into::into));
        self
    }

    pub fn with_dependency_tracker(mut self, dependencies: DependencyTracker) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn context(&self) -> &ResolveContext {
        &self.ctx
    }

    /// Feed parameters or resource attributes between passes
    pub fn context_mut(&mut self) -> &mut ResolveContext {
        &mut self.ctx
    }

    pub fn dependencies(&self) -> &DependencyTracker {
        &self.dependencies
    }

    pub fn into_dependencies(self) -> DependencyTracker {
        self.dependencies
    }

    pub fn resolve(&mut self, value: &Value) -> Result<Resolution, IntrinsicError> {
        self.resolve_at(&Path::root(), value)
    }

    /// Resolve a value found at `path`
    ///
    /// Dependencies are only recorded below `Resources.<id>`, where `<id>` is the logical ID after renaming.
    pub fn resolve_at(&mut self, path: &Path, value: &Value) -> Result<Resolution, IntrinsicError> {
        self.walk().resolve(path, value)
    }

    fn walk(&mut self) -> Walk<'_> {
        Walk {
            registry: &self.registry,
            ctx: &self.ctx,
            logical_ids: Some(&self.logical_ids),
            placeholders: &self.placeholders,
            dependencies: Some(&mut self.dependencies),
        }
    }

    fn rename(&self, logical_id: &str) -> String {
        LogicalIdRewriter::new(&self.logical_ids).rename(logical_id)
    }

    /// Resolve a whole template
    ///
    /// - `Metadata` and `Conditions` are resolved
    /// - `Resources`: `Properties`, `Metadata` and `UpdatePolicy` are resolved, logical IDs and `DependsOn` renamed
    /// - `Outputs`: `Value` and `Export.Name` are resolved
    /// - everything else (`Parameters`, `Mappings`, `Globals`, ...) is copied
    pub fn resolve_template(&mut self, template: &Template) -> Result<Value, IntrinsicError> {
        let mut output = IndexMap::new();

        for (section, value) in template.sections() {
            let path = Path::root().join(section);
            let resolved = match (section, value) {
                ("Metadata" | "Conditions", value) => self.resolve_at(&path, value)?.into_value(),
                ("Resources", Value::Object(resources)) => {
                    Some(self.resolve_resources(&path, resources)?)
                }
                ("Outputs", Value::Object(outputs)) => Some(self.resolve_outputs(&path, outputs)?),
                (_, value) => Some(value.clone()),
            };

            if let Some(resolved) = resolved {
                output.insert(section.to_string(), resolved);
            }
        }

        Ok(Value::Object(output))
    }

    fn resolve_resources(
        &mut self,
        path: &Path,
        resources: &IndexMap<String, Value>,
    ) -> Result<Value, IntrinsicError> {
        let mut output = IndexMap::with_capacity(resources.len());

        for (logical_id, resource) in resources {
            let logical_id = self.rename(logical_id);
            let path = path.join(&logical_id);

            let Value::Object(attributes) = resource else {
                output.insert(logical_id, resource.clone());
                continue;
            };

            let mut resolved = IndexMap::with_capacity(attributes.len());
            for (key, value) in attributes {
                let value = match key.as_str() {
                    "Properties" | "Metadata" | "UpdatePolicy" => {
                        self.resolve_at(&path.join(key), value)?.into_value()
                    }
                    "DependsOn" => Some(self.rename_depends_on(value)),
                    _ => Some(value.clone()),
                };

                if let Some(value) = value {
                    resolved.insert(key.clone(), value);
                }
            }

            output.insert(logical_id, Value::Object(resolved));
        }

        Ok(Value::Object(output))
    }

    fn rename_depends_on(&self, depends_on: &Value) -> Value {
        match depends_on {
            Value::String(logical_id) => Value::String(self.rename(logical_id)),
            Value::Array(logical_ids) => Value::Array(
                logical_ids
                    .iter()
                    .map(|logical_id| match logical_id {
                        Value::String(logical_id) => Value::String(self.rename(logical_id)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn resolve_outputs(
        &mut self,
        path: &Path,
        outputs: &IndexMap<String, Value>,
    ) -> Result<Value, IntrinsicError> {
        let mut resolved_outputs = IndexMap::with_capacity(outputs.len());

        for (name, output) in outputs {
            let path = path.join(name);

            let Value::Object(fields) = output else {
                resolved_outputs.insert(name.clone(), output.clone());
                continue;
            };

            let mut resolved = IndexMap::with_capacity(fields.len());
            for (key, value) in fields {
                let value = match (key.as_str(), value) {
                    ("Value", value) => self.resolve_at(&path.join(key), value)?.into_value(),
                    ("Export", Value::Object(export)) => {
                        let mut resolved_export = IndexMap::with_capacity(export.len());
                        for (export_key, export_value) in export {
                            let export_value = match export_key.as_str() {
                                "Name" => self
                                    .resolve_at(&path.join(key).join(export_key), export_value)?
                                    .into_value(),
                                _ => Some(export_value.clone()),
                            };
                            if let Some(export_value) = export_value {
                                resolved_export.insert(export_key.clone(), export_value);
                            }
                        }
                        Some(Value::Object(resolved_export))
                    }
                    _ => Some(value.clone()),
                };

                if let Some(value) = value {
                    resolved.insert(key.clone(), value);
                }
            }

            resolved_outputs.insert(name.clone(), Value::Object(resolved));
        }

        Ok(Value::Object(resolved_outputs))
    }

    /// Resources of the template in an order where dependencies come first
    ///
    /// Without a template, every resource that appears in a recorded dependency is ordered.
    pub fn dependency_order(&self) -> Result<Vec<String>, DependencyError> {
        let resources: Vec<String> = match self.ctx.template().and_then(Template::resources) {
            Some(resources) => resources.keys().map(|id| self.rename(id)).collect(),
            None => self
                .dependencies
                .resources()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        self.dependencies.topological_sort(&resources)
    }
}

/// A single resolution pass over a value tree
pub(crate) struct Walk<'a> {
    registry: &'a Registry,
    ctx: &'a ResolveContext,
    logical_ids: Option<&'a IndexMap<String, String>>,
    placeholders: &'a [Value],
    dependencies: Option<&'a mut DependencyTracker>,
}

impl<'a> Walk<'a> {
    /// Without renaming, placeholders or dependency tracking
    pub(crate) fn plain(registry: &'a Registry, ctx: &'a ResolveContext) -> Self {
        Self {
            registry,
            ctx,
            logical_ids: None,
            placeholders: &[],
            dependencies: None,
        }
    }

    pub(crate) fn resolve(&mut self, path: &Path, value: &Value) -> Result<Resolution, IntrinsicError> {
        if let Some((name, argument)) = value.as_intrinsic() {
            return self.resolve_intrinsic(path, name, argument);
        }

        match value {
            Value::Object(object) => {
                let mut resolved = IndexMap::with_capacity(object.len());
                for (key, value) in object {
                    if let Resolution::Value(value) = self.resolve(&path.join(key), value)? {
                        resolved.insert(key.clone(), value);
                    }
                }
                Ok(Value::Object(resolved).into())
            }
            Value::Array(elements) => {
                let mut resolved = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    if let Resolution::Value(element) = self.resolve(&path.join(index), element)? {
                        resolved.push(element);
                    }
                }
                Ok(Value::Array(resolved).into())
            }
            scalar => Ok(scalar.clone().into()),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(path = %path, function = name))]
    fn resolve_intrinsic(
        &mut self,
        path: &Path,
        name: &str,
        argument: &Value,
    ) -> Result<Resolution, IntrinsicError> {
        let argument = self.rename_logical_ids(argument);

        if name == "Fn::If" {
            return self.resolve_if(path, &argument);
        }

        let Some(argument) = self.resolve(path, &argument)?.into_value() else {
            tracing::debug!(function = name, "argument is AWS::NoValue");
            return Ok(Resolution::NoValue);
        };

        self.invoke(path, name, argument)
    }

    fn rename_logical_ids<'v>(&self, argument: &'v Value) -> Cow<'v, Value> {
        match self.logical_ids {
            Some(logical_ids) if !logical_ids.is_empty() => {
                let mut argument = argument.clone();
                argument.visit_logical_ids_mut(&mut LogicalIdRewriter::new(logical_ids));
                Cow::Owned(argument)
            }
            _ => Cow::Borrowed(argument),
        }
    }

    /// Hand an already resolved argument to its action
    fn invoke(&mut self, path: &Path, name: &str, argument: Value) -> Result<Resolution, IntrinsicError> {
        if DEFERRED.contains(&name) {
            return preserve(name, argument);
        }

        if self.placeholders.contains(&argument) {
            tracing::debug!(function = name, ?argument, "placeholder kept");
            return preserve(name, argument);
        }

        self.record_dependency(path, name, &argument);

        let Some(action) = self.registry.get(name) else {
            tracing::debug!(function = name, "unknown intrinsic function kept");
            return preserve(name, argument);
        };

        tracing::trace!(function = name, "dispatch");
        action
            .resolve(self.ctx, argument)
            .map_err(|error| error.at_path(path))
    }

    fn resolve_if(&mut self, path: &Path, argument: &Value) -> Result<Resolution, IntrinsicError> {
        let Some([condition, if_true, if_false]) = argument.as_array().map(Vec::as_slice) else {
            // malformed, let the action report it
            let Some(argument) = self.resolve(path, argument)?.into_value() else {
                return Ok(Resolution::NoValue);
            };
            return self.invoke(path, "Fn::If", argument);
        };

        let condition = self
            .resolve(path, condition)?
            .into_value()
            .unwrap_or(Value::Null);
        let argument = Value::Array(vec![condition, if_true.clone(), if_false.clone()]);

        let Resolution::Value(output) = self.invoke(path, "Fn::If", argument)? else {
            return Ok(Resolution::NoValue);
        };

        // a branch can never contain the whole `Fn::If`, so this is the kept expression
        let kept = match output.as_intrinsic() {
            Some(("Fn::If", Value::Array(parts))) => match parts.as_slice() {
                [_, kept_true, kept_false] if kept_true == if_true && kept_false == if_false => {
                    Some(parts.clone())
                }
                _ => None,
            },
            _ => None,
        };
        let Some(mut parts) = kept else {
            // the selected branch
            return self.resolve(path, &output);
        };

        // condition unknown until deployment, keep both branches
        for branch in parts.iter_mut().skip(1) {
            *branch = self
                .resolve(path, branch)?
                .into_value()
                .unwrap_or_else(|| Value::intrinsic("Ref", NO_VALUE));
        }

        Ok(Value::intrinsic("Fn::If", parts).into())
    }

    fn record_dependency(&mut self, path: &Path, name: &str, argument: &Value) {
        let Some(source) = path.resource() else {
            return;
        };

        let target = match name {
            "Ref" => argument.as_str().map(str::to_string),
            "Fn::GetAtt" => GetAtt::logical_id(argument).map(str::to_string),
            _ => None,
        };
        let Some(target) = target else {
            return;
        };

        let ctx = self.ctx;
        if ctx.is_pseudo_parameter(&target) || ctx.is_parameter(&target) || !ctx.is_resource(&target)
        {
            return;
        }

        if let Some(dependencies) = self.dependencies.as_deref_mut() {
            dependencies.add_dependency(source, target);
        }
    }
}
