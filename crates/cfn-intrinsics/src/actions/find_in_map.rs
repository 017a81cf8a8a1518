use super::{fixed_array, preserve, Action};
use crate::context::ResolveContext;
use crate::error::{IntrinsicError, Missing};
use crate::value::{Resolution, Value};

/// `{"Fn::FindInMap": [mapName, topLevelKey, secondLevelKey]}`
pub struct FindInMap;

impl Action for FindInMap {
    fn name(&self) -> &'static str {
        "Fn::FindInMap"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let keys = fixed_array::<3>(self.name(), argument.clone())?;

        if keys.iter().any(|key| matches!(key, Value::Object(_))) {
            tracing::debug!(?argument, "Fn::FindInMap with unresolved keys");
            return preserve(self.name(), argument);
        }

        let [Value::String(mapping), Value::String(top_level_key), Value::String(key)] = &keys
        else {
            let found = keys
                .iter()
                .find(|key| !matches!(key, Value::String(_)))
                .map_or("string", Value::type_name);
            return Err(IntrinsicError::structural(
                self.name(),
                format!("keys must be strings, found {found}"),
            ));
        };

        let Some(template) = ctx.template() else {
            return preserve(self.name(), argument);
        };

        let missing = |missing: Missing| Err(IntrinsicError::lookup("Fn::FindInMap", missing));

        let Some(map) = template.mapping(mapping) else {
            return missing(Missing::Mapping(mapping.to_string()));
        };
        let Some(map) = map.as_object() else {
            return missing(Missing::NotAMap {
                mapping: mapping.to_string(),
                key: None,
            });
        };
        let Some(inner) = map.get(top_level_key) else {
            return missing(Missing::TopLevelKey {
                mapping: mapping.to_string(),
                key: top_level_key.to_string(),
            });
        };
        let Some(inner) = inner.as_object() else {
            return missing(Missing::NotAMap {
                mapping: mapping.to_string(),
                key: Some(top_level_key.to_string()),
            });
        };
        let Some(value) = inner.get(key) else {
            return missing(Missing::SecondLevelKey {
                mapping: mapping.to_string(),
                top_level_key: top_level_key.to_string(),
                key: key.to_string(),
            });
        };

        Ok(value.clone().into())
    }
}
