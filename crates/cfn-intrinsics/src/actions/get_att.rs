use super::{preserve, Action};
use crate::context::ResolveContext;
use crate::error::{IntrinsicError, Missing};
use crate::value::{Resolution, Value};

/// `{"Fn::GetAtt": [logicalId, attribute, ...]}` or `{"Fn::GetAtt": "logicalId.attribute"}`
pub struct GetAtt;

impl GetAtt {
    /// Logical ID the argument points at, whatever state the attribute name is in
    pub fn logical_id(argument: &Value) -> Option<&str> {
        match argument {
            Value::String(short_form) => short_form.split_once('.').map(|(logical_id, _)| logical_id),
            Value::Array(parts) => parts.first()?.as_str(),
            _ => None,
        }
    }

    /// Long form whose attribute name is still an intrinsic, e.g. `["Bucket", {"Ref": "AttributeName"}]`
    fn has_pending_attribute(argument: &Value) -> bool {
        match argument.as_array().map(Vec::as_slice) {
            Some([Value::String(_), attribute @ ..]) => attribute
                .iter()
                .any(|part| matches!(part, Value::Object(_))),
            _ => false,
        }
    }

    /// Logical ID and (dot-joined) attribute name
    pub fn target(argument: &Value) -> Result<(String, String), IntrinsicError> {
        let malformed = |reason: String| IntrinsicError::structural("Fn::GetAtt", reason);

        match argument {
            Value::String(short_form) => match short_form.split_once('.') {
                Some((logical_id, attribute)) if !logical_id.is_empty() && !attribute.is_empty() => {
                    Ok((logical_id.to_string(), attribute.to_string()))
                }
                _ => Err(malformed(format!(
                    "expected \"LogicalId.Attribute\", found \"{short_form}\""
                ))),
            },
            Value::Array(parts) if parts.len() >= 2 => {
                let mut parts = parts.iter().map(|part| {
                    part.as_str().ok_or_else(|| {
                        malformed(format!("elements must be strings, found {}", part.type_name()))
                    })
                });
                // at least two elements, checked above
                let logical_id = parts.next().unwrap_or(Ok(""))?;
                let attribute = parts.collect::<Result<Vec<_>, _>>()?.join(".");
                Ok((logical_id.to_string(), attribute))
            }
            Value::Array(parts) => Err(malformed(format!(
                "expected at least 2 elements, found {}",
                parts.len()
            ))),
            other => Err(malformed(format!(
                "argument must be a string or an array, found {}",
                other.type_name()
            ))),
        }
    }
}

impl Action for GetAtt {
    fn name(&self) -> &'static str {
        "Fn::GetAtt"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let declared = |logical_id: &str| {
            if ctx.template().is_some() && !ctx.is_resource(logical_id) {
                return Err(IntrinsicError::lookup(
                    "Fn::GetAtt",
                    Missing::Resource(logical_id.to_string()),
                ));
            }
            Ok(())
        };

        if Self::has_pending_attribute(&argument) {
            if let Some(logical_id) = Self::logical_id(&argument) {
                declared(logical_id)?;
            }
            tracing::debug!(?argument, "attribute name resolved at deploy time");
            return preserve(self.name(), argument);
        }

        let (logical_id, attribute) = Self::target(&argument)?;
        declared(&logical_id)?;

        if let Some(value) = ctx.resource_attribute(&logical_id, &attribute) {
            return Ok(value.clone().into());
        }

        tracing::debug!(%logical_id, %attribute, "attribute resolved at deploy time");
        preserve(self.name(), vec![logical_id, attribute].into())
    }
}
