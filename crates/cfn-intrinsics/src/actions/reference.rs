use super::{preserve, Action};
use crate::context::{ResolveContext, NO_VALUE};
use crate::error::IntrinsicError;
use crate::value::{Resolution, Value};

/// `{"Ref": name}`
///
/// Pseudo-parameters and parameters with a value resolve, everything else is left to CloudFormation.
pub struct Ref;

impl Action for Ref {
    fn name(&self) -> &'static str {
        "Ref"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let Value::String(name) = &argument else {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("argument must be a string, found {}", argument.type_name()),
            ));
        };

        if name == NO_VALUE {
            return Ok(Resolution::NoValue);
        }

        if let Some(value) = ctx.pseudo_parameter(name) {
            return Ok(Value::from(value).into());
        }

        if let Some(value) = ctx.parameter(name) {
            return Ok(value.clone().into());
        }

        if ctx.is_parameter(name) || ctx.is_resource(name) {
            tracing::debug!(%name, "reference resolved at deploy time");
        } else {
            tracing::debug!(%name, "unknown reference");
        }

        preserve(self.name(), argument)
    }
}
