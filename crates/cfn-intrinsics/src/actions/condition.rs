use super::{fixed_array, preserve, Action};
use crate::context::ResolveContext;
use crate::error::IntrinsicError;
use crate::value::{Resolution, Value};

/// `{"Fn::If": [conditionName, valueIfTrue, valueIfFalse]}`
///
/// Returns the selected branch as given, the resolver evaluates it afterwards.
pub struct If;

impl Action for If {
    fn name(&self) -> &'static str {
        "Fn::If"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let [condition, if_true, if_false] = fixed_array(self.name(), argument)?;

        let Value::String(name) = condition else {
            return Err(IntrinsicError::structural(
                self.name(),
                "condition name must be a string",
            ));
        };

        match ctx.condition(&name) {
            Some(true) => Ok(if_true.into()),
            Some(false) => Ok(if_false.into()),
            None => {
                tracing::debug!(%name, "condition resolved at deploy time");
                preserve(self.name(), vec![Value::String(name), if_true, if_false].into())
            }
        }
    }
}

/// `{"Condition": conditionName}`
pub struct Condition;

impl Action for Condition {
    fn name(&self) -> &'static str {
        "Condition"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let Value::String(name) = &argument else {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("argument must be a string, found {}", argument.type_name()),
            ));
        };

        match ctx.condition(name) {
            Some(value) => Ok(Value::Boolean(value).into()),
            None => preserve(self.name(), argument),
        }
    }
}
