//! intrinsics that are always left to CloudFormation
use super::{fixed_array, preserve, Action};
use crate::context::ResolveContext;
use crate::error::IntrinsicError;
use crate::value::{Resolution, Value};

/// A list, or an intrinsic that evaluates to one at deploy time
fn is_list_like(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn check_join(argument: &Value) -> Result<(), IntrinsicError> {
    let [delimiter, list] = fixed_array(Join.name(), argument.clone())?;
    if delimiter.as_str().is_none() {
        return Err(IntrinsicError::structural(
            Join.name(),
            format!("delimiter must be a string, found {}", delimiter.type_name()),
        ));
    }
    if !is_list_like(&list) {
        return Err(IntrinsicError::structural(
            Join.name(),
            format!("values must be a list, found {}", list.type_name()),
        ));
    }
    Ok(())
}

/// `{"Fn::Join": [delimiter, [values...]]}`
pub struct Join;

impl Action for Join {
    fn name(&self) -> &'static str {
        "Fn::Join"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        check_join(&argument)?;
        preserve(self.name(), argument)
    }
}

/// `Fn::Join` that concatenates lists of plain strings right away
///
/// Not registered by default, opt in with [crate::actions::Registry::register].
pub struct EagerJoin;

impl Action for EagerJoin {
    fn name(&self) -> &'static str {
        "Fn::Join"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        check_join(&argument)?;

        if let Some([Value::String(delimiter), Value::Array(values)]) =
            argument.as_array().map(Vec::as_slice)
        {
            let strings: Option<Vec<&str>> = values.iter().map(Value::as_str).collect();
            if let Some(strings) = strings {
                return Ok(Value::String(strings.join(delimiter.as_str())).into());
            }
        }

        preserve(self.name(), argument)
    }
}

/// `{"Fn::Select": [index, [values...]]}`
pub struct Select;

impl Action for Select {
    fn name(&self) -> &'static str {
        "Fn::Select"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let [index, list] = fixed_array(self.name(), argument.clone())?;
        if !matches!(index, Value::Integer(_) | Value::String(_) | Value::Object(_)) {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("index must be an integer, found {}", index.type_name()),
            ));
        }
        if !is_list_like(&list) {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("values must be a list, found {}", list.type_name()),
            ));
        }
        preserve(self.name(), argument)
    }
}

/// `{"Fn::Split": [delimiter, source]}`
pub struct Split;

impl Action for Split {
    fn name(&self) -> &'static str {
        "Fn::Split"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let [delimiter, source] = fixed_array(self.name(), argument.clone())?;
        if delimiter.as_str().is_none() {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("delimiter must be a string, found {}", delimiter.type_name()),
            ));
        }
        if !matches!(source, Value::String(_) | Value::Object(_)) {
            return Err(IntrinsicError::structural(
                self.name(),
                format!("source must be a string, found {}", source.type_name()),
            ));
        }
        preserve(self.name(), argument)
    }
}

/// `{"Fn::Base64": value}`
pub struct Base64;

impl Action for Base64 {
    fn name(&self) -> &'static str {
        "Fn::Base64"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        preserve(self.name(), argument)
    }
}

/// `{"Fn::GetAZs": region}`
pub struct GetAZs;

impl Action for GetAZs {
    fn name(&self) -> &'static str {
        "Fn::GetAZs"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        preserve(self.name(), argument)
    }
}

/// `{"Fn::ImportValue": exportName}`
pub struct ImportValue;

impl Action for ImportValue {
    fn name(&self) -> &'static str {
        "Fn::ImportValue"
    }

    fn resolve(&self, _: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        preserve(self.name(), argument)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::actions::test::{resolve, resolved};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn join_is_preserved_with_resolved_values() {
        let ctx = ResolveContext::default();
        assert_eq!(
            resolved(&ctx, json!({"Fn::Join": [":", ["a", {"Ref": "AWS::Region"}]]})),
            json!({"Fn::Join": [":", ["a", "us-east-1"]]}).into()
        );
        assert_eq!(
            resolved(&ctx, json!({"Fn::Join": [",", {"Ref": "Subnets"}]})),
            json!({"Fn::Join": [",", {"Ref": "Subnets"}]}).into()
        );
    }

    #[test]
    fn eager_join() {
        let ctx = ResolveContext::default();
        assert_eq!(
            EagerJoin.resolve(&ctx, json!(["-", ["a", "b", "c"]]).into()),
            Ok(Resolution::Value("a-b-c".into()))
        );
        assert_eq!(
            EagerJoin.resolve(&ctx, json!(["-", ["a", {"Ref": "X"}]]).into()),
            Ok(Resolution::Value(
                json!({"Fn::Join": ["-", ["a", {"Ref": "X"}]]}).into()
            ))
        );
    }

    #[test]
    fn shapes_are_validated() {
        let ctx = ResolveContext::default();
        assert!(resolve(&ctx, json!({"Fn::Join": ["-"]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Join": [1, ["a"]]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Join": ["-", "a"]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Select": [0]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Select": [true, ["a"]]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Split": [",", 1]})).is_err());
        assert!(resolve(&ctx, json!({"Fn::Split": ","})).is_err());
    }

    #[test]
    fn select_and_split_are_preserved() {
        let ctx = ResolveContext::default();
        let select = json!({"Fn::Select": [0, ["a", "b"]]});
        assert_eq!(resolved(&ctx, select.clone()), select.into());

        let split = json!({"Fn::Split": [",", "a,b"]});
        assert_eq!(resolved(&ctx, split.clone()), split.into());
    }

    #[test]
    fn opaque_intrinsics_are_preserved() {
        let ctx = ResolveContext::default();
        for value in [
            json!({"Fn::Base64": {"Fn::Sub": "echo ${AWS::Region}"}}),
            json!({"Fn::GetAZs": ""}),
            json!({"Fn::ImportValue": "shared-vpc"}),
        ] {
            let name = value.as_object().unwrap().keys().next().unwrap().clone();
            let output = resolved(&ctx, value);
            assert_eq!(
                output.as_intrinsic().map(|(n, _)| n.to_string()),
                Some(name)
            );
        }
    }
}
