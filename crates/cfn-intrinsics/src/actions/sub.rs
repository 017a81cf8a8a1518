use super::{fixed_array, Action};
use crate::context::ResolveContext;
use crate::error::IntrinsicError;
use crate::value::{Resolution, Value};
use indexmap::IndexMap;

/// `{"Fn::Sub": template}` or `{"Fn::Sub": [template, variables]}`
///
/// Variables are looked up in order:
/// 1. the local variables of the array form
/// 2. `${Resource.Attribute}` in the cached resource attributes
/// 3. pseudo-parameters
/// 4. parameters
///
/// Anything else stays in the template and the intrinsic is kept, carrying only the local variables that are still
/// needed.
pub struct Sub;

impl Action for Sub {
    fn name(&self) -> &'static str {
        "Fn::Sub"
    }

    fn resolve(&self, ctx: &ResolveContext, argument: Value) -> Result<Resolution, IntrinsicError> {
        let (template, variables) = match argument {
            Value::String(template) => (template, None),
            array @ Value::Array(_) => {
                match fixed_array(self.name(), array)? {
                    [Value::String(template), Value::Object(variables)] => {
                        (template, Some(variables))
                    }
                    [Value::String(_), variables] => {
                        return Err(IntrinsicError::structural(
                            self.name(),
                            format!("variables must be an object, found {}", variables.type_name()),
                        ))
                    }
                    [template, _] => {
                        return Err(IntrinsicError::structural(
                            self.name(),
                            format!("template must be a string, found {}", template.type_name()),
                        ))
                    }
                }
            }
            other => {
                return Err(IntrinsicError::structural(
                    self.name(),
                    format!(
                        "argument must be a string or an array, found {}",
                        other.type_name()
                    ),
                ))
            }
        };

        let segments = parse(&template);
        let mut unresolved: Vec<&str> = vec![];
        let mut values: Vec<Option<String>> = Vec::with_capacity(segments.len());

        for segment in &segments {
            let Segment::Variable(name) = segment else {
                values.push(None);
                continue;
            };

            let value = lookup(ctx, variables.as_ref(), name);
            if value.is_none() && !unresolved.contains(name) {
                unresolved.push(*name);
            }
            values.push(value);
        }

        let fully_resolved = unresolved.is_empty();
        let mut output = String::with_capacity(template.len());
        for (segment, value) in segments.iter().zip(values) {
            match (segment, value) {
                (Segment::Literal(text), _) => output.push_str(text),
                (Segment::Escaped(text), _) if fully_resolved => {
                    output.push_str("${");
                    output.push_str(text);
                    output.push('}');
                }
                (Segment::Escaped(text), _) => {
                    output.push_str("${!");
                    output.push_str(text);
                    output.push('}');
                }
                (Segment::Variable(_), Some(value)) => output.push_str(&value),
                (Segment::Variable(name), None) => {
                    output.push_str("${");
                    output.push_str(name);
                    output.push('}');
                }
            }
        }

        if fully_resolved {
            return Ok(Value::String(output).into());
        }

        tracing::debug!(?unresolved, "Fn::Sub resolved at deploy time");

        let Some(variables) = variables else {
            return Ok(Value::intrinsic(self.name(), output).into());
        };

        let remaining: IndexMap<String, Value> = variables
            .into_iter()
            .filter(|(name, _)| unresolved.contains(&name.as_str()))
            .collect();

        Ok(Value::intrinsic(
            self.name(),
            vec![Value::String(output), Value::Object(remaining)],
        )
        .into())
    }
}

fn lookup(
    ctx: &ResolveContext,
    variables: Option<&IndexMap<String, Value>>,
    name: &str,
) -> Option<String> {
    if let Some(value) = variables.and_then(|vars| vars.get(name)) {
        // a local variable that is still an intrinsic has no string form
        return value.to_sub_string();
    }

    if let Some((logical_id, attribute)) = name.split_once('.') {
        return ctx
            .resource_attribute(logical_id, attribute)
            .and_then(Value::to_sub_string);
    }

    if let Some(value) = ctx.pseudo_parameter(name) {
        return Some(value.to_string());
    }

    if let Some(value) = ctx.parameter(name) {
        return value.to_sub_string();
    }

    if ctx.is_parameter(name) || ctx.is_resource(name) {
        tracing::trace!(name, "deploy-time Fn::Sub variable");
    } else {
        tracing::trace!(name, "unknown Fn::Sub variable");
    }

    None
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    /// `${!Text}`, rendered as `${Text}`
    Escaped(&'a str),
    Variable(&'a str),
}

/// Split a `Fn::Sub` template into literals and `${...}` placeholders
///
/// An unterminated `${` is literal text.
fn parse(template: &str) -> Vec<Segment<'_>> {
    let mut segments = vec![];
    let mut remaining = template;

    while let Some(start) = remaining.find("${") {
        let (before, after) = remaining.split_at(start);
        let Some(end) = after.find('}') else {
            break;
        };

        if !before.is_empty() {
            segments.push(Segment::Literal(before));
        }

        let inner = &after[2..end];
        match inner.strip_prefix('!') {
            Some(escaped) => segments.push(Segment::Escaped(escaped)),
            None => segments.push(Segment::Variable(inner.trim())),
        }
        remaining = &after[end + 1..];
    }

    if !remaining.is_empty() {
        segments.push(Segment::Literal(remaining));
    }

    segments
}
