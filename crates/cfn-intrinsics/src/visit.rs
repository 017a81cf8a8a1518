//! visitor pattern helpers
use crate::value::Value;

/// Visitor that visits is subjects mutably
pub trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}

// blanket impl for FnMut
impl<T, F> VisitMut<T> for F
where
    F: FnMut(&mut T),
{
    fn visit_mut(&mut self, value: &mut T) {
        self(value)
    }
}

/// Visit every string in an intrinsic argument that may name a logical ID
///
/// - the argument itself if it is a string (`Ref`)
/// - the first element of an array (`Fn::GetAtt` long form)
/// - the same, recursively, for every value of an object
///
/// Nested intrinsics are skipped, they rename their own argument when they are resolved.
pub trait VisitLogicalIdsMut {
    fn visit_logical_ids_mut(&mut self, visitor: &mut dyn VisitMut<String>);
}

impl VisitLogicalIdsMut for Value {
    fn visit_logical_ids_mut(&mut self, visitor: &mut dyn VisitMut<String>) {
        if self.as_intrinsic().is_some() {
            return;
        }

        match self {
            Value::String(logical_id) => visitor.visit_mut(logical_id),
            Value::Array(elements) => {
                if let Some(Value::String(logical_id)) = elements.first_mut() {
                    visitor.visit_mut(logical_id);
                }
            }
            Value::Object(object) => {
                for value in object.values_mut() {
                    value.visit_logical_ids_mut(visitor);
                }
            }
            Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Decimal(_) => {}
        }
    }
}
