use crate::visit::VisitMut;
use indexmap::IndexMap;

/// Replace logical IDs that a transform renamed
#[derive(derive_new::new)]
pub(crate) struct LogicalIdRewriter<'a> {
    logical_ids: &'a IndexMap<String, String>,
}

impl<'a> VisitMut<String> for LogicalIdRewriter<'a> {
    fn visit_mut(&mut self, logical_id: &mut String) {
        if let Some(new) = self.logical_ids.get(logical_id.as_str()) {
            tracing::trace!(old=%logical_id, %new, "rename logical id");
            logical_id.clone_from(new);
        }
    }
}

impl<'a> LogicalIdRewriter<'a> {
    pub fn rename(&self, logical_id: &str) -> String {
        self.logical_ids
            .get(logical_id)
            .cloned()
            .unwrap_or_else(|| logical_id.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Value;
    use crate::visit::VisitLogicalIdsMut;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rewrites_renamed_ids() {
        let logical_ids = IndexMap::from([("Old".to_string(), "New".to_string())]);
        let mut rewriter = LogicalIdRewriter::new(&logical_ids);

        let mut value: Value = json!(["Old", "Attr"]).into();
        value.visit_logical_ids_mut(&mut rewriter);
        assert_eq!(value, json!(["New", "Attr"]).into());

        let mut value: Value = json!("Other").into();
        value.visit_logical_ids_mut(&mut rewriter);
        assert_eq!(value, json!("Other").into());

        assert_eq!(rewriter.rename("Old"), "New");
        assert_eq!(rewriter.rename("Other"), "Other");
    }
}
