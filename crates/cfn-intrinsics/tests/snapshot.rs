//! Snapshot tests
//!
//! Loads each *.yaml file in /tests/templates/ individually and compares if the
//! expanded template or the resource order changes.

use cfn_intrinsics::{ResolveContext, Resolver, Template};

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFN_INTRINSICS_LOG"))
        .with_writer(std::io::stderr)
        .init();

    insta::glob!("templates/*.yaml", |path| {
        let template = Template::load_file(path).expect("must be a valid template");

        let mut resolver = Resolver::new(ResolveContext::new(Some(&template)));
        let expanded = resolver
            .resolve_template(&template)
            .expect("must resolve");
        let order = resolver.dependency_order().expect("must not contain cycles");

        let snapshot = serde_json::json!({
            "order": order,
            "template": expanded,
        });
        insta::assert_json_snapshot!(snapshot);
    });
}
