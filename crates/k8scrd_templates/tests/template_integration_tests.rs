//! Integration tests for the template renderer.

use std::collections::BTreeMap;

use k8scrd_templates::{TemplateError, TemplateRenderer};

fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const CRD_TEMPLATE: &str = r#"apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: {{ .plural }}.{{ .group }}
spec:
  group: {{ .group }}
  names:
    kind: {{ .kind }}
    plural: {{ .plural }}
  scope: {{ index . "scope" }}
"#;

#[test]
fn test_render_crd_manifest() {
    let renderer = TemplateRenderer::new();
    let vars = attributes(&[
        ("group", "example.com"),
        ("kind", "Widget"),
        ("plural", "widgets"),
        ("scope", "Namespaced"),
    ]);

    let rendered = renderer.render(CRD_TEMPLATE, Some(&vars)).unwrap();

    assert!(rendered.contains("  name: widgets.example.com\n"));
    assert!(rendered.contains("  group: example.com\n"));
    assert!(rendered.contains("    kind: Widget\n"));
    assert!(rendered.ends_with("  scope: Namespaced\n"));
}

#[test]
fn test_render_is_deterministic() {
    let renderer = TemplateRenderer::new();
    let vars = attributes(&[
        ("group", "example.com"),
        ("kind", "Widget"),
        ("plural", "widgets"),
        ("scope", "Cluster"),
    ]);

    let first = renderer.render(CRD_TEMPLATE, Some(&vars)).unwrap();
    let second = renderer.render(CRD_TEMPLATE, Some(&vars)).unwrap();
    let third = TemplateRenderer::new()
        .render(CRD_TEMPLATE, Some(&vars))
        .unwrap();

    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first, third);
}

#[test]
fn test_extra_attributes_are_ignored() {
    let renderer = TemplateRenderer::new();
    let vars = attributes(&[("name", "alpha"), ("unused", "value")]);

    let rendered = renderer.render("name: {{.name}}", Some(&vars)).unwrap();
    assert_eq!(rendered, "name: alpha");
}

#[test]
fn test_missing_key_fails_without_document() {
    let renderer = TemplateRenderer::new();
    let vars = attributes(&[("group", "example.com")]);

    let result = renderer.render(CRD_TEMPLATE, Some(&vars));
    match result {
        Err(TemplateError::Exec { message, line, .. }) => {
            assert_eq!(line, 4);
            assert_eq!(message, "map has no entry for key \"plural\"");
        }
        other => panic!("expected exec error, got {:?}", other),
    }
}

#[test]
fn test_malformed_template_fails_to_compile() {
    let renderer = TemplateRenderer::new();

    let err = renderer.compile("crd", "kind: Widget\n{{.name").unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.to_string(), "template: crd:2: unclosed action");
}

#[test]
fn test_compiled_template_reuse() {
    let renderer = TemplateRenderer::new();
    let compiled = renderer.compile("widget", "name: {{.name}}").unwrap();

    assert_eq!(compiled.name(), "widget");
    assert_eq!(
        compiled.execute(&attributes(&[("name", "a")])).unwrap(),
        "name: a"
    );
    assert_eq!(
        compiled.execute(&attributes(&[("name", "b")])).unwrap(),
        "name: b"
    );

    let err = compiled.execute(&BTreeMap::new()).unwrap_err();
    assert!(err.to_string().starts_with("template: widget:1:8: executing \"widget\" at <.name>"));
}
