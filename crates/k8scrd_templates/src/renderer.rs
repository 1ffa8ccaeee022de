//! Template compilation and rendering.
//!
//! Templates use the placeholder subset of Go's `text/template` syntax so that
//! resource templates written for other Kubernetes tooling render unchanged:
//!
//! - `{{.name}}` or `{{ .name }}` looks up an attribute
//! - `{{ index . "some-key" }}` looks up keys that are not identifiers
//! - `{{ . }}` prints the whole attribute map
//! - `{{ "literal" }}` emits a string constant (useful for a literal `{{`)
//! - `{{/* comment */}}` is dropped
//! - `{{- ` and ` -}}` trim surrounding whitespace
//!
//! Lookups are strict: referencing a key that is not in the attribute map is
//! an execution error rather than an empty string.
//!
//! Chained fields such as `{{.a.b}}` and number literals such as `{{ 3 }}`
//! are not supported and fail at parse time.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{TemplateError, TemplateResult};

/// Name given to templates rendered through [`TemplateRenderer::render`].
pub const DEFAULT_TEMPLATE_NAME: &str = "crd";

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Lookup {
        key: String,
        action: String,
        line: usize,
        column: usize,
    },
    Dot,
}

/// A parsed template, ready to be executed against attribute maps.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    name: String,
    nodes: Vec<Node>,
}

impl CompiledTemplate {
    /// Template name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against an attribute map.
    pub fn execute(&self, attributes: &BTreeMap<String, String>) -> TemplateResult<String> {
        let mut output = String::new();

        for node in &self.nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Lookup {
                    key,
                    action,
                    line,
                    column,
                } => {
                    let value = attributes.get(key).ok_or_else(|| TemplateError::Exec {
                        name: self.name.clone(),
                        line: *line,
                        column: *column,
                        action: action.clone(),
                        message: format!("map has no entry for key \"{}\"", key),
                    })?;
                    output.push_str(value);
                }
                Node::Dot => output.push_str(&format_map(attributes)),
            }
        }

        Ok(output)
    }
}

/// Template renderer for resource documents.
pub struct TemplateRenderer {
    field_pattern: Regex,
    index_pattern: Regex,
    literal_pattern: Regex,
    word_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self {
            // Match .field_name
            field_pattern: Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$")
                .expect("field pattern is valid"),
            // Match index . "key" and index . `key`
            index_pattern: Regex::new(r#"^index\s+\.\s+("(?:[^"\\]|\\.)*"|`[^`]*`)$"#)
                .expect("index pattern is valid"),
            literal_pattern: Regex::new(r#"^("(?:[^"\\]|\\.)*"|`[^`]*`)$"#)
                .expect("literal pattern is valid"),
            word_pattern: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)").expect("word pattern is valid"),
        }
    }

    /// Render `template` against `attributes`.
    ///
    /// A missing attribute map renders as an empty one, so only templates
    /// without lookups succeed in that case.
    pub fn render(
        &self,
        template: &str,
        attributes: Option<&BTreeMap<String, String>>,
    ) -> TemplateResult<String> {
        let compiled = self.compile(DEFAULT_TEMPLATE_NAME, template)?;

        let empty = BTreeMap::new();
        let attributes = attributes.unwrap_or(&empty);
        for (key, value) in attributes {
            trace!("adding element {} => {}", key, value);
        }

        let rendered = compiled.execute(attributes)?;
        debug!("template after applying values: {}", rendered);
        Ok(rendered)
    }

    /// Parse a template without executing it.
    pub fn compile(&self, name: &str, template: &str) -> TemplateResult<CompiledTemplate> {
        let mut nodes = Vec::new();
        let mut pos = 0;
        let mut trim_next_text = false;

        loop {
            let Some(offset) = template[pos..].find(LEFT_DELIM) else {
                push_text(&mut nodes, &template[pos..], trim_next_text, false);
                break;
            };

            let open = pos + offset;
            let line = line_at(template, open);
            let mut cursor = open + LEFT_DELIM.len();

            let trim_left = has_trim_marker(&template[cursor..]);
            if trim_left {
                cursor += 2;
            }
            push_text(&mut nodes, &template[pos..open], trim_next_text, trim_left);

            // Comments may contain the closing delimiter, so they are scanned first.
            if template[cursor..].starts_with("/*") {
                let Some(end) = template[cursor + 2..].find("*/") else {
                    return Err(parse_error(name, line, "unclosed comment"));
                };
                let after_comment = cursor + 2 + end + 2;
                let tail = &template[after_comment..];
                let (trim_right, consumed) = if tail.starts_with(RIGHT_DELIM) {
                    (false, RIGHT_DELIM.len())
                } else {
                    let trimmed = tail.trim_start_matches(is_space);
                    if trimmed.len() < tail.len() && trimmed.starts_with("-}}") {
                        (true, tail.len() - trimmed.len() + 3)
                    } else {
                        return Err(parse_error(
                            name,
                            line,
                            "comment ends before closing delimiter",
                        ));
                    }
                };
                trim_next_text = trim_right;
                pos = after_comment + consumed;
                continue;
            }

            let Some(close_offset) = template[cursor..].find(RIGHT_DELIM) else {
                return Err(parse_error(name, line, "unclosed action"));
            };
            let close = cursor + close_offset;
            let mut body = &template[cursor..close];

            let trim_right = body.ends_with('-') && body[..body.len() - 1].ends_with(is_space);
            if trim_right {
                body = &body[..body.len() - 1];
            }

            let leading = body.len() - body.trim_start_matches(is_space).len();
            let action_start = cursor + leading;
            let column = action_start - line_start(template, action_start);

            nodes.push(self.parse_action(name, line, column, body.trim_matches(is_space))?);

            trim_next_text = trim_right;
            pos = close + RIGHT_DELIM.len();
        }

        Ok(CompiledTemplate {
            name: name.to_string(),
            nodes: merge_text(nodes),
        })
    }

    fn parse_action(
        &self,
        name: &str,
        line: usize,
        column: usize,
        action: &str,
    ) -> TemplateResult<Node> {
        if action.is_empty() {
            return Err(parse_error(name, line, "missing value for command"));
        }

        if action == "." {
            return Ok(Node::Dot);
        }

        if let Some(caps) = self.field_pattern.captures(action) {
            return Ok(Node::Lookup {
                key: caps[1].to_string(),
                action: action.to_string(),
                line,
                column,
            });
        }

        if let Some(caps) = self.index_pattern.captures(action) {
            let key = unquote(&caps[1]).map_err(|msg| parse_error(name, line, &msg))?;
            return Ok(Node::Lookup {
                key,
                action: action.to_string(),
                line,
                column,
            });
        }

        if let Some(caps) = self.literal_pattern.captures(action) {
            let text = unquote(&caps[1]).map_err(|msg| parse_error(name, line, &msg))?;
            return Ok(Node::Text(text));
        }

        let message = match self.word_pattern.captures(action) {
            Some(caps) if &caps[1] != "index" => format!("function \"{}\" not defined", &caps[1]),
            _ => format!("unexpected \"{}\" in command", action),
        };
        Err(parse_error(name, line, &message))
    }
}

fn parse_error(name: &str, line: usize, message: &str) -> TemplateError {
    TemplateError::Parse {
        name: name.to_string(),
        line,
        message: message.to_string(),
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// `{{- ` trims only when the dash is followed by whitespace.
fn has_trim_marker(after_delim: &str) -> bool {
    let mut chars = after_delim.chars();
    chars.next() == Some('-') && chars.next().is_some_and(is_space)
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start_matches(is_space);
    }
    if trim_end {
        text = text.trim_end_matches(is_space);
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match (merged.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(next)) => prev.push_str(&next),
            (_, node) => merged.push(node),
        }
    }
    merged
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn unquote(quoted: &str) -> Result<String, String> {
    if let Some(raw) = quoted.strip_prefix('`') {
        return Ok(raw.strip_suffix('`').unwrap_or(raw).to_string());
    }

    let inner = &quoted[1..quoted.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            _ => return Err(format!("invalid syntax in quoted string {}", quoted)),
        }
    }
    Ok(result)
}

/// Format a map the way Go's fmt prints `map[string]string`.
fn format_map(attributes: &BTreeMap<String, String>) -> String {
    let entries: Vec<String> = attributes
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect();
    format!("map[{}]", entries.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_field_lookup() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("name", "alpha")]);

        let rendered = renderer
            .render("kind: Widget\nname: {{.name}}\n", Some(&vars))
            .unwrap();
        assert_eq!(rendered, "kind: Widget\nname: alpha\n");
    }

    #[test]
    fn test_render_spaced_and_index_lookups() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("app-name", "web"), ("replicas", "3")]);

        let rendered = renderer
            .render("{{ index . \"app-name\" }}/{{ .replicas }}", Some(&vars))
            .unwrap();
        assert_eq!(rendered, "web/3");
    }

    #[test]
    fn test_raw_string_index() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("a.b", "x")]);
        let rendered = renderer.render("{{index . `a.b`}}", Some(&vars)).unwrap();
        assert_eq!(rendered, "x");
    }

    #[test]
    fn test_trim_markers() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("a", "1"), ("b", "2")]);

        let rendered = renderer
            .render("x  {{- .a -}}  \n  {{.b}}", Some(&vars))
            .unwrap();
        assert_eq!(rendered, "x12");
    }

    #[test]
    fn test_dash_without_space_is_not_trim() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render("a {{-x}}", None).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_comments_are_dropped() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render("a{{/* ignore }} me */}}b {{- /* gone */ -}} c", None)
            .unwrap();
        assert_eq!(rendered, "abc");
    }

    #[test]
    fn test_string_literal_action() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render("{{\"{{\"}}.name}}", None).unwrap();
        assert_eq!(rendered, "{{.name}}");
    }

    #[test]
    fn test_dot_prints_sorted_map() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("b", "2"), ("a", "1")]);
        assert_eq!(renderer.render("{{.}}", Some(&vars)).unwrap(), "map[a:1 b:2]");
        assert_eq!(renderer.render("{{ . }}", None).unwrap(), "map[]");
    }

    #[test]
    fn test_unclosed_action_is_parse_error() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render("{{.name", None).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Parse {
                name: "crd".to_string(),
                line: 1,
                message: "unclosed action".to_string(),
            }
        );
        assert_eq!(err.to_string(), "template: crd:1: unclosed action");
    }

    #[test]
    fn test_parse_error_messages() {
        let renderer = TemplateRenderer::new();

        let err = renderer.render("ok\n{{ }}", None).unwrap_err();
        assert_eq!(err.to_string(), "template: crd:2: missing value for command");

        let err = renderer.render("{{ printf \"%s\" .a }}", None).unwrap_err();
        assert!(err.to_string().contains("function \"printf\" not defined"));

        let err = renderer.render("{{/* open", None).unwrap_err();
        assert!(err.to_string().contains("unclosed comment"));

        let err = renderer.render("{{/* c */ x}}", None).unwrap_err();
        assert!(err.to_string().contains("comment ends before closing delimiter"));
    }

    #[test]
    fn test_missing_key_is_exec_error() {
        let renderer = TemplateRenderer::new();
        let vars = attrs(&[("other", "x")]);

        let err = renderer
            .render("kind: Widget\nname: {{.name}}\n", Some(&vars))
            .unwrap_err();
        assert!(err.is_exec());
        assert_eq!(
            err.to_string(),
            "template: crd:2:8: executing \"crd\" at <.name>: map has no entry for key \"name\""
        );
    }

    #[test]
    fn test_missing_attribute_map() {
        let renderer = TemplateRenderer::new();
        assert_eq!(renderer.render("static: true\n", None).unwrap(), "static: true\n");
        assert!(renderer.render("{{.name}}", None).unwrap_err().is_exec());
    }

    #[test]
    fn test_chained_fields_and_numbers_are_rejected() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.compile("t", "{{.a.b}}").unwrap_err().is_parse());
        assert!(renderer.compile("t", "{{ 3 }}").unwrap_err().is_parse());
    }
}
