//! Mode-specific rendering tests

use std::sync::Arc;

use super::helpers::{context, render, render_with, simple_context};
use crate::escape;
use crate::options::Options;
use serde_json::{json, Value};

#[test]
fn test_escaped_mode_escapes_html_entities() {
    let ctx = simple_context();
    assert_eq!(
        render("<%= html %>", &ctx).unwrap(),
        "&amp;nbsp;&lt;script&gt;"
    );
}

#[test]
fn test_escaped_mode_escapes_quotes() {
    let ctx = context(json!({"q": "The Jones's \"house\""}));
    assert_eq!(
        render("<%= q %>", &ctx).unwrap(),
        "The Jones&#39;s &#34;house&#34;"
    );
}

#[test]
fn test_raw_mode_does_not_escape() {
    let ctx = simple_context();
    assert_eq!(render("<%- html %>", &ctx).unwrap(), "&nbsp;<script>");
}

#[test]
fn test_comment_renders_nothing() {
    let ctx = simple_context();
    assert_eq!(render("a<%# ignore me %>b", &ctx).unwrap(), "ab");
}

#[test]
fn test_literal_escape_renders_open_tag() {
    let ctx = simple_context();
    assert_eq!(render("<%% body %>", &ctx).unwrap(), "<% body %>");
}

#[test]
fn test_lone_literal_escape_degrades_to_open_tag() {
    let ctx = simple_context();
    assert_eq!(render("<%%", &ctx).unwrap(), "<%");
    assert_eq!(render("a<%%b", &ctx).unwrap(), "a<%b");
}

#[test]
fn test_literal_escape_respects_delimiter() {
    let ctx = simple_context();
    let opts = Options::default().with_delimiter('?');
    assert_eq!(render_with("<??", &ctx, opts).unwrap(), "<?");
}

#[test]
fn test_custom_escape_function() {
    let ctx = context(json!({"name": "geddy"}));
    let mut opts = Options::default();
    opts.escape = Arc::new(|value: &Value| escape::stringify(value).to_uppercase());
    assert_eq!(render_with("<%= name %>", &ctx, opts).unwrap(), "GEDDY");
}

#[test]
fn test_custom_escape_does_not_touch_raw_output() {
    let ctx = context(json!({"name": "geddy"}));
    let mut opts = Options::default();
    opts.escape = Arc::new(|value: &Value| escape::stringify(value).to_uppercase());
    assert_eq!(render_with("<%- name %>", &ctx, opts).unwrap(), "geddy");
}
