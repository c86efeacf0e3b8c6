//! Render-failure diagnostic mapping tests

use std::path::Path;

use super::helpers::{render_with, simple_context};
use crate::options::Options;

const TEMPLATE: &str = "line one\nline two\n<%= missing %>\nline four";

#[test]
fn test_failure_is_mapped_to_the_source_line() {
    let ctx = simple_context();
    let opts = Options::default().with_filename("/views/page.stencil");
    let err = render_with(TEMPLATE, &ctx, opts).unwrap_err();
    let message = err.to_string();

    assert!(message.starts_with("/views/page.stencil:3\n"), "{message}");
    assert!(message.contains(" >> 3| <%= missing %>"), "{message}");
    assert!(message.contains("    1| line one"), "{message}");
    assert!(message.contains("    4| line four"), "{message}");
    assert!(message.contains("missing is not defined"), "{message}");
    assert_eq!(err.path(), Some(Path::new("/views/page.stencil")));
}

#[test]
fn test_default_label_without_filename() {
    let ctx = simple_context();
    let err = render_with(TEMPLATE, &ctx, Options::default()).unwrap_err();
    assert!(err.to_string().starts_with("stencil:3\n"));
    assert!(err.path().is_none());
}

#[test]
fn test_compile_debug_off_passes_error_through() {
    let ctx = simple_context();
    let mut opts = Options::default().with_filename("/views/page.stencil");
    opts.compile_debug = false;
    let err = render_with(TEMPLATE, &ctx, opts).unwrap_err();

    assert_eq!(err.to_string(), "missing is not defined");
    assert!(err.path().is_none());
}

#[test]
fn test_failure_on_first_line_maps_to_line_one() {
    let ctx = simple_context();
    let err = render_with("<%= missing %>\nrest", &ctx, Options::default()).unwrap_err();
    assert!(err.to_string().starts_with("stencil:1\n"));
    assert!(err.to_string().contains(" >> 1| <%= missing %>"));
}
