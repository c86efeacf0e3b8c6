//! Integration tests for includes resolved from disk

use std::fs;

use serde_json::json;
use stencil::{Engine, Options, StencilError, TemplateContext};
use stencil_testkit::{temp_dir_in_workspace, write_template};

fn ctx(data: serde_json::Value) -> TemplateContext {
    TemplateContext::from_serialize(&data).unwrap()
}

#[test]
fn static_include_from_disk() {
    let tmp = temp_dir_in_workspace();
    write_template(tmp.path(), "header.stencil", "== <%= title %> ==\n");
    let page = write_template(tmp.path(), "page.stencil", "<% include header %>body");

    let engine = Engine::new();
    let out = engine
        .render_file(&page, &ctx(json!({"title": "News"})), Options::default())
        .unwrap();
    assert_eq!(out, "== News ==\nbody");
}

#[test]
fn compiled_file_exposes_dependencies() {
    let tmp = temp_dir_in_workspace();
    let header = write_template(tmp.path(), "header.stencil", "H");
    let page = write_template(tmp.path(), "page.stencil", "<% include header %>");

    let engine = Engine::new();
    let program = engine.compile_file(&page, Options::default()).unwrap();
    assert_eq!(program.dependencies(), [header]);
}

#[test]
fn static_include_survives_file_change_until_recompiled() {
    let tmp = temp_dir_in_workspace();
    let header = write_template(tmp.path(), "header.stencil", "old");
    let page = write_template(tmp.path(), "page.stencil", "<% include header %>");

    let engine = Engine::new();
    let program = engine.compile_file(&page, Options::default()).unwrap();
    let data = ctx(json!({}));
    let eval = stencil::DefaultEvaluator::new();
    let fs_collab = stencil::OsFileSystem::new();

    assert_eq!(program.render(&data, &eval, &fs_collab).unwrap(), "old");
    fs::write(&header, "new").unwrap();
    assert_eq!(program.render(&data, &eval, &fs_collab).unwrap(), "old");

    let recompiled = engine.compile_file(&page, Options::default()).unwrap();
    assert_eq!(recompiled.render(&data, &eval, &fs_collab).unwrap(), "new");
}

#[test]
fn inline_include_reads_file_at_render_time() {
    let tmp = temp_dir_in_workspace();
    let partial = write_template(tmp.path(), "partial.stencil", "old");
    let page = write_template(tmp.path(), "page.stencil", "<%- include('partial') %>");

    let engine = Engine::new();
    let program = engine.compile_file(&page, Options::default()).unwrap();
    let data = ctx(json!({}));
    let eval = stencil::DefaultEvaluator::new();
    let fs_collab = stencil::OsFileSystem::new();

    assert_eq!(program.render(&data, &eval, &fs_collab).unwrap(), "old");
    fs::write(&partial, "new").unwrap();
    assert_eq!(program.render(&data, &eval, &fs_collab).unwrap(), "new");
}

#[test]
fn missing_include_reports_both_files() {
    let tmp = temp_dir_in_workspace();
    let page = write_template(tmp.path(), "page.stencil", "<% include gone %>");

    let engine = Engine::new();
    let err = engine
        .render_file(&page, &ctx(json!({})), Options::default())
        .unwrap_err();
    match err {
        StencilError::IncludeResolveFailed { include, from } => {
            assert_eq!(include, "gone");
            assert_eq!(from, page);
        }
        other => panic!("expected IncludeResolveFailed, got {other:?}"),
    }
}
