#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end generator runs against throwaway project roots.

use std::fs;
use std::path::Path;

use protogen_core::validator::{ChannelTable, NoChannels};
use protogen_core::{GeneratorConfig, GeneratorError, OutputWriter, ValidatorKind, compile_source, generate};
use serde_json::json;
use tempfile::TempDir;

const PROTOCOL: &str = r#"
Point:
  type: object
  properties:
    x: number
    y: number

SerializedValue:
  type: object
  properties:
    n: number?
    s: string?

NavigateOptions:
  type: mixin
  properties:
    timeout: number?
    waitUntil:
      type: enum?
      literals:
      - load
      - domcontentloaded

EventTarget:
  type: interface
  commands:
    waitForEventInfo:
      parameters:
        info: string

Frame:
  type: interface
  extends: EventTarget
  initializer:
    url: string
    name: string
    parentFrame: Frame?
  commands:
    goto:
      parameters:
        url: string
        $mixin: NavigateOptions
      returns:
        response: Channel?
      tracing:
        snapshot: true
    click:
      parameters:
        selector: string
        position: Point?
      tracing:
        snapshot: true
        pausesBeforeInput: true
    evaluate:
      parameters:
        expression: string
        arg: SerializedValue
      returns:
        value: SerializedValue
  events:
    loadstate:
      parameters:
        add:
          type: enum?
          literals: [load, networkidle]

Page:
  type: interface
  extends: Frame
  initializer:
    mainFrame: Frame
  commands:
    screenshot:
      parameters:
        type:
          type: enum?
          literals: [png, jpeg]
      returns:
        binary: binary
  events:
    close:
    crash:
"#;

fn write_project(root: &Path, schema: &str) {
    fs::create_dir_all(root.join("protocol")).unwrap();
    fs::create_dir_all(root.join("src/protocol")).unwrap();
    fs::write(root.join("protocol/protocol.yml"), schema).unwrap();
    fs::write(root.join("src/protocol/channels.ts"), "").unwrap();
    fs::write(root.join("src/protocol/validator.ts"), "").unwrap();
}

#[test]
fn test_second_run_reports_no_change() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), PROTOCOL);
    let config = GeneratorConfig::load(dir.path()).unwrap();

    let first = generate(&config, &OutputWriter::new()).unwrap();
    assert!(first.any_changed());
    assert!(first.files.iter().all(|file| file.changed));

    let declarations = fs::read_to_string(&config.declarations).unwrap();
    let second = generate(&config, &OutputWriter::new()).unwrap();
    assert!(!second.any_changed());
    assert_eq!(fs::read_to_string(&config.declarations).unwrap(), declarations);
}

#[test]
fn test_missing_second_target_leaves_first_untouched() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), PROTOCOL);
    fs::remove_file(dir.path().join("src/protocol/validator.ts")).unwrap();
    let config = GeneratorConfig::load(dir.path()).unwrap();

    let err = generate(&config, &OutputWriter::new()).unwrap_err();
    match err {
        GeneratorError::MissingOutputTarget { path } => assert_eq!(path, config.validators),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_to_string(&config.declarations).unwrap(), "");
}

#[test]
fn test_unknown_reference_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        "Page:\n  type: interface\n  initializer:\n    frame: Missing\n",
    );
    let config = GeneratorConfig::load(dir.path()).unwrap();
    let err = generate(&config, &OutputWriter::new()).unwrap_err();
    assert!(matches!(err, GeneratorError::UnknownReference { ref name, .. } if name == "Missing"));
    assert_eq!(fs::read_to_string(&config.declarations).unwrap(), "");
    assert_eq!(fs::read_to_string(&config.validators).unwrap(), "");
}

#[test]
fn test_missing_schema_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let config = GeneratorConfig::load(dir.path()).unwrap();
    let err = generate(&config, &OutputWriter::new()).unwrap_err();
    assert!(matches!(err, GeneratorError::ReadSchema { .. }));
}

#[test]
fn test_parse_error_names_schema_path() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), "Page: [unclosed");
    let config = GeneratorConfig::load(dir.path()).unwrap();
    match generate(&config, &OutputWriter::new()).unwrap_err() {
        GeneratorError::ParseSchema { path, .. } => assert_eq!(path, config.schema),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_declarations_cover_inheritance_and_mixins() {
    let artifacts = compile_source(PROTOCOL, "protocol.yml").unwrap();
    let out = &artifacts.declarations;

    assert!(out.contains("export interface FrameChannel extends FrameEventTarget, EventTargetChannel {"));
    assert!(out.contains("export interface PageChannel extends PageEventTarget, FrameChannel {"));
    assert!(out.contains(
        "export type FrameGotoParams = {\n  url: string,\n  timeout?: number,\n  waitUntil?: \"load\" | \"domcontentloaded\",\n};\n"
    ));
    assert!(out.contains(
        "export type FrameGotoOptions = {\n  timeout?: number,\n  waitUntil?: \"load\" | \"domcontentloaded\",\n};\n"
    ));
    assert!(out.contains("export type FrameGotoResult = {\n  response?: Channel,\n};\n"));
    assert!(out.contains("  parentFrame?: FrameChannel,\n"));
    assert!(out.contains("export type PageScreenshotResult = {\n  binary: Binary,\n};\n"));
    assert!(out.contains("export type PageEvents = PageCloseEvent | PageCrashEvent;\n"));
    assert!(!out.contains("NavigateOptions"));
}

#[test]
fn test_trait_chain_prefers_later_channels() {
    let artifacts = compile_source(PROTOCOL, "protocol.yml").unwrap();
    let out = &artifacts.declarations;
    let page = out.find("T extends PageChannel ? PageInitializer").unwrap();
    let frame = out.find("T extends FrameChannel ? FrameInitializer").unwrap();
    let root = out.find("T extends EventTargetChannel ? EventTargetInitializer").unwrap();
    assert!(page < frame && frame < root);
}

#[test]
fn test_metadata_propagates_to_direct_children_only() {
    let artifacts = compile_source(PROTOCOL, "protocol.yml").unwrap();
    assert_eq!(
        artifacts.metadata.snapshots,
        ["Frame.goto", "Page.goto", "Frame.click", "Page.click"]
    );
    assert_eq!(artifacts.metadata.pauses_before_input, ["Frame.click", "Page.click"]);
    assert!(artifacts.declarations.contains(
        "export const pausesBeforeInputActions = new Set([\"Frame.click\", \"Page.click\"]);\n"
    ));
}

#[test]
fn test_inherited_commands_validate_through_ancestor() {
    let artifacts = compile_source(PROTOCOL, "protocol.yml").unwrap();
    assert!(artifacts.validators.contains("scheme.PageGotoParams = tType(\"FrameGotoParams\");\n"));
    assert!(artifacts.validators.contains(
        "scheme.FrameWaitForEventInfoParams = tType(\"EventTargetWaitForEventInfoParams\");\n"
    ));
    // Grandparent commands are not aliased onto grandchildren
    assert!(!artifacts.registry.contains("PageWaitForEventInfoParams"));

    let registry = &artifacts.registry;
    let params = registry.find_validator("Page", "goto", ValidatorKind::Params).unwrap();
    let ok = registry
        .check(params, Some(&json!({ "url": "https://example.com", "waitUntil": "load" })), &NoChannels)
        .unwrap();
    assert_eq!(ok, Some(json!({ "url": "https://example.com", "waitUntil": "load" })));

    let err = registry
        .validate("PageGotoParams", &json!({ "url": 5 }), &NoChannels)
        .unwrap_err();
    assert_eq!(err.to_string(), "url: expected string, got number");
}

#[test]
fn test_runtime_validation_of_nested_and_channel_values() {
    let artifacts = compile_source(PROTOCOL, "protocol.yml").unwrap();
    let registry = &artifacts.registry;

    let err = registry
        .validate(
            "FrameClickParams",
            &json!({ "selector": "#go", "position": { "x": 1, "y": "2" } }),
            &NoChannels,
        )
        .unwrap_err();
    assert_eq!(err.path, "position.y");

    let mut channels = ChannelTable::new();
    channels.insert("frame@1", "Frame");
    let init = registry
        .validate(
            "PageInitializer",
            &json!({ "mainFrame": { "guid": "frame@1" }, "extra": 1 }),
            &channels,
        )
        .unwrap();
    assert_eq!(init, json!({ "mainFrame": { "guid": "frame@1" } }));
    assert!(registry
        .validate("PageInitializer", &json!({ "mainFrame": { "guid": "page@9" } }), &channels)
        .is_err());

    assert!(registry.validate("PageScreenshotParams", &json!({ "type": "gif" }), &NoChannels).is_err());
    assert!(registry.validate("PageCloseEvent", &json!(null), &NoChannels).is_ok());
}

#[test]
fn test_config_overrides_output_locations() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("schema")).unwrap();
    fs::create_dir_all(dir.path().join("gen")).unwrap();
    fs::write(dir.path().join("schema/api.yml"), PROTOCOL).unwrap();
    fs::write(dir.path().join("gen/channels.ts"), "").unwrap();
    fs::write(dir.path().join("gen/validator.ts"), "").unwrap();
    fs::write(
        dir.path().join("protogen.toml"),
        "[paths]\nschema = \"schema/api.yml\"\ndeclarations = \"gen/channels.ts\"\nvalidators = \"gen/validator.ts\"\n",
    )
    .unwrap();

    let config = GeneratorConfig::load(dir.path()).unwrap();
    let report = generate(&config, &OutputWriter::new().with_diffs(true)).unwrap();
    assert!(report.any_changed());
    assert!(report.files.iter().all(|file| file.diff.is_some()));

    let validators = fs::read_to_string(dir.path().join("gen/validator.ts")).unwrap();
    assert!(validators.starts_with(
        "// This file is generated by protogen from api.yml, do not edit manually.\n"
    ));
}
