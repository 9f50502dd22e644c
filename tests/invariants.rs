//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fluentconf_core::{
    ArtifactTargets, ArtifactWriteError, ArtifactWriter, ConfigPipeline, FsArtifactWriter,
    PipelineError, PluginMissingReason, SectionKind, Settings,
};

fn settings_from(pairs: &[(&str, &str)]) -> Settings {
    let source: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_source(&source)
}

fn compile(pairs: &[(&str, &str)]) -> fluentconf_core::CompiledConfig {
    ConfigPipeline::new().compile(&settings_from(pairs)).unwrap()
}

/// Records writes instead of touching the filesystem.
#[derive(Default)]
struct RecordingWriter {
    written: Vec<(PathBuf, String)>,
}

impl ArtifactWriter for RecordingWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), ArtifactWriteError> {
        self.written.push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }
}

fn targets_without_plugin() -> ArtifactTargets {
    ArtifactTargets {
        main: PathBuf::from("etc/fluent-bit.conf"),
        multiline: PathBuf::from("etc/parsers_multiline.conf"),
        plugin: None,
    }
}

const DEFAULT_DOCUMENT: &str = "
[SERVICE]
    Parsers_File parsers.conf
    Parsers_File parsers_multiline.conf
    Flush        1
    Daemon       Off
    Log_Level    info

[INPUT]
    Name         tail
    Path         /var/lib/docker/containers/*/*.log
    Parser       docker
    Tag          docker.*

[FILTER]
    Name         lua
    Match        docker.*
    script       /fluent-bit/etc/docker-metadata.lua
    call         enrich_with_docker_metadata

[FILTER]
    Name modify
    Match *
    Rename log message

[OUTPUT]
    Name  logzio
    Match *
    logzio_token test_token
    logzio_url   https://listener.logz.io:8071
    logzio_type  logzio-docker-logs
    id output_id
    headers user-agent:logzio-docker-collector-logs
";

#[test]
fn invariant_default_document_exact() {
    let compiled = compile(&[("LOGZIO_LOGS_TOKEN", "test_token")]);
    assert_eq!(compiled.main, DEFAULT_DOCUMENT);
    assert!(compiled.multiline.is_none());
    assert!(!compiled.main.contains("multiline.parser"));
}

#[test]
fn invariant_conflicts_produce_no_document() {
    let cases = [
        ("MATCH_CONTAINER_NAME", "my_app", "SKIP_CONTAINER_NAMES", "db"),
        ("MATCH_IMAGE_NAME", "my_image", "SKIP_IMAGE_NAMES", "redis"),
        ("INCLUDE_LINE", "ERROR", "EXCLUDE_LINES", "DEBUG,TRACE"),
    ];

    for (first, a, second, b) in cases {
        let settings = settings_from(&[(first, a), (second, b), ("MULTILINE_START_STATE_RULE", "^x")]);
        let mut writer = RecordingWriter::default();
        let result = ConfigPipeline::new().generate(&settings, &targets_without_plugin(), &mut writer);

        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::Conflict(_)));
        assert!(err.to_string().contains(&format!("Cannot use both {first} and {second}")));
        assert!(writer.written.is_empty(), "nothing may be written on conflict");
    }
}

#[test]
fn invariant_section_order_fixed() {
    let compiled = compile(&[
        ("MATCH_CONTAINER_NAME", "my_app"),
        ("SKIP_IMAGE_NAMES", "redis,postgres"),
        ("EXCLUDE_LINES", "DEBUG"),
        ("ADDITIONAL_FIELDS", "env:production"),
        ("SET_FIELDS", "service:web"),
        ("MULTILINE_START_STATE_RULE", "^[ERROR]"),
    ]);

    let markers = [
        "[SERVICE]",
        "[INPUT]",
        "Name         lua",
        "Name         nest",
        "Regex docker_container_name my_app",
        "Exclude docker_container_image redis",
        "Exclude message DEBUG",
        "Rename log message",
        "Add env production",
        "Set service web",
        "[OUTPUT]",
    ];
    let positions: Vec<_> = markers
        .iter()
        .map(|m| compiled.main.find(m).unwrap_or_else(|| panic!("missing {m}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    assert_eq!(compiled.sections.first().map(|s| s.kind()), Some(SectionKind::Service));
    assert_eq!(compiled.sections.last().map(|s| s.kind()), Some(SectionKind::Output));
}

#[test]
fn invariant_compile_idempotent() {
    let settings = settings_from(&[
        ("SKIP_CONTAINER_NAMES", "db,cache"),
        ("ADDITIONAL_FIELDS", "env:production,broken"),
        ("MULTILINE_START_STATE_RULE", "^[ERROR]"),
        ("MULTILINE_CUSTOM_RULES", r"^\s+at"),
    ]);
    let pipeline = ConfigPipeline::new();
    assert_eq!(pipeline.compile(&settings).unwrap(), pipeline.compile(&settings).unwrap());
}

#[test]
fn invariant_multiline_scenario() {
    let compiled = compile(&[
        ("LOGZIO_LOGS_TOKEN", "test_token"),
        ("LOG_LEVEL", "debug"),
        ("MULTILINE_START_STATE_RULE", "^[ERROR]"),
        ("MULTILINE_CUSTOM_RULES", r"^\s+at"),
        ("READ_FROM_HEAD", "false"),
        ("IGNORE_OLDER", "1h"),
    ]);

    assert!(compiled.main.contains("Log_Level    debug"));
    assert!(compiled.main.contains("multiline.parser multiline-regex"));
    assert!(compiled.main.contains("read_from_head false"));
    assert!(compiled.main.contains("ignore_older 1h"));

    let multiline = compiled.multiline.expect("multiline document");
    assert!(multiline.contains("name          multiline-regex"));
    assert!(multiline.contains(r#"rule      "start_state"   "/^[ERROR]/"  "cont""#));
    assert!(multiline.contains(r#"rule      "cont"          "^\s+at"                     "cont""#));
    assert_eq!(multiline.matches("rule      \"cont\"").count(), 1);
}

#[test]
fn invariant_multiline_reads_from_head_by_default() {
    let compiled = compile(&[("MULTILINE_START_STATE_RULE", "^x")]);
    assert!(compiled
        .main
        .contains("    read_from_head true\n    multiline.parser multiline-regex\n"));
}

#[test]
fn invariant_skip_list_scenario() {
    let compiled = compile(&[("SKIP_CONTAINER_NAMES", "db,cache")]);
    assert_eq!(compiled.main.matches("Exclude docker_container_name").count(), 2);
    assert!(compiled.main.contains("    Exclude docker_container_name db\n"));
    assert!(compiled.main.contains("    Exclude docker_container_name cache\n"));
    assert!(!compiled.main.contains("Regex docker_container_name"));
}

#[test]
fn invariant_malformed_field_skipped() {
    let compiled = compile(&[("ADDITIONAL_FIELDS", "envproduction,team:backend")]);
    assert!(!compiled.main.contains("envproduction"));
    assert!(compiled.main.contains("    Add team backend\n"));
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(compiled.warnings[0].entry, "envproduction");
}

#[test]
fn invariant_add_and_set_blocks() {
    let compiled = compile(&[
        ("ADDITIONAL_FIELDS", "env:production,team:backend"),
        ("SET_FIELDS", "service:web,version:1.0.0"),
    ]);
    assert!(compiled
        .main
        .contains("[FILTER]\n    Name modify\n    Match *\n    Add env production\n    Add team backend"));
    assert!(compiled
        .main
        .contains("[FILTER]\n    Name modify\n    Match *\n    Set service web\n    Set version 1.0.0"));
}

#[test]
fn invariant_custom_output_settings() {
    let compiled = compile(&[
        ("LOGZIO_URL", "https://custom-listener.logz.io:8071"),
        ("OUTPUT_ID", "custom_output_id"),
        ("HEADERS", "X-Api-Key:12345"),
    ]);
    assert!(compiled.main.contains("logzio_url   https://custom-listener.logz.io:8071"));
    assert!(compiled.main.contains("id custom_output_id"));
    assert!(compiled.main.contains("headers      X-Api-Key:12345"));
}

#[test]
fn invariant_generate_writes_documents() {
    let settings = settings_from(&[("MULTILINE_START_STATE_RULE", "^[ERROR]")]);
    let mut writer = RecordingWriter::default();
    let report = ConfigPipeline::new()
        .generate(&settings, &targets_without_plugin(), &mut writer)
        .unwrap();

    let paths: Vec<_> = writer.written.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(
        paths,
        [PathBuf::from("etc/fluent-bit.conf"), PathBuf::from("etc/parsers_multiline.conf")]
    );
    assert_eq!(report.artifacts.len(), 2);
    assert_eq!(report.artifacts[0].bytes, writer.written[0].1.len());
    assert_eq!(report.artifacts[0].sha256.len(), 64);
}

#[test]
fn invariant_multiline_written_only_when_triggered() {
    let mut writer = RecordingWriter::default();
    ConfigPipeline::new()
        .generate(&Settings::default(), &targets_without_plugin(), &mut writer)
        .unwrap();
    assert_eq!(writer.written.len(), 1);
}

#[test]
fn invariant_missing_plugin_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let targets = ArtifactTargets {
        main: dir.path().join("etc/fluent-bit.conf"),
        multiline: dir.path().join("etc/parsers_multiline.conf"),
        plugin: Some(dir.path().join("plugins/out_logzio.so")),
    };

    let err = ConfigPipeline::new()
        .generate(&Settings::default(), &targets, &mut FsArtifactWriter)
        .unwrap_err();

    match err {
        PipelineError::PluginMissing(e) => assert_eq!(e.reason(), PluginMissingReason::NotFound),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!targets.main.exists());
}

#[test]
fn invariant_generate_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let plugin = dir.path().join("out_logzio.so");
    std::fs::write(&plugin, b"plugin").unwrap();
    let targets = ArtifactTargets {
        main: dir.path().join("etc/fluent-bit.conf"),
        multiline: dir.path().join("etc/parsers_multiline.conf"),
        plugin: Some(plugin),
    };
    let settings = settings_from(&[("LOGZIO_LOGS_TOKEN", "test_token")]);

    let report = ConfigPipeline::new()
        .generate(&settings, &targets, &mut FsArtifactWriter)
        .unwrap();

    assert_eq!(std::fs::read_to_string(&targets.main).unwrap(), DEFAULT_DOCUMENT);
    assert!(!targets.multiline.exists());
    assert_eq!(report.artifacts.len(), 1);
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_compile_calls_validate() {
    use fluentconf_core::pipeline::{get_validation_call_count, reset_validation_call_count};

    reset_validation_call_count();
    ConfigPipeline::new().compile(&Settings::default()).unwrap();
    assert!(get_validation_call_count() >= 1);
}
