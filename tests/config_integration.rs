use std::path::PathBuf;

use marklet::config::{
    ConfigFlags, OutputFormat, clear_config_flags, load_config_flags, parse_flag_tokens,
    save_config_flags,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".markletrc");
    let content = r#"
# comment
--no-images

--format json
   
--render-debug-log=render.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_images);
    assert_eq!(flags.format, Some(OutputFormat::Json));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".markletrc");
    let content = "--no-images\n--format json\n--base-dir assets\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "marklet".to_string(),
        "--format".to_string(),
        "text".to_string(),
        "--plain".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_images, "file flags should remain enabled");
    assert!(effective.plain, "cli flags should be applied");
    assert_eq!(
        effective.format,
        Some(OutputFormat::Text),
        "cli should override format"
    );
    assert_eq!(
        effective.base_dir,
        Some(PathBuf::from("assets")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "marklet".to_string(),
        "--format=json".to_string(),
        "--base-dir=img".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.format, Some(OutputFormat::Json));
    assert_eq!(flags.base_dir, Some(PathBuf::from("img")));
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        no_images: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        plain: true,
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.no_images);
    assert!(merged.plain);
    assert!(merged.perf);
}

#[test]
fn test_saved_image_base_dir_round_trips_and_local_override_wins() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("marklet").join("config");
    let local = dir.path().join(".markletrc");

    let saved = parse_flag_tokens(&[
        "marklet".to_string(),
        "notes.md".to_string(),
        "--base-dir".to_string(),
        "docs/images".to_string(),
        "--render-debug-log=fetch.log".to_string(),
    ]);
    save_config_flags(&global, &saved).unwrap();
    std::fs::write(&local, "--base-dir assets\n--no-images\n").unwrap();

    let global_flags = load_config_flags(&global).unwrap();
    assert_eq!(global_flags, saved);
    assert_eq!(global_flags.base_dir, Some(PathBuf::from("docs/images")));

    let effective = global_flags.union(&load_config_flags(&local).unwrap());
    assert_eq!(effective.base_dir, Some(PathBuf::from("assets")));
    assert_eq!(effective.render_debug_log, Some(PathBuf::from("fetch.log")));
    assert!(effective.no_images);

    clear_config_flags(&global).unwrap();
    assert_eq!(load_config_flags(&global).unwrap(), ConfigFlags::default());
}
