use std::fs;

use xtdb_query::settings::Settings;
use xtdb_query::text::BuildOptions;

#[test]
fn defaults_without_a_file() {
    let settings = Settings::from_file("no-such-settings-file").expect("defaults");
    assert!(!settings.lucene_enabled);
    assert!(settings.case_sensitive);
    assert_eq!(settings.max_page_size, 1000);
    assert_eq!(settings.bind_address, "127.0.0.1:8080");
    assert_eq!(settings.types_path, None);
    assert_eq!(settings.build_options(), BuildOptions::default());
}

#[test]
fn file_overrides_defaults() {
    let dir = std::env::temp_dir().join(format!("xtdb-query-settings-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("custom.toml");
    fs::write(
        &path,
        "lucene_enabled = true\ncase_sensitive = false\nmax_page_size = 50\ntypes_path = \"types.json\"\n",
    )
    .expect("settings file");
    let settings = Settings::from_file(dir.join("custom").to_str().expect("utf-8 path")).expect("settings");
    assert_eq!(settings.max_page_size, 50);
    assert_eq!(settings.types_path.as_deref(), Some("types.json"));
    assert_eq!(
        settings.build_options(),
        BuildOptions {
            optimize_for_index: true,
            case_sensitive: false,
        }
    );
    fs::remove_dir_all(&dir).ok();
}
