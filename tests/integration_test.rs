// tests/integration_test.rs
use std::process::Command;

#[test]
fn test_puppet_release_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "puppet-release", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("puppet-release"));
    assert!(stdout.contains("bump-up"));
    assert!(stdout.contains("semver-sort"));
}

#[test]
fn test_format_command_canonicalizes_and_sorts() {
    use puppet_release::manifest::Manifest;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Puppetfile");
    std::fs::write(
        &path,
        "# comment\n\nmod   'z/b' ,  :git =>  'aaa'\nmod 'a/a',   '1.0.0'\n",
    )
    .unwrap();

    let formatted = Manifest::load(&path).unwrap().sorted_by_name().format();
    assert_eq!(formatted, "mod 'a/a', '1.0.0'\nmod 'z/b', :git => 'aaa'\n");
}

#[test]
fn test_config_loading_defaults() {
    use puppet_release::config::load_config;

    let config = load_config(None).expect("Should load default config");
    assert_eq!(config.module_path, "modules");
    assert_eq!(config.release_branch, "release/0.1");
}

#[test]
fn test_config_loading_from_file() {
    use puppet_release::config::load_config;
    use std::io::Write;

    let mut temp_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(temp_file, "module_path = \"site-modules\"").unwrap();
    writeln!(temp_file, "release_branch = \"release/3.4\"").unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.module_path, "site-modules");
    assert_eq!(config.release_branch, "release/3.4");
    // untouched keys keep their defaults
    assert_eq!(config.remote, "origin");
}
