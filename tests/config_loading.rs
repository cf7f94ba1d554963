// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;
use chefrunner::config::{load_and_validate, load_or_default};
use chefrunner::errors::ChefRunnerError;
use chefrunner::types::PlatformChoice;

#[test]
fn full_config_is_parsed() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
program = "C:\\opscode\\chef\\bin\\chef-client.bat"
extra_args = ["--no-color"]
platform = "windows"

[logs]
directory = "/srv/chef/logs"
keep = 5

[dispatcher]
max_concurrent = 3
queue_length = 2
job_timeout = "45m"
retain_output = true
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.runner.program, "C:\\opscode\\chef\\bin\\chef-client.bat");
    assert_eq!(cfg.runner.log_flag, "-L");
    assert_eq!(cfg.runner.extra_args, vec!["--no-color"]);
    assert_eq!(cfg.runner.platform, PlatformChoice::Windows);
    assert_eq!(cfg.logs.directory, PathBuf::from("/srv/chef/logs"));
    assert_eq!(cfg.logs.extension, "log");
    assert_eq!(cfg.logs.keep, 5);
    assert_eq!(cfg.dispatcher.max_concurrent, 3);
    assert_eq!(cfg.dispatcher.queue_length, 2);
    assert_eq!(cfg.dispatcher.job_timeout, Some(Duration::from_secs(45 * 60)));
    assert!(cfg.dispatcher.retain_output);
}

#[test]
fn empty_file_yields_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.runner.program, "chef-client");
    assert_eq!(cfg.dispatcher.max_concurrent, 1);
    assert_eq!(cfg.dispatcher.job_timeout, None);
}

#[test]
fn zero_concurrency_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dispatcher]
max_concurrent = 0
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ChefRunnerError::ConfigError(msg)) => assert!(msg.contains("max_concurrent")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_timeout_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dispatcher]
job_timeout = "soon"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ChefRunnerError::ConfigError(msg)) => assert!(msg.contains("job_timeout")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn unknown_platform_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
platform = "beos"
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ChefRunnerError::TomlError(_))
    ));
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(ChefRunnerError::IoError(_))
    ));
}
