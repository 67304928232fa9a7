// tests/config_test.rs
use git_promote::config::{
    load_config, BuildEnvironment, Config, GitConfig, NotificationConfig, ENV_BRANCH,
    ENV_BUILD_NUMBER, ENV_COMMIT, ENV_GITHUB_TOKEN, ENV_REPO_SLUG, ENV_SLACK_TOKEN,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ALL_VARS: [&str; 6] = [
    ENV_BRANCH,
    ENV_COMMIT,
    ENV_BUILD_NUMBER,
    ENV_REPO_SLUG,
    ENV_GITHUB_TOKEN,
    ENV_SLACK_TOKEN,
];

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.git.remote_url, "https://github.com/{repo}");
    assert_eq!(config.git.committer_name, "Travis CI");
    assert_eq!(config.git.committer_email, "travis@travis");
    assert_eq!(config.git.upstream_ref, "origin/develop");
    assert_eq!(config.notification.channel, "#travis-build-result");
    assert_eq!(config.notification.username, "TravisMergerBot");
    assert_eq!(config.notification.icon_emoji, ":sob:");
    assert_eq!(config.notification.api_base, "https://slack.com/api");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r##"
[git]
upstream_ref = "origin/integration"

[notification]
channel = "#builds"
"##;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.git.upstream_ref, "origin/integration");
    assert_eq!(config.notification.channel, "#builds");
    // Untouched keys fall back to their defaults
    assert_eq!(config.git.committer_name, "Travis CI");
    assert_eq!(config.notification.timeout_secs, 10);
}

#[test]
fn test_load_fixture_file() {
    let config =
        load_config(Some("tests/fixtures/promote.toml")).expect("Failed to load test config");

    assert_eq!(
        config.git.remote_url_for("octo/widgets"),
        "https://git.example.com/octo/widgets.git"
    );
    assert_eq!(config.git.committer_name, "Merge Bot");
    assert_eq!(config.git.reset_merge_message, GitConfig::default().reset_merge_message);
    assert_eq!(
        config.notification,
        NotificationConfig {
            channel: "#ci-merges".to_string(),
            username: "MergeBot".to_string(),
            icon_emoji: ":robot_face:".to_string(),
            api_base: "https://slack.com/api".to_string(),
            timeout_secs: 5,
        }
    );
}

#[test]
fn test_empty_file_is_default() {
    let temp_file = NamedTempFile::new().unwrap();
    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[git\nremote_url = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let err = load_config(Some("tests/fixtures/does-not-exist.toml")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.toml"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
#[serial]
fn test_build_environment_from_process_env() {
    let values = [
        (ENV_BRANCH, "feature/login"),
        (ENV_COMMIT, "deadbeefcafe"),
        (ENV_BUILD_NUMBER, "108"),
        (ENV_REPO_SLUG, "octo/widgets"),
        (ENV_GITHUB_TOKEN, "ghp_token"),
        (ENV_SLACK_TOKEN, "xoxb-token"),
    ];
    for (key, value) in values {
        env::set_var(key, value);
    }

    let build = BuildEnvironment::from_env().unwrap();

    for key in ALL_VARS {
        env::remove_var(key);
    }

    assert_eq!(build.branch, "feature/login");
    assert_eq!(build.commit, "deadbeefcafe");
    assert_eq!(build.build_number, "108");
    assert_eq!(build.github_token, "ghp_token");
    assert_eq!(build.slack_token, "xoxb-token");
}

#[test]
#[serial]
fn test_build_environment_missing_token() {
    for key in ALL_VARS {
        env::set_var(key, "value");
    }
    env::remove_var(ENV_GITHUB_TOKEN);

    let result = BuildEnvironment::from_env();

    for key in ALL_VARS {
        env::remove_var(key);
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains(ENV_GITHUB_TOKEN));
    assert_eq!(err.exit_code(), 2);
}
