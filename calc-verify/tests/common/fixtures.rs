use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A config file in a temp dir, so the user's own config never leaks in.
pub struct TestConfig {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestConfig {
    pub fn empty() -> Self {
        Self::with_content("")
    }

    pub fn with_content(content: &str) -> Self {
        crate::test_log!("FIXTURE: Creating calc-verify config file");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, content).expect("Failed to write config.toml");
        Self { dir, path }
    }
}

/// `calc-verify` with a clean environment and the given config file.
pub fn calc_verify(config: &TestConfig) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_calc-verify"));
    for var in [
        "CALC_BASE_URL",
        "CALC_MOCK_URL",
        "CALC_TIMEOUT_SECS",
        "CALC_LOG_LEVEL",
        "CALC_LOG_FORMAT",
        "CALC_LOG_FILE",
        "CALC_CONFIG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd.arg("--config").arg(&config.path);
    cmd
}
