use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use proseclock::storage::{NewQuote, QuoteStore};
use tempfile::TempDir;

#[allow(dead_code)]
pub fn run_proseclock(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

#[allow(dead_code)]
pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
    runtime: TempDir,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
            runtime: tempfile::tempdir().expect("create temporary XDG runtime dir"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_proseclock"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env("XDG_RUNTIME_DIR", self.runtime.path())
            .env("PROSECLOCK_DATA_DIR", self.data_dir())
            .env("PROSECLOCK_SEED_PATH", self.seed_path())
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute proseclock binary")
    }

    #[allow(dead_code)]
    pub fn spawn(&self, args: &[&str]) -> Child {
        self.command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn proseclock binary")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data.path().join("proseclock")
    }

    pub fn seed_path(&self) -> PathBuf {
        self.data.path().join("seed").join("quotes.db")
    }

    #[allow(dead_code)]
    pub fn socket_path(&self) -> PathBuf {
        self.runtime.path().join("proseclock.sock")
    }

    #[allow(dead_code)]
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }

    /// Write a seed store holding one quote per `(minute, text)` pair
    #[allow(dead_code)]
    pub fn write_seed(&self, quotes: &[(i32, &str)]) {
        write_seed(&self.seed_path(), quotes);
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}

#[allow(dead_code)]
pub fn write_seed(path: &Path, quotes: &[(i32, &str)]) {
    let store = QuoteStore::create(path).expect("create seed store");
    let rows: Vec<NewQuote> = quotes
        .iter()
        .map(|(minute, text)| NewQuote {
            minute: *minute,
            text: text.to_string(),
            author: "Test Author".to_string(),
            book: "Test Book".to_string(),
        })
        .collect();
    store.insert_quotes(&rows).expect("insert seed quotes");
}
