mod common;

use common::{run_proseclock, TestEnv};

#[test]
fn proseclock_help_shows_usage() {
    let output = run_proseclock(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(
        !stderr.contains("No config file found"),
        "--help should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn proseclock_version_shows_version() {
    let output = run_proseclock(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("proseclock "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_proseclock(&["completions", "bash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("proseclock"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_works() {
    let output = run_proseclock(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("data_dir"));
    assert!(stdout.contains("fallback_attempts = 20"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_proseclock(&["config", "path"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();

    assert!(env.run(&["config", "init"]).status.success());
    assert!(env.config_path().exists());

    let again = env.run(&["config", "init"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    assert!(env.run(&["config", "init", "--force"]).status.success());
}

#[test]
fn invalid_config_is_rejected() {
    let env = TestEnv::new();
    env.write_config("[schedule]\nfallback_attempts = 0\n");

    let output = env.run(&["stats"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("fallback_attempts"));
}

#[test]
fn daemon_status_reports_not_running() {
    let output = run_proseclock(&["daemon", "status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "daemon status should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Daemon is not running"));
}

#[test]
fn show_without_daemon_reports_not_running() {
    let output = run_proseclock(&["show"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Daemon is not running"));
}

#[test]
fn now_prints_exact_quote_without_origin() {
    let env = TestEnv::new();
    env.write_seed(&[(600, "At <b>ten o'clock</b> the bells rang.")]);

    let output = env.run(&["now", "--at", "10:00"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "now should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.starts_with("[10:00]\n"), "{}", stdout);
    assert!(stdout.contains("At ten o'clock the bells rang."));
    assert!(!stdout.contains("Test Book"));
}

#[test]
fn now_falls_back_to_an_earlier_quote_and_shows_origin() {
    let env = TestEnv::new();
    env.write_seed(&[(600, "At <b>ten o'clock</b> the bells rang.")]);

    let output = env.run(&["now", "--at", "10:05"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.starts_with("[10:00] (earlier)\n"), "{}", stdout);
    assert!(stdout.contains("-- Test Book, by Test Author"));
}

#[test]
fn now_never_shows_a_later_quote() {
    let env = TestEnv::new();
    env.write_seed(&[(600, "At <b>ten o'clock</b> the bells rang.")]);

    let output = env.run(&["now", "--at", "09:59"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("No quote found near 09:59"), "{}", stdout);
}

#[test]
fn now_json_reports_tone_and_visibility() {
    let env = TestEnv::new();
    env.write_seed(&[(61, "It was <b>one minute past one</b>.")]);

    let output = env.run(&["now", "--at", "01:01", "--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("now --json is JSON");

    assert_eq!(value["minute"], 61);
    assert_eq!(value["tone"], "fresh");
    assert_eq!(value["origin_visibility"], "hidden");
}

#[test]
fn now_fails_without_seed() {
    let output = run_proseclock(&["now", "--at", "12:00"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("quote store"));
}

#[test]
fn now_rejects_bad_time() {
    let output = run_proseclock(&["now", "--at", "25:00"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
}

#[test]
fn seed_import_builds_a_store_now_can_read() {
    let env = TestEnv::new();
    let csv = env.scratch("quotes.csv");
    std::fs::write(
        &csv,
        "08:00|eight o'clock|It was eight o'clock.|A Book|An Author\n\
         08:01|one minute past eight|At one minute past eight he left.|Another|Someone\n",
    )
    .unwrap();
    let seed = env.seed_path();
    let seed_arg = seed.to_str().unwrap();

    let output = env.run(&["seed", "import", csv.to_str().unwrap(), seed_arg]);
    assert!(
        output.status.success(),
        "seed import should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported 2 quotes"));

    let again = env.run(&["seed", "import", csv.to_str().unwrap(), seed_arg]);
    assert!(!again.status.success());

    let forced = env.run(&["seed", "import", csv.to_str().unwrap(), seed_arg, "--force"]);
    assert!(forced.status.success());

    let output = env.run(&["now", "--at", "08:00"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("It was eight o'clock."), "{}", stdout);
}

#[test]
fn seed_import_reports_bad_line() {
    let env = TestEnv::new();
    let csv = env.scratch("broken.csv");
    std::fs::write(&csv, "08:00|eight|It was eight.|Book|Author\nnot a quote\n").unwrap();
    let out = env.scratch("out.db");

    let output = env.run(&["seed", "import", csv.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
    assert!(!out.exists());
}

#[test]
fn stats_reports_coverage() {
    let env = TestEnv::new();
    env.write_seed(&[(0, "midnight"), (1, "one past"), (1, "also one past")]);

    let output = env.run(&["stats"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "stats should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Quotes: 3"));
    assert!(stdout.contains("Minutes covered: 2 of 1440"));
    assert!(env.data_dir().join("quotes.db").exists());
}
