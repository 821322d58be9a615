//! E2E test fixture: isolated home, session file and mock servers.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use httpmock::MockServer;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Step result for report generation.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub duration: Duration,
    pub output_summary: String,
}

/// E2E fixture: one temp home, one GitHub API mock and one site mock.
pub struct E2EFixture {
    pub scenario_name: String,
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub session_path: PathBuf,
    pub github: MockServer,
    pub site: MockServer,
    /// Extra environment passed to every `ob` invocation.
    pub env: Vec<(String, String)>,
    start_time: Instant,
    step_count: Cell<usize>,
    step_results: RefCell<Vec<StepResult>>,
}

impl E2EFixture {
    pub fn new(scenario_name: &str) -> Self {
        let start_time = Instant::now();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let session_path = root.join("state").join("session.json");
        let github = MockServer::start();
        let site = MockServer::start();

        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E SCENARIO: {scenario_name}");
        println!("{}", "█".repeat(70));
        println!("[E2E] Root: {}", root.display());
        println!("[E2E] GitHub API: {}", github.base_url());
        println!("[E2E] Site: {}", site.base_url());

        Self {
            scenario_name: scenario_name.to_string(),
            temp_dir,
            root,
            session_path,
            github,
            site,
            env: Vec::new(),
            start_time,
            step_count: Cell::new(0),
            step_results: RefCell::new(Vec::new()),
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.push((key.to_string(), value.to_string()));
    }

    pub fn log_step(&self, description: &str) {
        self.step_count.set(self.step_count.get() + 1);
        println!();
        println!("┌{}", "─".repeat(68));
        println!("│ STEP {}: {description}", self.step_count.get());
        println!("│ Time: {:?}", self.start_time.elapsed());
        println!("└{}", "─".repeat(68));
    }

    /// Run `ob` with the fixture's isolated environment.
    pub fn run_ob(&self, args: &[&str]) -> CommandOutput {
        let step_name = format!("ob {}", args.join(" "));
        let start = Instant::now();
        println!("[CMD] {step_name}");

        let mut command = Command::new(env!("CARGO_BIN_EXE_ob"));
        command
            .args(args)
            .env("HOME", &self.root)
            .env("XDG_CONFIG_HOME", self.root.join(".config"))
            .env("OB_SESSION_PATH", &self.session_path)
            .env("OB_GITHUB_API_URL", self.github.base_url())
            .env("OB_SITE_URL", self.site.base_url())
            .env_remove("OB_CONFIG")
            .env_remove("OB_GITHUB_TOKEN")
            .env_remove("OB_REPO_OWNER")
            .env_remove("OB_REPO_NAME")
            .env_remove("RUST_LOG")
            .current_dir(&self.root);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        let output = command.output().expect("Failed to execute ob command");

        let elapsed = start.elapsed();
        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        println!("[CMD] Exit: {} ({elapsed:?})", result.exit_code);
        if !result.stdout.is_empty() {
            println!("[STDOUT] {}", truncate(&result.stdout, 500));
        }
        if !result.stderr.is_empty() {
            println!("[STDERR] {}", result.stderr);
        }

        let summary = if result.success {
            format!("OK ({})", truncate(&result.stdout, 50))
        } else {
            format!("FAIL: {}", truncate(&result.stderr, 100))
        };
        self.step_results.borrow_mut().push(StepResult {
            name: step_name,
            success: result.success,
            duration: elapsed,
            output_summary: summary,
        });

        result
    }

    pub fn assert_success(&self, output: &CommandOutput, operation: &str) {
        assert!(
            output.success,
            "[E2E] {operation} failed with exit code {}: {}\n{}",
            output.exit_code, output.stderr, output.stdout
        );
        println!("[ASSERT] {operation} - SUCCESS");
    }

    pub fn assert_failure(&self, output: &CommandOutput, operation: &str) {
        assert!(
            !output.success,
            "[E2E] {operation} unexpectedly succeeded: {}",
            output.stdout
        );
        println!("[ASSERT] {operation} - FAILED AS EXPECTED");
    }

    /// Stored session map, if the file exists.
    pub fn session(&self) -> Option<Value> {
        let raw = std::fs::read_to_string(&self.session_path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn generate_report(&self) {
        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E REPORT: {}", self.scenario_name);
        println!("{}", "█".repeat(70));
        for (i, step) in self.step_results.borrow().iter().enumerate() {
            let status = if step.success { "✓" } else { "✗" };
            println!("{:2}. {status} {} ({:?})", i + 1, step.name, step.duration);
            if !step.success {
                println!("     └─ {}", step.output_summary);
            }
        }
        println!("Total Time: {:?}", self.start_time.elapsed());
    }
}

impl Drop for E2EFixture {
    fn drop(&mut self) {
        println!("█ E2E CLEANUP: {} ({:?})", self.scenario_name, self.temp_dir.path());
    }
}

pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout).expect("stdout should be valid JSON")
    }
}

/// A published assertion for `stem`, ids rooted at `base_url`.
pub fn badge_document(base_url: &str, stem: &str, badge_name: &str, recipient: &str) -> Value {
    json!({
        "@context": "https://w3id.org/openbadges/v2",
        "id": format!("{base_url}/badges/{stem}.json"),
        "type": "Assertion",
        "recipient": { "type": "email", "identity": format!("{stem}@example.com"), "hashed": false },
        "recipientName": recipient,
        "issuedOn": "2024-03-05T00:00:00.000Z",
        "badge": {
            "id": format!("{base_url}/badges/class/{stem}.json"),
            "type": "BadgeClass",
            "name": badge_name,
            "description": "",
            "image": "https://img.example/badge.png",
            "criteria": { "type": "Criteria", "narrative": "" },
            "issuer": {
                "id": format!("{base_url}/issuer.json"),
                "type": "Profile",
                "name": "Acme Academy",
                "url": "https://acme.dev"
            }
        },
        "verification": { "type": "HostedBadge" }
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len).collect();
        format!("{cut}...")
    }
}
