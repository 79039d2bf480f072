//! External password generator
//!
//! Runs the configured executable once per request as
//! `<path> [args...] --length <n> --count <n>` and hands back its stdout.
//! The child is bound to the future that awaits it: dropping that future
//! (client gone, connection timeout, shutdown) kills the process.

mod error;

pub use error::GeneratorError;

use hyper::body::Bytes;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::GeneratorConfig;
use crate::logger;

/// Validated generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    pub length: u32,
    pub count: u32,
}

/// Handle on the external generator executable
#[derive(Debug, Clone)]
pub struct PasswordGenerator {
    program: String,
    leading_args: Vec<String>,
    timeout: Option<Duration>,
}

impl PasswordGenerator {
    pub fn new(
        program: impl Into<String>,
        leading_args: Vec<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            program: program.into(),
            leading_args,
            timeout,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::new(config.path.clone(), config.args.clone(), timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector passed to the executable
    pub fn command_args(&self, params: PasswordParams) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "--length".to_string(),
            params.length.to_string(),
            "--count".to_string(),
            params.count.to_string(),
        ]);
        args
    }

    /// Run the generator and return its stdout untouched
    pub async fn generate(&self, params: PasswordParams) -> Result<Bytes, GeneratorError> {
        let args = self.command_args(params);
        logger::log_debug(&format!("[Generator] Running {} {}", self.program(), args.join(" ")));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The child moves into this future; dropping it kills the process.
        let output = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| GeneratorError::TimedOut { after: limit })?,
            None => output.await,
        }
        .map_err(|source| GeneratorError::Io { source })?;

        if !output.status.success() {
            return Err(GeneratorError::Exited {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        logger::log_debug(&format!(
            "[Generator] Finished with {} bytes of output",
            output.stdout.len()
        ));
        Ok(Bytes::from(output.stdout))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Instant;

    /// Generator backed by an inline shell script; `$1..$4` receive the flags
    pub(crate) fn shell_generator(script: &str, timeout: Option<Duration>) -> PasswordGenerator {
        PasswordGenerator::new(
            "/bin/sh",
            vec!["-c".to_string(), script.to_string(), "password-generator".to_string()],
            timeout,
        )
    }

    /// Script that records the generator's pid in `pid_file`, then hangs
    pub(crate) fn pid_recording_script(pid_file: &Path) -> String {
        format!("echo $$ > '{}'; exec sleep 30", pid_file.display())
    }

    /// Wait until the generator has written its pid
    pub(crate) async fn wait_for_pid(pid_file: &Path) -> u32 {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(raw) = std::fs::read_to_string(pid_file) {
                if let Ok(pid) = raw.trim().parse() {
                    return pid;
                }
            }
            assert!(Instant::now() < deadline, "generator never wrote its pid");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// A reaped or zombie process counts as gone
    fn process_alive(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .and_then(|(_, rest)| rest.chars().next())
                .is_some_and(|state| state != 'Z' && state != 'X'),
            Err(_) => false,
        }
    }

    /// Poll until `pid` has exited
    pub(crate) async fn wait_for_exit(pid: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if !process_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[test]
    fn test_command_args_order() {
        let generator = PasswordGenerator::new("/opt/gen", vec!["--quiet".to_string()], None);
        let args = generator.command_args(PasswordParams { length: 12, count: 3 });
        assert_eq!(args, vec!["--quiet", "--length", "12", "--count", "3"]);
        assert_eq!(generator.program(), "/opt/gen");
    }

    #[test]
    fn test_from_config_zero_timeout_disables() {
        let config = GeneratorConfig {
            path: "/opt/gen".to_string(),
            args: Vec::new(),
            timeout_secs: 0,
        };
        assert!(PasswordGenerator::from_config(&config).timeout.is_none());

        let config = GeneratorConfig {
            timeout_secs: 7,
            ..config
        };
        assert_eq!(
            PasswordGenerator::from_config(&config).timeout,
            Some(Duration::from_secs(7))
        );
    }

    #[tokio::test]
    async fn test_generate_passes_flags() {
        let generator = shell_generator(r#"printf '%s %s %s %s' "$1" "$2" "$3" "$4""#, None);
        let out = generator
            .generate(PasswordParams { length: 16, count: 4 })
            .await
            .unwrap();
        assert_eq!(&out[..], b"--length 16 --count 4");
    }

    #[tokio::test]
    async fn test_generate_returns_stdout_verbatim() {
        let generator = shell_generator(r"printf 'aB3!x\n\tQ9%%z\r\n'", None);
        let out = generator
            .generate(PasswordParams { length: 8, count: 1 })
            .await
            .unwrap();
        assert_eq!(&out[..], b"aB3!x\n\tQ9%z\r\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_captures_streams() {
        let generator = shell_generator("echo partial; echo 'Value 2 is out of range' >&2; exit 2", None);
        let err = generator
            .generate(PasswordParams { length: 2, count: 1 })
            .await
            .unwrap_err();

        match &err {
            GeneratorError::Exited { status, .. } => assert_eq!(status.code(), Some(2)),
            other => panic!("unexpected error: {other:?}"),
        }
        let (stdout, stderr) = err.captured_output();
        assert_eq!(stdout, "partial\n");
        assert_eq!(stderr, "Value 2 is out of range\n");
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let generator = PasswordGenerator::new("/nonexistent/password-generator", Vec::new(), None);
        let err = generator
            .generate(PasswordParams { length: 8, count: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/password-generator"));
        assert_eq!(err.captured_output(), ("", ""));
    }

    #[tokio::test]
    async fn test_timeout_kills_generator() {
        let generator = shell_generator("exec sleep 10", Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = generator
            .generate(PasswordParams { length: 8, count: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropping_generate_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let generator = shell_generator(&pid_recording_script(&pid_file), None);

        let pid = {
            let generate = generator.generate(PasswordParams { length: 8, count: 1 });
            tokio::pin!(generate);
            tokio::select! {
                result = &mut generate => panic!("generator finished early: {result:?}"),
                pid = wait_for_pid(&pid_file) => pid,
            }
        };

        assert!(wait_for_exit(pid).await, "generator {pid} outlived its future");
    }
}
