use std::env;
use std::fs;
use std::io::{
    ErrorKind,
    Read,
    Write,
};
use std::process::{
    Command,
    Stdio,
};
use std::time::{
    Duration,
    Instant,
};

use crate::errors::NixCfgError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns `cmd` with `args`, writes `input` to its stdin and returns
/// its stdout once it exits successfully.
///
/// `input` only ever travels through the pipe, so secrets passed here
/// do not show up in the host process list. The child is killed if it
/// does not exit within `timeout`.
pub fn capture_with_stdin(
    cmd: &str,
    args: &[&str],
    input: &[u8],
    timeout: Duration,
) -> Result<String, NixCfgError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| NixCfgError::ExternalToolFailure {
            context: format!("command {cmd} failed to spawn: {err}"),
            error: Some(err),
        })?;

    // Dropping stdin closes the pipe, so the child sees EOF
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(input) {
            // Child exited without reading, its exit status says why
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
            Err(err) => {
                _ = child.kill();
                _ = child.wait();
                return Err(NixCfgError::ExternalToolFailure {
                    context: format!("failed to write to stdin of command {cmd}: {err}"),
                    error: Some(err),
                });
            }
            Ok(()) => {}
        }
    }

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                _ = child.kill();
                _ = child.wait();
                return Err(NixCfgError::ExternalToolFailure {
                    error: None,
                    context: format!("command {cmd} timed out after {timeout:?}"),
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(err) => {
                _ = child.kill();
                return Err(NixCfgError::ExternalToolFailure {
                    context: format!("failed to wait for command {cmd}: {err}"),
                    error: Some(err),
                });
            }
        }
    };

    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            _ = pipe.read_to_string(&mut stderr);
        }

        let context = match status.code() {
            Some(code) => format!("command {cmd} exited with non-zero status {code}"),
            None => format!("command {cmd} terminated by signal"),
        };

        return Err(NixCfgError::ExternalToolFailure {
            error: None,
            context: match stderr.trim() {
                "" => context,
                stderr => format!("{context}: {stderr}"),
            },
        });
    }

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout)
            .map_err(|err| NixCfgError::ExternalToolFailure {
                context: format!("failed to read output of command {cmd}: {err}"),
                error: Some(err),
            })?;
    }

    Ok(stdout)
}

pub fn in_path(program: &str) -> bool {
    if program.contains('/') {
        return fs::metadata(program).is_ok();
    }

    if let Ok(path) = env::var("PATH") {
        for p in path.split(':') {
            let p_str = format!("{}/{}", p, program);
            if fs::metadata(p_str).is_ok() {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_capture_with_stdin() {
        if !in_path("cat") {
            println!("WARN: skipping shell tests - no cat in path");
            return;
        }

        let out = capture_with_stdin("cat", &[], b"hello, world!", TIMEOUT)
            .expect("failed to execute cat");

        assert_eq!(out, "hello, world!");
    }

    #[test]
    fn test_capture_non_zero() {
        if !in_path("false") {
            println!("WARN: skipping shell tests - no false in path");
            return;
        }

        let result = capture_with_stdin("false", &[], b"secret", TIMEOUT);
        match result {
            Err(NixCfgError::ExternalToolFailure { context, .. }) => {
                assert!(context.contains("non-zero status 1"), "{context}");
                assert!(!context.contains("secret"));
            }
            result => panic!("unexpected result {result:?}"),
        }
    }

    #[test]
    fn test_capture_timeout() {
        if !in_path("sleep") {
            println!("WARN: skipping shell tests - no sleep in path");
            return;
        }

        let start = Instant::now();
        let result = capture_with_stdin("sleep", &["10"], b"", Duration::from_millis(200));

        assert!(matches!(
            result,
            Err(NixCfgError::ExternalToolFailure { error: None, ref context }) if context.contains("timed out")
        ));
        assert!(start.elapsed() < Duration::from_secs(5), "child was not killed");
    }

    #[test]
    fn test_capture_missing_program() {
        let result = capture_with_stdin("nixcfg-no-such-program", &[], b"", TIMEOUT);

        assert!(matches!(
            result,
            Err(NixCfgError::ExternalToolFailure { error: Some(_), .. })
        ));
    }

    #[test]
    fn test_in_path() {
        assert!(!in_path("nixcfg-no-such-program"));
        assert!(!in_path("/nonexistent/nixcfg-no-such-program"));
    }
}
