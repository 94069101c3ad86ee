use std::time::Duration;

use crate::constants::defaults;
use crate::errors::NixCfgError;
use crate::utils::shell;

/// Produces a crypt(3) hash suitable for `users.users.<name>.hashedPassword`
pub trait PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, NixCfgError>;

    /// Human-readable description for dry-run output
    fn describe(&self) -> String;
}

/// Hashes via an external `mkpasswd`-compatible program,
/// with the password written to its stdin.
#[derive(Debug, Clone)]
pub struct Mkpasswd {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Built-in SHA-512 crypt, for hosts without `mkpasswd`
#[derive(Debug, Clone, Default)]
pub struct Sha512Crypt;

impl Default for Mkpasswd {
    fn default() -> Self {
        Self {
            program: defaults::MKPASSWD.to_string(),
            args: defaults::MKPASSWD_ARGS.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(defaults::HASH_TIMEOUT_SECS),
        }
    }
}

impl Mkpasswd {
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ..Default::default()
        }
    }
}

impl PasswordHasher for Mkpasswd {
    fn hash(&self, password: &str) -> Result<String, NixCfgError> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let output = shell::capture_with_stdin(
            &self.program,
            &args,
            password.as_bytes(),
            self.timeout,
        )?;

        let hashed = output.trim_end_matches(['\n', '\r']).to_string();
        if hashed.is_empty() {
            return Err(NixCfgError::ExternalToolFailure {
                error: None,
                context: format!("command {} produced no output", self.program),
            });
        }

        // Output must be a crypt(3) hash of exactly this password
        if !pwhash::unix::verify(password, &hashed) {
            return Err(NixCfgError::ExternalToolFailure {
                error: None,
                context: format!(
                    "output of command {} does not verify against the password",
                    self.program
                ),
            });
        }

        Ok(hashed)
    }

    fn describe(&self) -> String {
        let cmd = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str));

        let joined = shlex::try_join(cmd).unwrap_or_else(|_| self.program.clone());
        format!("{joined} < (password on stdin)")
    }
}

impl PasswordHasher for Sha512Crypt {
    fn hash(&self, password: &str) -> Result<String, NixCfgError> {
        let hashed = pwhash::sha512_crypt::hash(password).map_err(|err| {
            NixCfgError::NixCfgBug(format!("failed to hash password with sha512_crypt: {err}"))
        })?;

        if !pwhash::unix::verify(password, &hashed) {
            return Err(NixCfgError::NixCfgBug(
                "failed to verify sha512_crypt hashed password".to_string(),
            ));
        }

        Ok(hashed)
    }

    fn describe(&self) -> String {
        "built-in sha512_crypt".to_string()
    }
}
