//! Session cookie settings read from the environment.
//!
//! | Variable | Meaning | Debug default |
//! |---|---|---|
//! | `SESSION_KEY_FILE` | key material path | `/var/run/secrets/session_key` |
//! | `SESSION_COOKIE_SECURE` | `Secure` cookie flag | `true` |
//! | `SESSION_SAMESITE` | `Strict`, `Lax` or `None` | `Lax` |
//! | `SESSION_ALLOW_EPHEMERAL` | generate a key when the file is missing | `false` |
//!
//! Debug builds log a warning and fall back to the default for anything
//! missing or malformed. Release builds refuse to start instead, and never
//! run on an ephemeral key.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key file length accepted by release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// `Key::derive_from` needs at least this much master key material.
const DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Whether missing settings are tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Warn and fall back to defaults.
    Debug,
    /// Fail on anything missing or malformed.
    Release,
}

impl BuildMode {
    /// The mode of the running binary.
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether cookies carry the `Secure` flag.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short fingerprint identifying the active key in logs.
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Rejected session configuration.
#[derive(Debug, Error)]
pub enum SessionConfigError {
    /// A required variable is unset.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable holds an unusable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short to derive a key from.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes found.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not run on a generated key.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate session settings.
///
/// # Errors
///
/// In [`BuildMode::Release`], any missing or malformed variable, an
/// unreadable or short key file, or `SameSite=None` without `Secure`.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use postboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string()
///     .returning(|name| (name == "SESSION_KEY_FILE").then(|| "/nonexistent/key".to_owned()));
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).unwrap();
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = read_bool(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = read_same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = read_bool(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    let key = read_key(&path, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Debug builds substitute `fallback`, release builds fail with `err`.
fn tolerate<T>(
    mode: BuildMode,
    fallback: T,
    err: SessionConfigError,
) -> Result<T, SessionConfigError> {
    match mode {
        BuildMode::Debug => {
            warn!(error = %err, "using default session setting");
            Ok(fallback)
        }
        BuildMode::Release => Err(err),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn read_bool<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return tolerate(mode, fallback, SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => tolerate(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn read_same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return tolerate(mode, fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => tolerate(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => tolerate(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn read_key_bytes(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(name).map(Zeroizing::new)
}

fn read_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match read_key_bytes(path) {
        Ok(bytes) => {
            let min_len = match mode {
                BuildMode::Debug => DERIVE_MIN_LEN,
                BuildMode::Release => SESSION_KEY_MIN_LEN,
            };
            if bytes.len() < min_len {
                let err = SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length: bytes.len(),
                    min_len,
                };
                return tolerate(mode, Key::generate(), err);
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// First eight bytes of the SHA-256 of the signing key, hex encoded.
///
/// # Examples
/// ```
/// use actix_web::cookie::Key;
/// use postboard::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::derive_from(&[7; 64]));
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct KeyFile {
        _dir: TempDir,
        path: String,
    }

    fn key_file(len: usize) -> KeyFile {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session_key");
        std::fs::write(&path, vec![b'k'; len]).expect("write key");
        KeyFile {
            path: path.to_str().expect("utf-8 path").to_owned(),
            _dir: dir,
        }
    }

    fn env_from(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |name| vars.get(name).cloned());
        env
    }

    #[fixture]
    fn full_key() -> KeyFile {
        key_file(SESSION_KEY_MIN_LEN)
    }

    fn release_vars(path: &str) -> Vec<(&str, &str)> {
        vec![
            (KEY_FILE_ENV, path),
            (COOKIE_SECURE_ENV, "1"),
            (SAMESITE_ENV, "Strict"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ]
    }

    #[rstest]
    fn release_accepts_complete_settings(full_key: KeyFile) {
        let env = env_from(&release_vars(&full_key.path));
        let settings =
            session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
        assert_eq!(
            settings.key_fingerprint(),
            key_fingerprint(&Key::derive_from(&[b'k'; SESSION_KEY_MIN_LEN]))
        );
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_rejects_missing_toggles(full_key: KeyFile, #[case] missing: &str) {
        let vars: Vec<_> = release_vars(&full_key.path)
            .into_iter()
            .filter(|(name, _)| *name != missing)
            .collect();
        let err = session_settings_from_env(&env_from(&vars), BuildMode::Release)
            .err()
            .expect("missing toggle rejected");
        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let short = key_file(SESSION_KEY_MIN_LEN - 1);
        let env = env_from(&release_vars(&short.path));
        let err = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("short key rejected");
        assert!(matches!(
            err,
            SessionConfigError::KeyTooShort { length, min_len, .. }
                if length == SESSION_KEY_MIN_LEN - 1 && min_len == SESSION_KEY_MIN_LEN
        ));
    }

    #[rstest]
    fn debug_replaces_underived_keys() {
        let stub = key_file(DERIVE_MIN_LEN - 1);
        let env = env_from(&[(KEY_FILE_ENV, stub.path.as_str())]);
        let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");
        assert_eq!(settings.key_fingerprint().len(), FINGERPRINT_BYTES * 2);
    }

    #[rstest]
    fn release_rejects_missing_key_file() {
        let env = env_from(&release_vars("/nonexistent/postboard/key"));
        let err = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("missing key rejected");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys(full_key: KeyFile) {
        let mut vars = release_vars(&full_key.path);
        vars.retain(|(name, _)| *name != ALLOW_EPHEMERAL_ENV);
        vars.push((ALLOW_EPHEMERAL_ENV, "yes"));
        let err = session_settings_from_env(&env_from(&vars), BuildMode::Release)
            .err()
            .expect("ephemeral rejected");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_insecure_same_site_none(full_key: KeyFile) {
        let vars = vec![
            (KEY_FILE_ENV, full_key.path.as_str()),
            (COOKIE_SECURE_ENV, "0"),
            (SAMESITE_ENV, "None"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ];
        let err = session_settings_from_env(&env_from(&vars), BuildMode::Release)
            .err()
            .expect("insecure None rejected");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn debug_falls_back_on_everything() {
        let env = env_from(&[
            (KEY_FILE_ENV, "/nonexistent/postboard/key"),
            (COOKIE_SECURE_ENV, "perhaps"),
            (SAMESITE_ENV, "sideways"),
        ]);
        let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("Yes", Some(true))]
    #[case("n", Some(false))]
    #[case("FALSE", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn parses_boolean_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[rstest]
    fn fingerprints_distinguish_keys() {
        let a = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let b = key_fingerprint(&Key::derive_from(&[b'b'; 64]));
        assert_eq!(a.len(), FINGERPRINT_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
