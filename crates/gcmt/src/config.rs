//! Thread-creation configuration.
//!
//! Read once from the environment on first use:
//! - `GCMT_THREAD_STACK_SIZE`: stack size in bytes for threads created
//!   through [`Thread`](crate::Thread). Accepts a plain byte count or a `k`/`m`
//!   suffix (`512k`, `8m`). Values below [`MIN_STACK_SIZE`] or unparseable
//!   values are ignored and the platform default applies.
//! - `GCMT_THREAD_NAME_PREFIX`: prefix for OS thread names (default `gcmt`).
//!   Threads are named `<prefix>-<id>` unless a builder sets a name.

use std::sync::OnceLock;

pub const STACK_SIZE_ENV: &str = "GCMT_THREAD_STACK_SIZE";
pub const NAME_PREFIX_ENV: &str = "GCMT_THREAD_NAME_PREFIX";

pub const DEFAULT_NAME_PREFIX: &str = "gcmt";

/// Smallest stack size accepted from the environment.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmtConfig {
    /// `None` keeps the platform default.
    pub thread_stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for GcmtConfig {
    fn default() -> Self {
        Self {
            thread_stack_size: None,
            thread_name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

impl GcmtConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let thread_stack_size = lookup(STACK_SIZE_ENV).and_then(|raw| {
            let parsed = parse_stack_size(&raw);
            if parsed.is_none() {
                log::warn!("gcmt: ignoring {STACK_SIZE_ENV}={raw:?}");
            }
            parsed
        });
        let thread_name_prefix = lookup(NAME_PREFIX_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|prefix| !prefix.is_empty() && !prefix.contains('\0'))
            .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string());
        Self {
            thread_stack_size,
            thread_name_prefix,
        }
    }
}

fn parse_stack_size(raw: &str) -> Option<usize> {
    let raw = raw.trim().to_ascii_lowercase();
    let (digits, scale) = match raw.as_bytes().last()? {
        b'k' => (&raw[..raw.len() - 1], 1024),
        b'm' => (&raw[..raw.len() - 1], 1024 * 1024),
        _ => (raw.as_str(), 1),
    };
    let size = digits.trim().parse::<usize>().ok()?.checked_mul(scale)?;
    (size >= MIN_STACK_SIZE).then_some(size)
}

/// Process-wide configuration, resolved on first call.
pub fn config() -> &'static GcmtConfig {
    static CONFIG: OnceLock<GcmtConfig> = OnceLock::new();
    CONFIG.get_or_init(GcmtConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(GcmtConfig::from_lookup(lookup(&[])), GcmtConfig::default());
    }

    #[test]
    fn stack_size_units() {
        let cfg = GcmtConfig::from_lookup(lookup(&[(STACK_SIZE_ENV, "65536")]));
        assert_eq!(cfg.thread_stack_size, Some(65_536));
        let cfg = GcmtConfig::from_lookup(lookup(&[(STACK_SIZE_ENV, "512K")]));
        assert_eq!(cfg.thread_stack_size, Some(512 * 1024));
        let cfg = GcmtConfig::from_lookup(lookup(&[(STACK_SIZE_ENV, " 8m ")]));
        assert_eq!(cfg.thread_stack_size, Some(8 * 1024 * 1024));
    }

    #[test]
    fn bad_stack_sizes_are_ignored() {
        for raw in ["", "k", "lots", "-4096", "1024", "99999999999999999999m"] {
            let cfg = GcmtConfig::from_lookup(lookup(&[(STACK_SIZE_ENV, raw)]));
            assert_eq!(cfg.thread_stack_size, None, "{raw:?}");
        }
    }

    #[test]
    fn name_prefix() {
        let cfg = GcmtConfig::from_lookup(lookup(&[(NAME_PREFIX_ENV, "solver")]));
        assert_eq!(cfg.thread_name_prefix, "solver");
        let cfg = GcmtConfig::from_lookup(lookup(&[(NAME_PREFIX_ENV, "  ")]));
        assert_eq!(cfg.thread_name_prefix, DEFAULT_NAME_PREFIX);
    }
}
