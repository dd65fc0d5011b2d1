use std::collections::HashSet;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Store-related variables cleared by [`with_store_env`] unless overridden.
pub const STORE_ENV_KEYS: [&str; 4] = [
    "STORE_SECRET",
    "STORE_URL",
    "REPOSITORY_TYPE",
    "REPOSITORY_CONFIG",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment, since tests in one binary run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

/// Like [`with_scoped_env`], but starts from an environment with every store
/// variable unset so a developer's shell cannot leak into the test.
pub fn with_store_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let mut all: Vec<(&str, Option<&str>)> = STORE_ENV_KEYS
        .iter()
        .filter(|key| changes.iter().all(|(k, _)| k != *key))
        .map(|key| (*key, None))
        .collect();
    all.extend_from_slice(changes);
    with_scoped_env(&all, f)
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
