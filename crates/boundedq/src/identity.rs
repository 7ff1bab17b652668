//! Process-unique client identity, written into the `producer`/`consumer`
//! keys for observability. Protocol correctness never depends on its
//! uniqueness, only on its stability for a handle's lifetime.

/// Returns a string identifying this client instance: canonical hostname
/// joined with the OS process id, e.g. `"host.example.com_pid4217"`.
pub(crate) fn client_identity() -> String {
    let host = gethostname::gethostname().to_string_lossy().into_owned();
    format!("{host}_pid{}", std::process::id())
}
