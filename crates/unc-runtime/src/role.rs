//! Launcher/init role dispatch.
//!
//! Namespace entry work (mounting, pivoting) only makes sense in a process
//! created inside the new namespaces, so the launcher re-executes its own
//! binary with [`INIT_SENTINEL`] as `argv[0]` and the entrypoint branches
//! on it before any argument parsing happens.

use unc_common::constants::INIT_SENTINEL;

/// Which half of the lifecycle this process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Invoked by a user: parse arguments and launch a container.
    Launcher,
    /// Re-executed by the launcher inside the new namespaces. Carries the
    /// target command (program first).
    Init(Vec<String>),
}

/// Determines the role from the full argument vector, `argv[0]` included.
pub fn detect<I>(argv: I) -> Role
where
    I: IntoIterator<Item = String>,
{
    let mut argv = argv.into_iter();
    match argv.next() {
        Some(arg0) if arg0 == INIT_SENTINEL => Role::Init(argv.collect()),
        _ => Role::Launcher,
    }
}

/// Builds the argument vector for the init re-exec of `command`.
pub fn init_argv(command: &[String]) -> Vec<String> {
    std::iter::once(INIT_SENTINEL.to_string())
        .chain(command.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn plain_invocation_is_launcher() {
        assert_eq!(detect(args(&["unc", "echo", "hi"])), Role::Launcher);
        assert_eq!(detect(args(&["/usr/bin/unc"])), Role::Launcher);
        assert_eq!(detect(Vec::new()), Role::Launcher);
    }

    #[test]
    fn sentinel_argv0_is_init() {
        assert_eq!(
            detect(args(&["unc-fork", "echo", "hi"])),
            Role::Init(args(&["echo", "hi"]))
        );
    }

    #[test]
    fn sentinel_as_later_argument_is_ignored() {
        assert_eq!(detect(args(&["unc", "unc-fork", "sh"])), Role::Launcher);
    }

    #[test]
    fn init_argv_round_trips_through_detect() {
        let command = args(&["sh", "-c", "echo $HOSTNAME"]);
        let argv = init_argv(&command);
        assert_eq!(argv[0], INIT_SENTINEL);
        assert_eq!(detect(argv), Role::Init(command));
    }
}
