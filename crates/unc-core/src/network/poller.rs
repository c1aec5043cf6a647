//! Bounded wait for the veth peer to appear in this namespace.
//!
//! The helper moves the peer in from the host with no handshake, so the
//! init stage polls the link list until a device of the expected kind
//! shows up or the deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use unc_common::constants::{LINK_KIND_VETH, LINK_POLL_INTERVAL, LINK_WAIT_TIMEOUT};
use unc_common::error::{Result, UncError};

use super::Link;

/// Anything that can list the links of the current namespace.
pub trait LinkSource {
    /// Returns the current link list.
    fn links(&self) -> impl Future<Output = Result<Vec<Link>>>;
}

#[cfg(target_os = "linux")]
impl LinkSource for super::Netlink {
    fn links(&self) -> impl Future<Output = Result<Vec<Link>>> {
        self.list_links()
    }
}

/// What to wait for, and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkWait {
    /// Link kind to wait for.
    pub kind: String,
    /// Total time budget.
    pub timeout: Duration,
    /// Delay between listings.
    pub interval: Duration,
}

impl Default for LinkWait {
    fn default() -> Self {
        Self {
            kind: LINK_KIND_VETH.into(),
            timeout: LINK_WAIT_TIMEOUT,
            interval: LINK_POLL_INTERVAL,
        }
    }
}

/// Polls `source` until a link of `wait.kind` appears.
///
/// Returns the first matching link, whatever its name.
///
/// # Errors
///
/// Returns [`UncError::LinkTimeout`] once the deadline passes. A failure to
/// list links is returned immediately without retrying.
pub async fn wait_for_link<S>(source: &S, wait: &LinkWait) -> Result<Link>
where
    S: LinkSource,
{
    tracing::debug!(kind = %wait.kind, timeout = ?wait.timeout, "waiting for network interface");
    let start = Instant::now();
    loop {
        if start.elapsed() > wait.timeout {
            return Err(UncError::LinkTimeout {
                kind: wait.kind.clone(),
                timeout: wait.timeout,
            });
        }
        let links = source.links().await?;
        if let Some(link) = links.into_iter().find(|l| l.is_kind(&wait.kind)) {
            tracing::debug!(
                name = %link.name,
                index = link.index,
                elapsed = ?start.elapsed(),
                "network interface found"
            );
            return Ok(link);
        }
        tokio::time::sleep(wait.interval).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::cell::Cell;

    use super::*;

    /// Link source whose answer depends on how many times it was asked.
    struct Scripted<F> {
        calls: Cell<usize>,
        respond: F,
    }

    impl<F> Scripted<F>
    where
        F: Fn(usize) -> Result<Vec<Link>>,
    {
        const fn new(respond: F) -> Self {
            Self {
                calls: Cell::new(0),
                respond,
            }
        }
    }

    impl<F> LinkSource for Scripted<F>
    where
        F: Fn(usize) -> Result<Vec<Link>>,
    {
        fn links(&self) -> impl Future<Output = Result<Vec<Link>>> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            std::future::ready((self.respond)(call))
        }
    }

    fn lo() -> Link {
        Link {
            index: 1,
            name: "lo".into(),
            kind: None,
        }
    }

    fn veth(name: &str) -> Link {
        Link {
            index: 9,
            name: name.into(),
            kind: Some("veth".into()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_veth_without_waiting() {
        let source = Scripted::new(|_| Ok(vec![lo(), veth("uv17")]));
        let start = Instant::now();
        let link = wait_for_link(&source, &LinkWait::default()).await.unwrap();
        assert_eq!(link.name, "uv17");
        assert_eq!(source.calls.get(), 1);
        assert!(start.elapsed() < LINK_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_no_veth_arrives() {
        let source = Scripted::new(|_| Ok(vec![lo()]));
        let start = Instant::now();
        let err = wait_for_link(&source, &LinkWait::default()).await.unwrap_err();
        assert!(err.is_link_timeout());
        assert!(start.elapsed() >= LINK_WAIT_TIMEOUT);
        assert!(source.calls.get() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn picks_up_a_late_arrival() {
        let source = Scripted::new(|call| {
            if call < 3 {
                Ok(vec![lo()])
            } else {
                Ok(vec![lo(), veth("uv4321")])
            }
        });
        let start = Instant::now();
        let link = wait_for_link(&source, &LinkWait::default()).await.unwrap();
        assert_eq!(link.name, "uv4321");
        assert_eq!(source.calls.get(), 4);
        let waited = start.elapsed();
        assert!(waited >= LINK_POLL_INTERVAL * 3 && waited < LINK_POLL_INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn listing_errors_abort_immediately() {
        let source = Scripted::new(|_| {
            Err(UncError::Netlink {
                operation: "list links".into(),
                message: "connection reset".into(),
            })
        });
        let err = wait_for_link(&source, &LinkWait::default()).await.unwrap_err();
        assert!(!err.is_link_timeout());
        assert!(matches!(err, UncError::Netlink { .. }));
        assert_eq!(source.calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_links_of_other_kinds() {
        let source = Scripted::new(|_| {
            Ok(vec![Link {
                index: 3,
                name: "br0".into(),
                kind: Some("bridge".into()),
            }])
        });
        let wait = LinkWait {
            timeout: Duration::from_millis(300),
            ..LinkWait::default()
        };
        let err = wait_for_link(&source, &wait).await.unwrap_err();
        assert!(err.is_link_timeout());
    }
}
