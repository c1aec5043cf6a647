//! # unet — unc network helper
//!
//! Privileged helper invoked by `unc` with the PID of a freshly created
//! container. Attaches that container's network namespace to the host
//! bridge and exits; the exit status is the only result.

use clap::Parser;

/// Attach a container's network namespace to the unc bridge.
#[derive(Parser, Debug)]
#[command(name = "unet", version, about, long_about = None)]
struct Args {
    /// PID whose network namespace receives the veth peer.
    pid: u32,
}

#[cfg(target_os = "linux")]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let _ = unc_net::attach(args.pid).await?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() -> anyhow::Result<()> {
    let _ = Args::parse();
    anyhow::bail!("unet requires Linux network namespaces")
}
