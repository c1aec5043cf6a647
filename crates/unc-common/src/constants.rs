//! Fixed names, addresses, and timings shared by the launcher, the
//! in-namespace init stage, and the network helper.

use std::time::Duration;

/// Reserved `argv[0]` that tells a re-executed `unc` to act as the
/// in-namespace init stage. Only the launcher's self re-exec sets it.
pub const INIT_SENTINEL: &str = "unc-fork";

/// Name of the privileged network helper looked up on `PATH`.
pub const NETWORK_HELPER: &str = "unet";

/// Environment variable that overrides [`NETWORK_HELPER`].
pub const NETWORK_HELPER_ENV: &str = "UNC_NETWORK_HELPER";

/// Hostname assigned inside the container's UTS namespace.
pub const HOSTNAME: &str = "unc";

/// Host bridge every container's veth pair is attached to.
pub const BRIDGE_NAME: &str = "unc0";

/// Prefix for generated veth device names.
pub const VETH_PREFIX: &str = "uv";

/// Exclusive upper bound of the random numeric veth name suffix.
pub const VETH_SUFFIX_RANGE: u32 = 10_000;

/// Gateway address assigned to the bridge.
pub const BRIDGE_CIDR: &str = "10.100.42.1/24";

/// First three octets of the per-container subnet.
pub const SUBNET_PREFIX: [u8; 3] = [10, 100, 42];

/// Prefix length of the per-container subnet.
pub const SUBNET_PREFIX_LEN: u8 = 24;

/// Lowest host octet handed to a container (skips network and gateway).
pub const HOST_OCTET_MIN: u8 = 2;

/// Highest host octet handed to a container (skips broadcast).
pub const HOST_OCTET_MAX: u8 = 254;

/// Link kind the init stage waits for.
pub const LINK_KIND_VETH: &str = "veth";

/// Loopback device name.
pub const LOOPBACK: &str = "lo";

/// Total time the init stage waits for the veth peer to appear.
pub const LINK_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between two link listings while waiting.
pub const LINK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Staging directory (relative to the new root) that receives the old root.
pub const PIVOT_DIR_NAME: &str = ".pivot_root";

/// Stack size handed to `clone(2)` for the namespaced child.
pub const CLONE_STACK_SIZE: usize = 1024 * 1024;

/// Environment variable providing the default command.
pub const SHELL_ENV: &str = "SHELL";
