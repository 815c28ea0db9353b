/*!
 * System Limits and Constants
 *
 * Default id-space sizes, wait-engine periods and diagnostic paths.
 * Everything here can be overridden through `SyncptConfig`.
 */

use std::time::Duration;

// =============================================================================
// ID SPACES
// =============================================================================

/// Number of syncpoints on the reference host block
/// Wait-check masks are 32-bit, so this is also the upper bound
pub const NB_PTS: u32 = 32;

/// Maximum syncpoints addressable through a wait-check mask
pub const MAX_NB_PTS: u32 = u32::BITS;

/// Number of wait base registers
pub const NB_BASES: u32 = 8;

/// Number of hardware mutexes (module locks)
pub const NB_MTXS: u32 = 16;

// =============================================================================
// WELL-KNOWN SYNCPOINTS
// =============================================================================

/// Host-owned syncpoint, always at zero; wait-check patches expired waits onto it
pub const SYNCPT_GRAPHICS_HOST: u32 = 0;
pub const SYNCPT_CSI_VI_1: u32 = 1;
pub const SYNCPT_AVP_0: u32 = 10;
pub const SYNCPT_CSI_VI_0: u32 = 11;
pub const SYNCPT_VI_ISP_0: u32 = 12;
pub const SYNCPT_VI_ISP_1: u32 = 13;
pub const SYNCPT_VI_ISP_2: u32 = 14;
pub const SYNCPT_VI_ISP_3: u32 = 15;
pub const SYNCPT_VI_ISP_4: u32 = 16;
pub const SYNCPT_DSI: u32 = 17;
pub const SYNCPT_2D_0: u32 = 18;
pub const SYNCPT_2D_1: u32 = 19;
pub const SYNCPT_DISP0_B: u32 = 20;
pub const SYNCPT_DISP1_B: u32 = 21;
pub const SYNCPT_3D: u32 = 22;
pub const SYNCPT_MPE: u32 = 23;
pub const SYNCPT_DISP0_A: u32 = 24;
pub const SYNCPT_DISP1_A: u32 = 25;
pub const SYNCPT_VBLANK0: u32 = 26;
pub const SYNCPT_VBLANK1: u32 = 27;
pub const SYNCPT_MPE_EBM_EOF: u32 = 28;
pub const SYNCPT_MPE_WR_SAFE: u32 = 29;
pub const SYNCPT_DISP0_C: u32 = 30;
pub const SYNCPT_DISP1_C: u32 = 31;

const fn bit(id: u32) -> u32 {
    1 << id
}

/// Syncpoints whose max is owned by their client (display, camera, AVP)
pub const CLIENT_MANAGED_MASK: u32 = bit(SYNCPT_DISP0_A)
    | bit(SYNCPT_DISP1_A)
    | bit(SYNCPT_DISP0_B)
    | bit(SYNCPT_DISP1_B)
    | bit(SYNCPT_DISP0_C)
    | bit(SYNCPT_DISP1_C)
    | bit(SYNCPT_DSI)
    | bit(SYNCPT_VBLANK0)
    | bit(SYNCPT_VBLANK1)
    | bit(SYNCPT_CSI_VI_0)
    | bit(SYNCPT_CSI_VI_1)
    | bit(SYNCPT_VI_ISP_1)
    | bit(SYNCPT_VI_ISP_2)
    | bit(SYNCPT_VI_ISP_3)
    | bit(SYNCPT_VI_ISP_4)
    | bit(SYNCPT_MPE_EBM_EOF)
    | bit(SYNCPT_MPE_WR_SAFE)
    | bit(SYNCPT_2D_1)
    | bit(SYNCPT_AVP_0);

// =============================================================================
// WAIT ENGINE
// =============================================================================

/// Longest single sleep of a blocking wait
/// Even an infinite wait wakes this often to re-check and report
pub const SYNCPT_CHECK_PERIOD: Duration = Duration::from_secs(2);

/// Stuck reports tolerated before a wait is declared a hardware hang
pub const MAX_STUCK_CHECK_COUNT: u32 = 15;

/// Clock tree dump read once on the first stuck wait
pub const CLOCK_TREE_PATH: &str = "/d/clock/clock_tree";

/// Read size used while scanning the clock tree dump
pub const CLOCK_TREE_CHUNK: usize = 20;

// =============================================================================
// INTERRUPTS
// =============================================================================

/// Outstanding waiters the software interrupt controller will hand out
pub const MAX_INTR_WAITERS: usize = 4096;
