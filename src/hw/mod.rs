/*!
 * Hardware Layer
 *
 * Register-level backends for the syncpoint operation table. `SimHost`
 * models one host block in memory: syncpoint and wait base registers,
 * binary module locks, and an interrupt line raised whenever a syncpoint
 * advances. `SimMemory` models the command buffers wait checks patch.
 */

mod memory;
mod sim;

pub use memory::SimMemory;
pub use sim::SimHost;

use crate::core::limits::*;
use crate::core::types::SyncptId;

/// Host class "wait for syncpoint" method word
///
/// The syncpoint index sits in the top byte, the low 24 bits of the
/// threshold below it.
#[inline]
pub const fn class_host_wait_syncpt(id: SyncptId, thresh: u32) -> u32 {
    (id << 24) | (thresh & 0x00ff_ffff)
}

/// Conventional name of a well-known syncpoint, empty if unnamed
pub fn syncpt_name(id: SyncptId) -> &'static str {
    match id {
        SYNCPT_GRAPHICS_HOST => "gfx_host",
        SYNCPT_CSI_VI_0 => "csi_vi_0",
        SYNCPT_CSI_VI_1 => "csi_vi_1",
        SYNCPT_VI_ISP_0 => "vi_isp_0",
        SYNCPT_VI_ISP_1 => "vi_isp_1",
        SYNCPT_VI_ISP_2 => "vi_isp_2",
        SYNCPT_VI_ISP_3 => "vi_isp_3",
        SYNCPT_VI_ISP_4 => "vi_isp_4",
        SYNCPT_2D_0 => "2d_0",
        SYNCPT_2D_1 => "2d_1",
        SYNCPT_3D => "3d",
        SYNCPT_MPE => "mpe",
        SYNCPT_DISP0_A => "disp0_a",
        SYNCPT_DISP1_A => "disp1_a",
        SYNCPT_DISP0_B => "disp0_b",
        SYNCPT_DISP1_B => "disp1_b",
        SYNCPT_DISP0_C => "disp0_c",
        SYNCPT_DISP1_C => "disp1_c",
        SYNCPT_VBLANK0 => "vblank0",
        SYNCPT_VBLANK1 => "vblank1",
        SYNCPT_MPE_EBM_EOF => "mpe_ebm_eof",
        SYNCPT_MPE_WR_SAFE => "mpe_wr_safe",
        SYNCPT_AVP_0 => "avp",
        SYNCPT_DSI => "dsi",
        _ => "",
    }
}
