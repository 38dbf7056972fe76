//! Render state toggles and the pipeline key they compile into

use bitflags::bitflags;
use log::debug;

use crate::colour::{BlendFunc, Colour};
use crate::framebuffer::DepthFunc;

bitflags! {
    /// Every toggle that selects a pipeline variant
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StateFlags: u8 {
        const DEPTH_TEST  = 0b0000_0001;
        const CULL_FRONT  = 0b0000_0010;
        const CULL_BACK   = 0b0000_0100;
        const CLIP        = 0b0000_1000;
        const PERSPECTIVE = 0b0001_0000;
        const BLEND       = 0b0010_0000;
        /// Clockwise triangles are front-facing
        const FRONT_CW    = 0b0100_0000;
    }
}

bitflags! {
    /// Buffers reset by `clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ClearMask: u8 {
        const COLOUR = 0b01;
        const DEPTH  = 0b10;
    }
}

/// 8-bit key selecting one pipeline variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey(u8);

impl PipelineKey {
    #[inline]
    pub fn new(flags: StateFlags) -> PipelineKey { PipelineKey(flags.bits()) }

    #[inline]
    pub fn raw(self) -> u8 { self.0 }

    #[inline]
    pub fn flags(self) -> StateFlags { StateFlags::from_bits_truncate(self.0) }
}

/// Capabilities toggled by `enable`/`disable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    DepthTest,
    CullFace,
    Clipping,
    PerspectiveCorrection,
    Blend,
}

/// Which faces are culled when `Capability::CullFace` is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

/// Screen-space winding of front-facing triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrontFace {
    Cw,
    Ccw,
}

/// Live render state. The pipeline key is recompiled by every setter that affects it.
#[derive(Debug, Clone)]
pub struct RenderState {
    enabled: [bool; 5],
    cull_face: CullFace,
    front_face: FrontFace,
    key: PipelineKey,
    pub depth_func: DepthFunc,
    pub depth_mask: bool,
    pub clear_colour: Colour,
    pub clear_depth: f32,
    pub blend_func: BlendFunc,
}

impl Default for RenderState {
    fn default() -> RenderState {
        let mut state = RenderState {
            enabled: [false; 5],
            cull_face: CullFace::Back,
            front_face: FrontFace::Ccw,
            key: PipelineKey(0),
            depth_func: DepthFunc::Less,
            depth_mask: true,
            clear_colour: Colour::new(0.0, 0.0, 0.0, 0.0),
            clear_depth: 1.0,
            blend_func: BlendFunc::default(),
        };

        state.enabled[Capability::Clipping as usize] = true;
        state.enabled[Capability::PerspectiveCorrection as usize] = true;
        state.recompile();
        state
    }
}

impl RenderState {
    #[inline]
    pub fn key(&self) -> PipelineKey { self.key }

    #[inline]
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled[capability as usize]
    }

    pub fn set_enabled(&mut self, capability: Capability, enabled: bool) {
        self.enabled[capability as usize] = enabled;
        self.recompile();
    }

    #[inline]
    pub fn cull_face(&self) -> CullFace { self.cull_face }

    pub fn set_cull_face(&mut self, cull_face: CullFace) {
        self.cull_face = cull_face;
        self.recompile();
    }

    #[inline]
    pub fn front_face(&self) -> FrontFace { self.front_face }

    pub fn set_front_face(&mut self, front_face: FrontFace) {
        self.front_face = front_face;
        self.recompile();
    }

    fn recompile(&mut self) {
        let mut flags = StateFlags::empty();

        flags.set(StateFlags::DEPTH_TEST, self.is_enabled(Capability::DepthTest));
        flags.set(StateFlags::CLIP, self.is_enabled(Capability::Clipping));
        flags.set(StateFlags::PERSPECTIVE, self.is_enabled(Capability::PerspectiveCorrection));
        flags.set(StateFlags::BLEND, self.is_enabled(Capability::Blend));
        flags.set(StateFlags::FRONT_CW, self.front_face == FrontFace::Cw);

        if self.is_enabled(Capability::CullFace) {
            flags |= match self.cull_face {
                CullFace::Front => StateFlags::CULL_FRONT,
                CullFace::Back => StateFlags::CULL_BACK,
                CullFace::FrontAndBack => StateFlags::CULL_FRONT | StateFlags::CULL_BACK,
            };
        }

        let key = PipelineKey::new(flags);

        if key != self.key {
            debug!("Pipeline key changed from {:#010b} to {:#010b}", self.key.raw(), key.raw());
        }

        self.key = key;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_key() {
        let state = RenderState::default();

        assert_eq!(state.key().flags(), StateFlags::CLIP | StateFlags::PERSPECTIVE);
        assert!(!state.is_enabled(Capability::DepthTest));
    }

    #[test]
    fn test_culling_only_applies_when_enabled() {
        let mut state = RenderState::default();

        state.set_cull_face(CullFace::FrontAndBack);
        assert!(!state.key().flags().intersects(StateFlags::CULL_FRONT | StateFlags::CULL_BACK));

        state.set_enabled(Capability::CullFace, true);
        assert!(state.key().flags().contains(StateFlags::CULL_FRONT | StateFlags::CULL_BACK));

        state.set_cull_face(CullFace::Back);
        state.set_front_face(FrontFace::Cw);
        assert_eq!(state.key().flags() & (StateFlags::CULL_FRONT | StateFlags::CULL_BACK | StateFlags::FRONT_CW),
                   StateFlags::CULL_BACK | StateFlags::FRONT_CW);
    }
}
