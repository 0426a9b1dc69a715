/// Sampler - VkSampler presets for material textures
///
/// Typical scenes only need a handful of samplers, so they are described by a
/// small preset enum instead of a full descriptor.

use aurora_engine::aurora::Result;
use aurora_engine::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Sampler presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    LinearRepeat,
    LinearClamp,
    NearestRepeat,
    NearestClamp,
}

/// Filtering and addressing of a preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    pub address_mode: vk::SamplerAddressMode,
    /// Requested anisotropy (None = disabled)
    pub anisotropy: Option<f32>,
}

impl SamplerKind {
    pub fn params(&self) -> SamplerParams {
        match self {
            SamplerKind::LinearRepeat => SamplerParams {
                filter: vk::Filter::LINEAR,
                mipmap_mode: vk::SamplerMipmapMode::LINEAR,
                address_mode: vk::SamplerAddressMode::REPEAT,
                anisotropy: Some(16.0),
            },
            SamplerKind::LinearClamp => SamplerParams {
                filter: vk::Filter::LINEAR,
                mipmap_mode: vk::SamplerMipmapMode::LINEAR,
                address_mode: vk::SamplerAddressMode::CLAMP_TO_EDGE,
                anisotropy: Some(16.0),
            },
            SamplerKind::NearestRepeat => SamplerParams {
                filter: vk::Filter::NEAREST,
                mipmap_mode: vk::SamplerMipmapMode::NEAREST,
                address_mode: vk::SamplerAddressMode::REPEAT,
                anisotropy: None,
            },
            SamplerKind::NearestClamp => SamplerParams {
                filter: vk::Filter::NEAREST,
                mipmap_mode: vk::SamplerMipmapMode::NEAREST,
                address_mode: vk::SamplerAddressMode::CLAMP_TO_EDGE,
                anisotropy: None,
            },
        }
    }
}

/// Clamp a requested anisotropy to the device limit (None when unsupported)
pub fn effective_anisotropy(requested: Option<f32>, device_max: f32) -> Option<f32> {
    match requested {
        Some(value) if device_max >= 1.0 => Some(value.min(device_max)),
        _ => None,
    }
}

/// Vulkan sampler
pub struct Sampler {
    ctx: Arc<GpuContext>,
    pub(crate) sampler: vk::Sampler,
    kind: SamplerKind,
}

impl Sampler {
    pub(crate) fn new(ctx: Arc<GpuContext>, kind: SamplerKind, max_anisotropy: f32) -> Result<Self> {
        let params = kind.params();
        let mut create_info = vk::SamplerCreateInfo::default()
            .mag_filter(params.filter)
            .min_filter(params.filter)
            .mipmap_mode(params.mipmap_mode)
            .address_mode_u(params.address_mode)
            .address_mode_v(params.address_mode)
            .address_mode_w(params.address_mode)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .unnormalized_coordinates(false);

        if let Some(anisotropy) = effective_anisotropy(params.anisotropy, max_anisotropy) {
            create_info = create_info.anisotropy_enable(true).max_anisotropy(anisotropy);
        } else {
            create_info = create_info.anisotropy_enable(false).max_anisotropy(1.0);
        }

        let sampler = unsafe { ctx.device.create_sampler(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan", "Failed to create {:?} sampler: {:?}", kind, e))?;
        Ok(Self { ctx, sampler, kind })
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_sampler_tests.rs"]
mod tests;
