/// Plain value types shared by every backend

/// Width and height of a 2D surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized extent means the window is minimized and nothing can be presented
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp each dimension into `[min, max]`
    pub fn clamp(self, min: Extent2D, max: Extent2D) -> Extent2D {
        Extent2D {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }
}

/// Pixel formats the frame core needs to reason about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    /// Anything the engine has no name for
    Other,
}

impl TextureFormat {
    pub fn is_srgb(&self) -> bool {
        matches!(self, TextureFormat::B8G8R8A8_SRGB | TextureFormat::R8G8B8A8_SRGB)
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_SFLOAT | TextureFormat::D24_UNORM_S8_UINT)
    }
}

/// Queue families the frame core submits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueFamily {
    Graphics,
    Present,
}

/// Index element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub fn size_in_bytes(&self) -> u64 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Clear values of the main render pass (color attachment 0, depth attachment 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl Default for ClearValues {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            stencil: 0,
        }
    }
}

// ===== DESCRIPTOR SET CONTRACT =====
//
// Fixed between the frame core and the pipeline-layout collaborator.

/// Set index of the per-frame global set (camera)
pub const GLOBAL_SET: u32 = 0;
/// Set index of the per-material set
pub const MATERIAL_SET: u32 = 1;
/// Set index of the per-entity set
pub const ENTITY_SET: u32 = 2;

/// Binding of the uniform buffer inside every set
pub const UNIFORM_BINDING: u32 = 0;
/// First combined image sampler binding of the material set
pub const FIRST_TEXTURE_BINDING: u32 = 1;
/// Last combined image sampler binding of the material set
pub const LAST_TEXTURE_BINDING: u32 = 2;
