/// Buffer trait and buffer descriptor

use bitflags::bitflags;

use crate::error::Result;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Vertex buffer
        const VERTEX = 1 << 0;
        /// Index buffer
        const INDEX = 1 << 1;
        /// Uniform/constant buffer
        const UNIFORM = 1 << 2;
        /// Source of a buffer copy (staging)
        const TRANSFER_SRC = 1 << 3;
        /// Destination of a buffer copy
        const TRANSFER_DST = 1 << 4;
    }
}

/// Where the buffer memory lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Device-local, not host visible (written through staging copies)
    GpuOnly,
    /// Host visible and persistently mapped (staging, dynamic data)
    CpuToGpu,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Memory location
    pub location: MemoryLocation,
}

impl BufferDesc {
    /// Host-visible transfer source
    pub fn staging(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            usage: BufferUsage::TRANSFER_SRC,
            location: MemoryLocation::CpuToGpu,
        }
    }

    /// Device-local uniform buffer filled by staging copies
    pub fn uniform(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            usage: BufferUsage::UNIFORM | BufferUsage::TRANSFER_DST,
            location: MemoryLocation::GpuOnly,
        }
    }
}

/// GPU buffer
pub trait Buffer {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Write bytes through the host mapping
    ///
    /// Only valid for `MemoryLocation::CpuToGpu` buffers.
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}
