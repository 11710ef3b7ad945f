/// SPIR-V loading
///
/// Bytecode is produced offline (glslc); the engine only reads and sanity-checks it.

use std::path::Path;
use crate::engine_warn;
use crate::error::{Error, Result};

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Read a SPIR-V file into words
///
/// # Errors
///
/// `AssetLoadFailed` if the file cannot be read, is not a whole number of
/// 32-bit words, or does not start with the SPIR-V magic number.
pub fn load_spirv(path: &Path) -> Result<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|e| {
        engine_warn!("twilight::Shader", "Cannot read shader {}: {}", path.display(), e);
        Error::AssetLoadFailed(format!("{}: {}", path.display(), e))
    })?;
    parse_spirv(&bytes).map_err(|reason| {
        engine_warn!("twilight::Shader", "Rejected shader {}: {}", path.display(), reason);
        Error::AssetLoadFailed(format!("{}: {}", path.display(), reason))
    })
}

/// Convert little-endian SPIR-V bytes to words
pub fn parse_spirv(bytes: &[u8]) -> std::result::Result<Vec<u32>, String> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(format!("{} bytes is not a whole number of SPIR-V words", bytes.len()));
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    if words[0] != SPIRV_MAGIC {
        return Err(format!("bad magic number {:#010x}", words[0]));
    }
    Ok(words)
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
