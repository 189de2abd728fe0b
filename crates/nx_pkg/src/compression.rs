//! Block compression for canvas payloads.

use lz4_flex::block;
use tracing::instrument;

use crate::error::Result;

/// Compresses a whole buffer in one call
///
/// Canvas pixel data is handed to the compressor one image at a time. The compressed
/// bytes are written with a 32 bit length prefix, so the output must be self-contained.
///
/// When creating containers, the compressor is chosen via [`crate::write::NxWriter::with_compressor`].
pub trait BlockCompressor {
    /// An upper bound on the compressed size of `input_len` bytes
    fn max_compressed_size(&self, input_len: usize) -> usize;

    /// Compress `input` into `output`, returning the number of bytes used
    fn compress_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Compress `input` into a freshly allocated buffer
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = vec![0u8; self.max_compressed_size(input.len())];
        let written = self.compress_into(input, &mut output)?;
        output.truncate(written);
        Ok(output)
    }
}

/// LZ4 block format, without a size prefix or frame
///
/// The uncompressed size is known to readers from the canvas dimensions stored in the
/// node record (four bytes per pixel).
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl BlockCompressor for Lz4Compressor {
    fn max_compressed_size(&self, input_len: usize) -> usize {
        block::get_maximum_output_size(input_len)
    }

    #[instrument(skip_all, err, fields(size = input.len()))]
    fn compress_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        Ok(block::compress_into(input, output)?)
    }
}

/// Inverse of [`Lz4Compressor`]
#[instrument(skip(input), err, fields(size = input.len()))]
pub(crate) fn decompress_canvas(input: &[u8], uncompressed: usize) -> Result<Vec<u8>> {
    Ok(block::decompress(input, uncompressed)?)
}
