use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Seek, Write};
use tracing::{debug, instrument};

use crate::compression::BlockCompressor;
use crate::error::{Error, Result};
use crate::state::CanvasEntry;
use crate::tree::SourceTree;
use crate::write::{align, table_len, write_offset_table, TableInfo};

/// Compress and write the pixels of every queued canvas, then their offset table
///
/// Blobs are 8 byte aligned and prefixed with their compressed length as a u32. Pixels that
/// do not hold four bytes for every pixel of the recorded size are rejected.
#[instrument(skip_all, err, fields(count = canvases.len()))]
pub(crate) fn write_canvas_table<T, C, O>(
    tree: &T,
    canvases: &[CanvasEntry<T::Handle>],
    compressor: &C,
    out: &mut O,
) -> Result<TableInfo>
where
    T: SourceTree,
    C: BlockCompressor,
    O: Write + Seek,
{
    let mut offsets = Vec::with_capacity(canvases.len());

    for entry in canvases {
        let canvas = entry.node;
        let pixels = tree.canvas_pixels(canvas)?;
        if pixels.len() != entry.pixel_len() {
            let actual = pixels.len();
            drop(pixels);
            tree.release(canvas);
            return Err(Error::CanvasSizeMismatch {
                name: tree.name(canvas).to_string(),
                expected: entry.pixel_len(),
                actual,
            });
        }
        let compressed = compressor.compress(&pixels)?;
        drop(pixels);
        tree.release(canvas);

        let length =
            u32::try_from(compressed.len()).map_err(|_| Error::BlobTooLarge(compressed.len()))?;
        debug!(name = tree.name(canvas), length, "writing canvas");

        offsets.push(align(out, 8)?);
        out.write_u32::<LittleEndian>(length)?;
        out.write_all(&compressed)?;
    }

    Ok(TableInfo {
        count: table_len(offsets.len(), "canvas")?,
        offset: write_offset_table(out, &offsets)?,
    })
}

/// Write the raw bytes of every queued audio node, then their offset table
#[instrument(skip_all, err, fields(count = audio.len()))]
pub(crate) fn write_audio_table<T, O>(tree: &T, audio: &[T::Handle], out: &mut O) -> Result<TableInfo>
where
    T: SourceTree,
    O: Write + Seek,
{
    let mut offsets = Vec::with_capacity(audio.len());

    for &sound in audio {
        let bytes = tree.audio_bytes(sound)?;
        debug!(name = tree.name(sound), length = bytes.len(), "writing audio");

        offsets.push(align(out, 8)?);
        out.write_all(&bytes)?;
        drop(bytes);
        tree.release(sound);
    }

    Ok(TableInfo {
        count: table_len(offsets.len(), "audio")?,
        offset: write_offset_table(out, &offsets)?,
    })
}
