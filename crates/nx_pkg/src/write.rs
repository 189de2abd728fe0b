//! Types for writing NX containers
//!

mod blobs;
mod links;
mod nodes;
mod strings;

use binrw::{io::NoSeek, BinWrite};
use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use tracing::{info, instrument};

use crate::compression::{BlockCompressor, Lz4Compressor};
use crate::error::{Error, Result};
use crate::state::LayoutState;
use crate::tree::SourceTree;
use crate::types::NxHeader;

/// Options for how the NX file should be written
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct NxWriterOptions {
    /// Compress and store canvas pixels. Without it canvases keep their index but report
    /// a size of zero and the canvas table is empty.
    #[builder(default)]
    pub dump_images: bool,

    /// Store audio bytes. Without it audio nodes keep their index but report a length of
    /// zero and the audio table is empty.
    #[builder(default)]
    pub dump_audio: bool,

    /// Order each node's children with [`crate::natural::natural_cmp`] instead of keeping
    /// the source order
    #[builder(default)]
    pub sort_nodes: bool,
}

/// Count and offset table position of one of the header's tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TableInfo {
    pub count: u32,
    pub offset: u64,
}

const PADDING: [u8; 8] = [0u8; 8];

/// Pad `out` with zeroes up to the next multiple of `multiple` (at most 8)
pub(crate) fn align<O: Write + Seek>(out: &mut O, multiple: u64) -> Result<u64> {
    let position = out.stream_position()?;
    let padding = (multiple - position % multiple) % multiple;
    out.write_all(&PADDING[..padding as usize])?;
    Ok(position + padding)
}

/// Write an 8 byte aligned table of absolute offsets and return where it starts
pub(crate) fn write_offset_table<O: Write + Seek>(out: &mut O, offsets: &[u64]) -> Result<u64> {
    let start = align(out, 8)?;
    for offset in offsets {
        out.write_u64::<LittleEndian>(*offset)?;
    }
    Ok(start)
}

pub(crate) fn table_len(len: usize, table: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TableOverflow(table))
}

/// NX container generator
///
/// The sequential passes go through a buffer; link records are patched on `inner`
/// afterwards, which is why it has to be readable as well as writable.
///
/// ```
/// # fn doit() -> nx_pkg::error::Result<()>
/// # {
/// use nx_pkg::tree::{PropertyTree, PropertyValue, SourceTree};
/// use nx_pkg::write::{NxWriter, NxWriterOptions};
///
/// let mut tree = PropertyTree::new("");
/// tree.add(tree.root(), "version", PropertyValue::Integer(83));
///
/// // We use a buffer here, though you'd normally use a `File`
/// let nx = NxWriter::new(std::io::Cursor::new(Vec::new()), NxWriterOptions::builder()
///            .sort_nodes(true)
///            .build());
///
/// let buffer = nx.write_tree(&tree)?;
/// assert_eq!(&buffer.get_ref()[..4], b"PKG4");
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct NxWriter<W, C = Lz4Compressor> {
    inner: W,
    options: NxWriterOptions,
    compressor: C,
}

impl<W: Read + Write + Seek> NxWriter<W> {
    /// Create a writer that compresses canvases with [`Lz4Compressor`]
    pub fn new(inner: W, options: NxWriterOptions) -> NxWriter<W> {
        NxWriter::with_compressor(inner, options, Lz4Compressor)
    }
}

impl<W: Read + Write + Seek, C: BlockCompressor> NxWriter<W, C> {
    /// Create a writer using a custom canvas compressor
    pub fn with_compressor(inner: W, options: NxWriterOptions, compressor: C) -> NxWriter<W, C> {
        NxWriter {
            inner,
            options,
            compressor,
        }
    }

    /// Flatten `tree` into the container, starting at the beginning of `inner`
    ///
    /// This will return the writer positioned at the end of the container. The output is
    /// not truncated, so anything `inner` held past that point is left behind. On error the
    /// partially written output is left as is.
    #[instrument(skip_all, err, fields(options = ?self.options))]
    pub fn write_tree<T: SourceTree>(mut self, tree: &T) -> Result<W> {
        let mut state = LayoutState::new();
        let mut header = NxHeader::default();

        self.inner.rewind()?;
        let end = {
            let mut out = NoSeek::new(BufWriter::new(&mut self.inner));

            info!("writing header");
            header.write(&mut out)?;

            info!("writing nodes");
            header.node_offset = align(&mut out, 4)?;
            nodes::write_node_table(tree, &mut state, &mut out, &self.options)?;
            header.node_count = table_len(state.node_count(), "node")?;

            info!("writing strings");
            let strings = strings::write_string_table(&state, &mut out)?;
            header.string_count = strings.count;
            header.string_offset = strings.offset;

            if self.options.dump_images {
                info!("writing canvases");
                let canvases =
                    blobs::write_canvas_table(tree, state.canvases(), &self.compressor, &mut out)?;
                header.canvas_count = canvases.count;
                header.canvas_offset = canvases.offset;
            }

            if self.options.dump_audio {
                info!("writing audio");
                let audio = blobs::write_audio_table(tree, state.audio(), &mut out)?;
                header.audio_count = audio.count;
                header.audio_offset = audio.offset;
            }

            out.flush()?;
            out.stream_position()?
        };

        info!("writing linked nodes");
        links::resolve_links(&mut self.inner, &state, header.node_offset)?;

        info!("finalising");
        self.inner.seek(SeekFrom::Start(0))?;
        header.write(&mut self.inner)?;
        self.inner.seek(SeekFrom::Start(end))?;

        info!(
            nodes = header.node_count,
            strings = header.string_count,
            canvases = header.canvas_count,
            audio = header.audio_count,
            "container written"
        );

        Ok(self.inner)
    }
}
