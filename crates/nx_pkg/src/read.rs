//! Types for reading NX containers
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt::{self, Debug};
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;

use crate::compression::decompress_canvas;
use crate::error::{Error, NotFoundError, Result};
use crate::types::{NodeData, NodeRecord, NxHeader, NODE_SIZE};

/// A decoded entry of the node table
#[derive(Clone, PartialEq)]
pub struct NxNode {
    /// Id of this node
    pub id: u32,
    /// Name looked up in the string table
    pub name: String,
    /// Id of the first child
    pub first_child: u32,
    /// Number of children
    pub child_count: u16,
    /// Decoded payload
    pub data: NodeData,
}

impl NxNode {
    /// Ids of the children of this node
    pub fn children(&self) -> Range<u32> {
        self.first_child
            ..self
                .first_child
                .saturating_add(u32::from(self.child_count))
    }
}

impl Debug for NxNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NxNode({} {:?} {:?})", self.id, self.name, self.data)
    }
}

/// NX container reader
///
/// The offset tables are loaded up front, nodes and blobs are read on demand.
///
/// ```no_run
/// fn print_children(reader: impl std::io::Read + std::io::Seek) -> nx_pkg::error::Result<()> {
///     let mut nx = nx_pkg::NxFile::new(reader)?;
///
///     let root = nx.root()?;
///     for child in nx.children(&root)? {
///         println!("{}: {:?}", child.name, child.data);
///     }
///
///     Ok(())
/// }
/// ```
pub struct NxFile<R> {
    reader: R,
    header: NxHeader,
    strings: Vec<u64>,
    canvases: Vec<u64>,
    audio: Vec<u64>,
}

impl<R: Read + Seek> NxFile<R> {
    /// Read the header and offset tables of a container
    pub fn new(mut reader: R) -> Result<NxFile<R>> {
        reader.seek(SeekFrom::Start(0))?;
        let header = NxHeader::read(&mut reader).map_err(|_| Error::InvalidContainer)?;

        let strings = Self::read_offsets(&mut reader, header.string_offset, header.string_count)?;
        let canvases = Self::read_offsets(&mut reader, header.canvas_offset, header.canvas_count)?;
        let audio = Self::read_offsets(&mut reader, header.audio_offset, header.audio_count)?;

        Ok(NxFile {
            reader,
            header,
            strings,
            canvases,
            audio,
        })
    }

    /// The header as stored in the file
    pub fn header(&self) -> &NxHeader {
        &self.header
    }

    /// Number of nodes in the container
    pub fn len(&self) -> usize {
        self.header.node_count as usize
    }

    /// Whether the node table is empty, which never happens for written containers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a node by id
    pub fn node(&mut self, id: u32) -> Result<NxNode> {
        if id >= self.header.node_count {
            return Err(NotFoundError::Node(id).into());
        }

        self.reader.seek(SeekFrom::Start(
            self.header.node_offset + NODE_SIZE * u64::from(id),
        ))?;
        let record = NodeRecord::read(&mut self.reader)?;

        Ok(NxNode {
            id,
            name: self.string(record.name)?,
            first_child: record.first_child,
            child_count: record.child_count,
            data: record.data(),
        })
    }

    /// The root node, always id 0
    pub fn root(&mut self) -> Result<NxNode> {
        self.node(0)
    }

    /// Read a string by id
    pub fn string(&mut self, id: u32) -> Result<String> {
        let offset = *self
            .strings
            .get(id as usize)
            .ok_or(NotFoundError::String(id))?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let length = self.reader.read_u16::<LittleEndian>()?;
        let mut bytes = vec![0u8; length as usize];
        self.reader.read_exact(&mut bytes)?;

        Ok(String::from_utf8(bytes)?)
    }

    /// Read all children of `node` in stored order
    pub fn children(&mut self, node: &NxNode) -> Result<Vec<NxNode>> {
        node.children().map(|id| self.node(id)).collect()
    }

    /// Find a direct child of `node` by name
    pub fn child_by_name(&mut self, node: &NxNode, name: &str) -> Result<Option<NxNode>> {
        for id in node.children() {
            let child = self.node(id)?;
            if child.name == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Walk a `/` separated path of names starting at the root
    pub fn resolve(&mut self, path: &str) -> Result<NxNode> {
        let mut current = self.root()?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .child_by_name(&current, segment)?
                .ok_or_else(|| NotFoundError::Path(path.to_owned()))?;
        }
        Ok(current)
    }

    /// Decompressed 32 bit pixels of a canvas node
    ///
    /// Fails when images were not stored in the container.
    pub fn canvas(&mut self, node: &NxNode) -> Result<Vec<u8>> {
        let NodeData::Canvas { id, width, height } = node.data else {
            return Err(Error::CustomError(format!("{} is not a canvas", node.name)));
        };

        let offset = *self
            .canvases
            .get(id as usize)
            .ok_or(NotFoundError::Canvas(id))?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let length = self.reader.read_u32::<LittleEndian>()?;
        let mut compressed = vec![0u8; length as usize];
        self.reader.read_exact(&mut compressed)?;

        decompress_canvas(&compressed, usize::from(width) * usize::from(height) * 4)
    }

    /// Raw bytes of an audio node
    ///
    /// Fails when audio was not stored in the container.
    pub fn audio(&mut self, node: &NxNode) -> Result<Vec<u8>> {
        let NodeData::Audio { id, length } = node.data else {
            return Err(Error::CustomError(format!("{} is not audio", node.name)));
        };

        let offset = *self.audio.get(id as usize).ok_or(NotFoundError::Audio(id))?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; length as usize];
        self.reader.read_exact(&mut bytes)?;

        Ok(bytes)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_offsets(reader: &mut R, offset: u64, count: u32) -> Result<Vec<u64>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        reader.seek(SeekFrom::Start(offset))?;
        (0..count)
            .map(|_| Ok(reader.read_u64::<LittleEndian>()?))
            .collect()
    }
}
