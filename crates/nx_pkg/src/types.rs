//! Base types for structure of NX file.

use binrw::{BinRead, BinWrite};

/// Size in bytes of the magic number and header at the start of every container
pub const HEADER_SIZE: u64 = 52;

/// Size in bytes of a single entry in the node table
pub const NODE_SIZE: u64 = 20;

/// NX file header
///
/// Always starts with "PKG4" followed by count/offset pairs for each of the four tables.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"PKG4", little)]
pub struct NxHeader {
    /// The number of records in the node table
    pub node_count: u32,

    /// The offset from the beginning of the file where the node table starts
    pub node_offset: u64,

    /// The number of entries in the string table
    pub string_count: u32,

    /// The offset from the beginning of the file of the string offset table
    pub string_offset: u64,

    /// The number of compressed canvases, zero when images were not dumped
    pub canvas_count: u32,

    /// The offset from the beginning of the file of the canvas offset table
    pub canvas_offset: u64,

    /// The number of audio blobs, zero when audio was not dumped
    pub audio_count: u32,

    /// The offset from the beginning of the file of the audio offset table
    pub audio_offset: u64,
}

/// Identifies how the trailing 8 bytes of a [`NodeRecord`] are interpreted
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[brw(repr=u16)]
pub enum NodeType {
    /// No data, children only
    #[default]
    None = 0,

    /// Signed 64 bit integer
    Integer = 1,

    /// 64 bit float
    Float = 2,

    /// Index into the string table
    String = 3,

    /// Two signed 32 bit coordinates
    Point = 4,

    /// Index into the canvas table with the image dimensions
    Canvas = 5,

    /// Index into the audio table with the byte length
    Audio = 6,
}

/// Decoded form of the 8 byte payload of a [`NodeRecord`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NodeData {
    /// Containers carry no payload
    None,
    /// An integer value
    Integer(i64),
    /// A floating point value
    Float(f64),
    /// Id of a string in the string table
    String(u32),
    /// A 2D point
    Point(i32, i32),
    /// A canvas, width and height are zero if images were not dumped
    Canvas {
        /// Index into the canvas table
        id: u32,
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
    },
    /// An audio blob, length is zero if audio was not dumped
    Audio {
        /// Index into the audio table
        id: u32,
        /// Length of the blob in bytes
        length: u32,
    },
}

impl NodeData {
    /// The type tag stored alongside this payload
    pub fn kind(&self) -> NodeType {
        match self {
            NodeData::None => NodeType::None,
            NodeData::Integer(_) => NodeType::Integer,
            NodeData::Float(_) => NodeType::Float,
            NodeData::String(_) => NodeType::String,
            NodeData::Point(..) => NodeType::Point,
            NodeData::Canvas { .. } => NodeType::Canvas,
            NodeData::Audio { .. } => NodeType::Audio,
        }
    }

    /// Encodes the payload into its fixed 8 byte representation
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        match *self {
            NodeData::None => {}
            NodeData::Integer(value) => bytes = value.to_le_bytes(),
            NodeData::Float(value) => bytes = value.to_le_bytes(),
            NodeData::String(id) => bytes[..4].copy_from_slice(&id.to_le_bytes()),
            NodeData::Point(x, y) => {
                bytes[..4].copy_from_slice(&x.to_le_bytes());
                bytes[4..].copy_from_slice(&y.to_le_bytes());
            }
            NodeData::Canvas { id, width, height } => {
                bytes[..4].copy_from_slice(&id.to_le_bytes());
                bytes[4..6].copy_from_slice(&width.to_le_bytes());
                bytes[6..].copy_from_slice(&height.to_le_bytes());
            }
            NodeData::Audio { id, length } => {
                bytes[..4].copy_from_slice(&id.to_le_bytes());
                bytes[4..].copy_from_slice(&length.to_le_bytes());
            }
        }
        bytes
    }

    /// Decodes a payload previously produced by [`NodeData::to_bytes`]
    pub fn from_bytes(kind: NodeType, b: [u8; 8]) -> Self {
        let low = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        let high = u32::from_le_bytes([b[4], b[5], b[6], b[7]]);
        match kind {
            NodeType::None => NodeData::None,
            NodeType::Integer => NodeData::Integer(i64::from_le_bytes(b)),
            NodeType::Float => NodeData::Float(f64::from_le_bytes(b)),
            NodeType::String => NodeData::String(low),
            NodeType::Point => NodeData::Point(low as i32, high as i32),
            NodeType::Canvas => NodeData::Canvas {
                id: low,
                width: u16::from_le_bytes([b[4], b[5]]),
                height: u16::from_le_bytes([b[6], b[7]]),
            },
            NodeType::Audio => NodeData::Audio {
                id: low,
                length: high,
            },
        }
    }
}

/// NX node record
///
/// Defines an entry in the node table. Children of a node are stored contiguously starting
/// at `first_child`.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct NodeRecord {
    /// Id of the node's name in the string table
    pub name: u32,

    /// Id of the first child, meaningless when there are no children
    pub first_child: u32,

    /// The number of children
    pub child_count: u16,

    /// How the payload should be interpreted
    pub kind: NodeType,

    /// Type specific payload
    pub payload: [u8; 8],
}

impl NodeRecord {
    /// Build a record from its decoded parts
    pub fn new(name: u32, first_child: u32, child_count: u16, data: NodeData) -> Self {
        Self {
            name,
            first_child,
            child_count,
            kind: data.kind(),
            payload: data.to_bytes(),
        }
    }

    /// Decode the payload of this record
    pub fn data(&self) -> NodeData {
        NodeData::from_bytes(self.kind, self.payload)
    }
}
