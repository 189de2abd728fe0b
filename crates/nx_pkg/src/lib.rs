//! This library flattens hierarchical property trees into **NX** containers (`PKG4`).
//!
//! # NX Container Format Documentation
//!
//! An NX file stores a tree of named nodes as a flat, memory-mappable table. Every node has a
//! fixed size record, children of a node occupy a contiguous range of ids and all strings,
//! images and sounds are kept in separate tables addressed by index.
//!
//! ## File Structure
//!
//! A container consists of a header, the node table, the string data and its offset table,
//! and optionally the canvas and audio data with their offset tables.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x34474B50 ("PKG4")                               |
//! | 0x0004         | Node Count             | 4 bytes: Number of records in the node table               |
//! | 0x0008         | Node Offset            | 8 bytes: Offset to the node table                          |
//! | 0x0010         | String Count           | 4 bytes: Number of strings                                 |
//! | 0x0014         | String Offset          | 8 bytes: Offset to the string offset table                 |
//! | 0x001C         | Canvas Count           | 4 bytes: Number of canvases, zero if not stored            |
//! | 0x0020         | Canvas Offset          | 8 bytes: Offset to the canvas offset table                 |
//! | 0x0028         | Audio Count            | 4 bytes: Number of audio blobs, zero if not stored         |
//! | 0x002C         | Audio Offset           | 8 bytes: Offset to the audio offset table                  |
//!
//! ### Node Table
//!
//! Starts 4 byte aligned, right after the header. Nodes are numbered breadth first, the
//! root is id 0 and the children of every node are numbered consecutively. Each record is 20
//! bytes:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 4 bytes: Id of the name in the string table             |
//! | 0x0004         | First Child            | 4 bytes: Id of the first child                          |
//! | 0x0008         | Child Count            | 2 bytes: Number of children                             |
//! | 0x000A         | Type                   | 2 bytes: How the payload is interpreted                 |
//! | 0x000C         | Payload                | 8 bytes: Type specific data                             |
//!
//! The type is one of:
//!   - `0`: None, payload is zero
//!   - `1`: Integer, signed 64 bit
//!   - `2`: Float, 64 bit
//!   - `3`: String, 4 byte string id
//!   - `4`: Point, two signed 32 bit coordinates
//!   - `5`: Canvas, 4 byte canvas id, 2 byte width and 2 byte height
//!   - `6`: Audio, 4 byte audio id and 4 byte length
//!
//! Links are stored as a copy of the record they point at, with only the name kept.
//!
//! ### String Table
//!
//! Each string is 2 byte aligned and stored as a u16 byte length followed by UTF-8 bytes.
//! String id 0 is always the empty string. The table of absolute u64 offsets follows, 8 byte
//! aligned; the header points at this offset table.
//!
//! ### Canvas and Audio Tables
//!
//! Canvas pixels (32 bits per pixel) are LZ4 block compressed and stored 8 byte aligned with a
//! u32 compressed length prefix. Audio blobs are stored raw and 8 byte aligned, their length
//! is in the node record. Both are followed by an 8 byte aligned u64 offset table.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.nx`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod compression;
pub mod error;
pub mod natural;
pub mod read;
pub mod state;
pub mod tree;
pub mod types;
pub mod write;

pub use compression::{BlockCompressor, Lz4Compressor};
pub use read::NxFile;
pub use tree::{PropertyTree, SourceTree};
pub use write::NxWriter;
