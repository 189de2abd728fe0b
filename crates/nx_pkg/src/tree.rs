//! Source trees that can be flattened into a container.
//!
//! The writer only talks to a tree through [`SourceTree`]. [`PropertyTree`] is an
//! in-memory implementation that can be built by hand or loaded from JSON.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::error::{Error, Result};

/// The payload of a single node as seen by the writer
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// No payload, children only
    Container,
    /// A signed integer, narrower source integers are widened
    Integer(i64),
    /// A floating point value, narrower source floats are widened
    Float(f64),
    /// A string that is interned into the string table
    String(String),
    /// A 2D point
    Point(i32, i32),
    /// An image whose pixels are fetched with [`SourceTree::canvas_pixels`]
    Canvas {
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
    },
    /// A sound whose bytes are fetched with [`SourceTree::audio_bytes`]
    Audio,
    /// A reference to another node, see [`SourceTree::link_target`]
    Link,
}

/// A read-only tree of named nodes
///
/// Large payloads are loaded lazily. The writer calls [`SourceTree::release`] once it
/// is done with a payload so implementations holding caches can drop them.
pub trait SourceTree {
    /// A stable, cheap reference to a node in this tree
    type Handle: Copy + Eq + Hash + Debug;

    /// The node traversal starts from
    fn root(&self) -> Self::Handle;

    /// Name of the node
    fn name(&self, node: Self::Handle) -> &str;

    /// Children of the node in their native order
    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    /// Payload of the node
    ///
    /// Implementations return [`Error::UnsupportedNode`] for node kinds that have no
    /// [`NodeValue`] counterpart.
    fn value(&self, node: Self::Handle) -> Result<NodeValue>;

    /// Decoded 32 bit pixels of a canvas node
    fn canvas_pixels(&self, node: Self::Handle) -> Result<Vec<u8>>;

    /// Raw bytes of an audio node
    fn audio_bytes(&self, node: Self::Handle) -> Result<Vec<u8>>;

    /// Length in bytes of an audio node
    fn audio_len(&self, node: Self::Handle) -> Result<usize> {
        let len = self.audio_bytes(node)?.len();
        self.release(node);
        Ok(len)
    }

    /// The final non-link node a link points at, following chains of links
    ///
    /// Returns `None` for dangling links and for nodes that are not links.
    fn link_target(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Signals that a payload returned for `node` is no longer needed
    fn release(&self, _node: Self::Handle) {}
}

/// Where the bytes of a canvas or audio node come from
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(untagged))]
pub enum BlobSource {
    /// Bytes held in memory
    Inline(Vec<u8>),
    /// A file read on demand, relative paths are resolved against the tree's base directory
    File(PathBuf),
}

/// Payload of a [`PropertyNode`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize),
    serde(tag = "type", content = "value", rename_all = "snake_case")
)]
pub enum PropertyValue {
    /// No payload
    #[default]
    Container,
    /// An integer
    Integer(i64),
    /// A float
    Float(f64),
    /// A string
    String(String),
    /// A 2D point
    Point {
        /// Horizontal coordinate
        x: i32,
        /// Vertical coordinate
        y: i32,
    },
    /// 32 bit pixels of `width * height` size
    Canvas {
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
        /// Pixel data
        pixels: BlobSource,
    },
    /// An audio blob
    Audio {
        /// Audio data
        data: BlobSource,
    },
    /// A `/` separated path relative to the link's parent, `..` moves up one level
    Link(String),
    /// Any node type the tree could not interpret
    #[cfg_attr(feature = "serde", serde(other))]
    Unsupported,
}

/// Handle to a node of a [`PropertyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

/// A node stored in a [`PropertyTree`]
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    /// Name of the node, unique among its siblings for links to be resolvable
    pub name: String,
    /// Payload of the node
    pub value: PropertyValue,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

/// An arena backed tree of [`PropertyNode`]s
///
/// ```
/// use nx_pkg::tree::{PropertyTree, PropertyValue, SourceTree};
///
/// let mut tree = PropertyTree::new("");
/// let root = tree.root();
/// let info = tree.add(root, "info", PropertyValue::Container);
/// tree.add(info, "version", PropertyValue::Integer(83));
/// tree.add(root, "alias", PropertyValue::Link("info/version".into()));
///
/// assert_eq!(tree.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PropertyTree {
    nodes: Vec<PropertyNode>,
    base_dir: PathBuf,
}

impl PropertyTree {
    /// Create a tree holding only a container root named `root_name`
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![PropertyNode {
                name: root_name.into(),
                value: PropertyValue::Container,
                parent: None,
                children: Vec::new(),
            }],
            base_dir: PathBuf::new(),
        }
    }

    /// Set the directory relative [`BlobSource::File`] paths are resolved against
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Append a child to `parent` and return its handle
    pub fn add(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
        value: PropertyValue,
    ) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(PropertyNode {
            name: name.into(),
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(handle);
        handle
    }

    /// Access a node by handle
    pub fn get(&self, node: NodeHandle) -> &PropertyNode {
        &self.nodes[node.0]
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// `/` separated names from the root down to `node`
    pub fn path(&self, node: NodeHandle) -> String {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(handle) = current {
            let entry = self.get(handle);
            if entry.parent.is_some() {
                names.push(entry.name.as_str());
            }
            current = entry.parent;
        }
        names.reverse();
        names.join("/")
    }

    fn child_by_name(&self, node: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.get(node)
            .children
            .iter()
            .copied()
            .find(|child| self.get(*child).name == name)
    }

    /// Walk `path` starting at `from`
    pub fn resolve_path(&self, from: NodeHandle, path: &str) -> Option<NodeHandle> {
        path.split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .try_fold(from, |current, segment| match segment {
                ".." => self.get(current).parent,
                name => self.child_by_name(current, name),
            })
    }

    fn resolve_link(&self, node: NodeHandle) -> Option<NodeHandle> {
        let mut visited = HashSet::new();
        let mut current = node;
        while let PropertyValue::Link(path) = &self.get(current).value {
            if !visited.insert(current) {
                return None;
            }
            let base = self.get(current).parent?;
            current = self.resolve_path(base, path)?;
        }
        Some(current)
    }

    fn load(&self, source: &BlobSource) -> Result<Vec<u8>> {
        match source {
            BlobSource::Inline(data) => Ok(data.clone()),
            BlobSource::File(path) => Ok(std::fs::read(self.base_dir.join(path))?),
        }
    }

    fn wrong_kind(&self, node: NodeHandle, expected: &str) -> Error {
        Error::CustomError(format!("{} is not {expected}", self.path(node)))
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct NodeDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: PropertyValue,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

#[cfg(feature = "serde")]
impl PropertyTree {
    /// Load a tree from nested `{ "name", "value", "children" }` JSON objects
    ///
    /// ```
    /// use nx_pkg::tree::{PropertyTree, PropertyValue, SourceTree};
    ///
    /// let json = r#"{
    ///     "children": [
    ///         { "name": "speed", "value": { "type": "integer", "value": 120 } },
    ///         { "name": "origin", "value": { "type": "point", "value": { "x": 3, "y": -4 } } }
    ///     ]
    /// }"#;
    ///
    /// let tree = PropertyTree::from_json_reader(json.as_bytes())?;
    /// let speed = tree.resolve_path(tree.root(), "speed").unwrap();
    /// assert_eq!(tree.get(speed).value, PropertyValue::Integer(120));
    /// # Ok::<(), nx_pkg::error::Error>(())
    /// ```
    pub fn from_json_reader(reader: impl std::io::Read) -> Result<Self> {
        let document: NodeDocument = serde_json::from_reader(reader)?;

        let mut tree = PropertyTree::new(document.name);
        tree.nodes[0].value = document.value;

        let mut pending = vec![(tree.root(), document.children)];
        while let Some((parent, children)) = pending.pop() {
            for child in children {
                let handle = tree.add(parent, child.name, child.value);
                pending.push((handle, child.children));
            }
        }

        Ok(tree)
    }

    /// Load a tree from a JSON file, blob paths are resolved next to the file
    pub fn from_json_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::io::BufReader::new(std::fs::File::open(path)?);
        let base_dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        Ok(Self::from_json_reader(file)?.with_base_dir(base_dir))
    }
}

impl SourceTree for PropertyTree {
    type Handle = NodeHandle;

    fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    fn name(&self, node: NodeHandle) -> &str {
        &self.get(node).name
    }

    fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.get(node).children.clone()
    }

    fn value(&self, node: NodeHandle) -> Result<NodeValue> {
        Ok(match &self.get(node).value {
            PropertyValue::Container => NodeValue::Container,
            PropertyValue::Integer(value) => NodeValue::Integer(*value),
            PropertyValue::Float(value) => NodeValue::Float(*value),
            PropertyValue::String(value) => NodeValue::String(value.clone()),
            PropertyValue::Point { x, y } => NodeValue::Point(*x, *y),
            PropertyValue::Canvas { width, height, .. } => NodeValue::Canvas {
                width: *width,
                height: *height,
            },
            PropertyValue::Audio { .. } => NodeValue::Audio,
            PropertyValue::Link(_) => NodeValue::Link,
            PropertyValue::Unsupported => return Err(Error::UnsupportedNode(self.path(node))),
        })
    }

    fn canvas_pixels(&self, node: NodeHandle) -> Result<Vec<u8>> {
        match &self.get(node).value {
            PropertyValue::Canvas { pixels, .. } => self.load(pixels),
            _ => Err(self.wrong_kind(node, "a canvas")),
        }
    }

    fn audio_bytes(&self, node: NodeHandle) -> Result<Vec<u8>> {
        match &self.get(node).value {
            PropertyValue::Audio { data } => self.load(data),
            _ => Err(self.wrong_kind(node, "audio")),
        }
    }

    fn audio_len(&self, node: NodeHandle) -> Result<usize> {
        match &self.get(node).value {
            PropertyValue::Audio {
                data: BlobSource::Inline(data),
            } => Ok(data.len()),
            PropertyValue::Audio {
                data: BlobSource::File(path),
            } => Ok(std::fs::metadata(self.base_dir.join(path))?.len() as usize),
            _ => Err(self.wrong_kind(node, "audio")),
        }
    }

    fn link_target(&self, node: NodeHandle) -> Option<NodeHandle> {
        match self.get(node).value {
            PropertyValue::Link(_) => self.resolve_link(node),
            _ => None,
        }
    }
}
