//! Bookkeeping shared by the section writers while a container is being laid out.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexSet;

use crate::error::{Error, Result};

/// A link node whose record has to be overwritten once the node table is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPatch<H> {
    /// Absolute position of the link's own node record
    pub position: u64,

    /// The final non-link node the link points at, if it could be resolved
    pub target: Option<H>,
}

/// A canvas waiting for the blob pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasEntry<H> {
    /// The canvas node
    pub node: H,

    /// Width in pixels as reported by the tree
    pub width: u16,

    /// Height in pixels as reported by the tree
    pub height: u16,
}

impl<H> CanvasEntry<H> {
    /// Number of bytes the decoded 32 bit pixels have to occupy
    pub fn pixel_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) * 4
    }
}

/// Identity tables for strings, blobs and nodes
///
/// `H` is the handle type of the source tree, see [`crate::tree::SourceTree`].
#[derive(Debug)]
pub struct LayoutState<H> {
    strings: IndexSet<String>,
    canvases: Vec<CanvasEntry<H>>,
    audio: Vec<H>,
    nodes: HashMap<H, u32>,
    links: Vec<LinkPatch<H>>,
}

impl<H> Default for LayoutState<H> {
    fn default() -> Self {
        let mut strings = IndexSet::new();
        strings.insert(String::new());

        Self {
            strings,
            canvases: Vec::new(),
            audio: Vec::new(),
            nodes: HashMap::new(),
            links: Vec::new(),
        }
    }
}

fn next_index(len: usize, table: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TableOverflow(table))
}

impl<H: Copy + Eq + Hash + Debug> LayoutState<H> {
    /// Create an empty state with the empty string already interned as id 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `text`, assigning the next free id on first use
    pub fn intern_string(&mut self, text: &str) -> Result<u32> {
        if let Some(id) = self.strings.get_index_of(text) {
            return Ok(id as u32);
        }

        let id = next_index(self.strings.len(), "string")?;
        self.strings.insert(text.to_owned());
        Ok(id)
    }

    /// Queue a canvas for the blob pass and return its index
    pub fn append_canvas(&mut self, node: H, width: u16, height: u16) -> Result<u32> {
        let id = next_index(self.canvases.len(), "canvas")?;
        self.canvases.push(CanvasEntry {
            node,
            width,
            height,
        });
        Ok(id)
    }

    /// Queue an audio blob for the blob pass and return its index
    pub fn append_audio(&mut self, node: H) -> Result<u32> {
        let id = next_index(self.audio.len(), "audio")?;
        self.audio.push(node);
        Ok(id)
    }

    /// Give `node` the next node id. Each node may only be assigned once.
    pub fn assign_node_id(&mut self, node: H) -> Result<u32> {
        let id = self.next_node_id()?;
        if self.nodes.contains_key(&node) {
            return Err(Error::DuplicateNode(format!("{node:?}")));
        }
        self.nodes.insert(node, id);
        Ok(id)
    }

    /// Id previously given to `node` by [`LayoutState::assign_node_id`]
    pub fn lookup_node_id(&self, node: H) -> Result<u32> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or_else(|| Error::UnassignedNode(format!("{node:?}")))
    }

    /// The id the next assigned node will receive
    pub fn next_node_id(&self) -> Result<u32> {
        next_index(self.nodes.len(), "node")
    }

    /// Remember a link record to be filled in by the link pass
    pub fn enqueue_link_patch(&mut self, position: u64, target: Option<H>) {
        self.links.push(LinkPatch { position, target });
    }

    /// Interned strings in id order
    pub fn strings(&self) -> impl ExactSizeIterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Number of interned strings
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Canvas handles in index order
    pub fn canvases(&self) -> &[CanvasEntry<H>] {
        &self.canvases
    }

    /// Audio handles in index order
    pub fn audio(&self) -> &[H] {
        &self.audio
    }

    /// Number of nodes assigned so far
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pending link patches in the order they were queued
    pub fn link_patches(&self) -> &[LinkPatch<H>] {
        &self.links
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::state::{LayoutState, LinkPatch};

    #[test]
    fn empty_string_is_preseeded() -> Result<()> {
        let mut state = LayoutState::<u32>::new();

        assert_eq!(state.string_count(), 1);
        assert_eq!(state.intern_string("")?, 0);
        assert_eq!(state.string_count(), 1);

        Ok(())
    }

    #[test]
    fn strings_are_deduplicated() -> Result<()> {
        let mut state = LayoutState::<u32>::new();

        assert_eq!(state.intern_string("Map")?, 1);
        assert_eq!(state.intern_string("Obj")?, 2);
        assert_eq!(state.intern_string("Map")?, 1);
        assert_eq!(state.strings().collect::<Vec<_>>(), vec!["", "Map", "Obj"]);

        Ok(())
    }

    #[test]
    fn node_ids_are_sequential() -> Result<()> {
        let mut state = LayoutState::<u32>::new();

        assert_eq!(state.assign_node_id(40)?, 0);
        assert_eq!(state.assign_node_id(10)?, 1);
        assert_eq!(state.assign_node_id(20)?, 2);
        assert_eq!(state.next_node_id()?, 3);
        assert_eq!(state.lookup_node_id(10)?, 1);

        Ok(())
    }

    #[test]
    fn assigning_twice_fails() -> Result<()> {
        let mut state = LayoutState::<u32>::new();
        state.assign_node_id(1)?;

        assert!(matches!(
            state.assign_node_id(1),
            Err(Error::DuplicateNode(_))
        ));
        assert_eq!(state.node_count(), 1);

        Ok(())
    }

    #[test]
    fn lookup_of_unassigned_node_fails() {
        let state = LayoutState::<u32>::new();

        assert!(matches!(
            state.lookup_node_id(3),
            Err(Error::UnassignedNode(_))
        ));
    }

    #[test]
    fn blob_tables_are_independent() -> Result<()> {
        let mut state = LayoutState::<u32>::new();

        assert_eq!(state.append_canvas(7, 2, 3)?, 0);
        assert_eq!(state.append_audio(8)?, 0);
        assert_eq!(state.append_canvas(9, 1, 1)?, 1);
        assert_eq!(
            state.canvases().iter().map(|c| c.node).collect::<Vec<_>>(),
            vec![7, 9]
        );
        assert_eq!(state.canvases()[0].pixel_len(), 24);
        assert_eq!(state.audio(), &[8]);

        Ok(())
    }

    #[test]
    fn link_patches_keep_order() {
        let mut state = LayoutState::<u32>::new();
        state.enqueue_link_patch(72, Some(4));
        state.enqueue_link_patch(92, None);

        assert_eq!(
            state.link_patches(),
            &[
                LinkPatch {
                    position: 72,
                    target: Some(4)
                },
                LinkPatch {
                    position: 92,
                    target: None
                },
            ]
        );
    }
}
