use std::fmt::Debug;
use std::hash::Hash;
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::state::LayoutState;
use crate::types::NODE_SIZE;

/// Bytes of a record following its name: first child, child count, type and payload
const LINKED_SPAN: usize = 16;

/// Overwrite every link record with the structure and payload of its target
///
/// Only the name of the link survives, so the link reads exactly like the node it points
/// at. Unresolved links keep their empty record. Returns the number of patched links.
#[instrument(skip_all, err, fields(links = state.link_patches().len()))]
pub(crate) fn resolve_links<W, H>(inner: &mut W, state: &LayoutState<H>, node_offset: u64) -> Result<usize>
where
    W: Read + Write + Seek,
    H: Copy + Eq + Hash + Debug,
{
    let mut patched = 0;
    let mut linked = [0u8; LINKED_SPAN];

    for patch in state.link_patches() {
        let Some(target) = patch.target else {
            debug!(position = patch.position, "leaving unresolved link empty");
            continue;
        };

        let target_id = state.lookup_node_id(target)?;
        inner.seek(SeekFrom::Start(node_offset + NODE_SIZE * u64::from(target_id) + 4))?;
        inner.read_exact(&mut linked)?;

        inner.seek(SeekFrom::Start(patch.position + 4))?;
        inner.write_all(&linked)?;
        patched += 1;
    }

    Ok(patched)
}
