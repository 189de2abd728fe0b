use binrw::BinWrite;
use std::io::{Seek, Write};
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};
use crate::natural::natural_cmp;
use crate::state::LayoutState;
use crate::tree::{NodeValue, SourceTree};
use crate::types::{NodeData, NodeRecord};
use crate::write::NxWriterOptions;

/// A node of the current level together with everything read from the tree for it
struct Pending<H> {
    node: H,
    value: NodeValue,
    children: Vec<H>,
}

/// Write the node table one breadth-first level at a time
///
/// Every record needs the id of its first child, which depends on how many children
/// the nodes before it on the same level have. Reading a whole level before writing it
/// makes those counts available.
#[instrument(skip_all, err)]
pub(crate) fn write_node_table<T: SourceTree, O: Write + Seek>(
    tree: &T,
    state: &mut LayoutState<T::Handle>,
    out: &mut O,
    options: &NxWriterOptions,
) -> Result<()> {
    let mut level = vec![tree.root()];
    let mut depth = 0usize;

    while !level.is_empty() {
        debug!(depth, nodes = level.len(), "writing level");
        level = write_level(tree, level, state, out, options)?;
        depth += 1;
    }

    Ok(())
}

fn read_level<T: SourceTree>(
    tree: &T,
    level: Vec<T::Handle>,
    options: &NxWriterOptions,
) -> Result<Vec<Pending<T::Handle>>> {
    level
        .into_iter()
        .map(|node| {
            let value = tree.value(node)?;
            // Children of links still get ids, other links may point into them
            let mut children = tree.children(node);
            if options.sort_nodes {
                children.sort_by(|a, b| natural_cmp(tree.name(*a), tree.name(*b)));
            }
            Ok(Pending {
                node,
                value,
                children,
            })
        })
        .collect()
}

fn write_level<T: SourceTree, O: Write + Seek>(
    tree: &T,
    level: Vec<T::Handle>,
    state: &mut LayoutState<T::Handle>,
    out: &mut O,
    options: &NxWriterOptions,
) -> Result<Vec<T::Handle>> {
    let pending = read_level(tree, level, options)?;

    let mut next_child = u64::from(state.next_node_id()?) + pending.len() as u64;
    for entry in &pending {
        let first_child = u32::try_from(next_child).map_err(|_| Error::TableOverflow("node"))?;
        write_node(tree, entry, first_child, state, out, options)?;
        next_child += entry.children.len() as u64;
    }

    Ok(pending
        .into_iter()
        .flat_map(|entry| entry.children)
        .collect())
}

fn write_node<T: SourceTree, O: Write + Seek>(
    tree: &T,
    entry: &Pending<T::Handle>,
    first_child: u32,
    state: &mut LayoutState<T::Handle>,
    out: &mut O,
    options: &NxWriterOptions,
) -> Result<()> {
    let node = entry.node;
    let id = state.assign_node_id(node)?;
    let name = state.intern_string(tree.name(node))?;
    trace!(id, name = tree.name(node), value = ?entry.value, "writing node");

    let data = match &entry.value {
        NodeValue::Link => {
            let position = out.stream_position()?;
            state.enqueue_link_patch(position, tree.link_target(node));
            NodeRecord {
                name,
                ..Default::default()
            }
            .write(out)?;
            return Ok(());
        }
        NodeValue::Container => NodeData::None,
        NodeValue::Integer(value) => NodeData::Integer(*value),
        NodeValue::Float(value) => NodeData::Float(*value),
        NodeValue::String(text) => NodeData::String(state.intern_string(text)?),
        NodeValue::Point(x, y) => NodeData::Point(*x, *y),
        NodeValue::Canvas { width, height } => {
            let id = state.append_canvas(node, *width, *height)?;
            if options.dump_images {
                NodeData::Canvas {
                    id,
                    width: *width,
                    height: *height,
                }
            } else {
                NodeData::Canvas {
                    id,
                    width: 0,
                    height: 0,
                }
            }
        }
        NodeValue::Audio => {
            let id = state.append_audio(node)?;
            let length = if options.dump_audio {
                let length = tree.audio_len(node)?;
                u32::try_from(length).map_err(|_| Error::BlobTooLarge(length))?
            } else {
                0
            };
            NodeData::Audio { id, length }
        }
    };

    let child_count =
        u16::try_from(entry.children.len()).map_err(|_| Error::TooManyChildren {
            name: tree.name(node).to_string(),
            count: entry.children.len(),
        })?;

    NodeRecord::new(name, first_child, child_count, data).write(out)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use binrw::BinRead;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    use crate::error::{Error, Result};
    use crate::state::LayoutState;
    use crate::tree::{BlobSource, NodeHandle, PropertyTree, PropertyValue, SourceTree};
    use crate::types::{NodeData, NodeRecord};
    use crate::write::NxWriterOptions;

    use super::write_node_table;

    fn write_records(
        tree: &PropertyTree,
        options: NxWriterOptions,
    ) -> Result<(Vec<NodeRecord>, LayoutState<NodeHandle>)> {
        let mut state = LayoutState::new();
        let mut out = Cursor::new(Vec::new());
        write_node_table(tree, &mut state, &mut out, &options)?;

        let count = state.node_count();
        out.set_position(0);
        let records = (0..count)
            .map(|_| NodeRecord::read(&mut out).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        Ok((records, state))
    }

    fn names(state: &LayoutState<NodeHandle>, records: &[NodeRecord]) -> Vec<String> {
        let strings: Vec<_> = state.strings().collect();
        records
            .iter()
            .map(|r| strings[r.name as usize].to_string())
            .collect()
    }

    #[test]
    fn levels_are_written_breadth_first() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        let a = tree.add(root, "a", PropertyValue::Container);
        let b = tree.add(root, "b", PropertyValue::Container);
        tree.add(a, "a0", PropertyValue::Integer(0));
        tree.add(a, "a1", PropertyValue::Integer(1));
        let b0 = tree.add(b, "b0", PropertyValue::Container);
        tree.add(b0, "b00", PropertyValue::Float(1.5));

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;

        assert_eq!(
            names(&state, &records),
            vec!["", "a", "b", "a0", "a1", "b0", "b00"]
        );

        assert_eq!((records[0].first_child, records[0].child_count), (1, 2));
        assert_eq!((records[1].first_child, records[1].child_count), (3, 2));
        assert_eq!((records[2].first_child, records[2].child_count), (5, 1));
        assert_eq!((records[5].first_child, records[5].child_count), (6, 1));
        assert_eq!(records[6].data(), NodeData::Float(1.5));

        Ok(())
    }

    #[test]
    fn siblings_sort_naturally_when_requested() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        tree.add(root, "10", PropertyValue::Container);
        tree.add(root, "2", PropertyValue::Container);
        tree.add(root, "info", PropertyValue::Container);

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;
        assert_eq!(names(&state, &records), vec!["", "10", "2", "info"]);

        let (records, state) = records_sorted(&tree)?;
        assert_eq!(names(&state, &records), vec!["", "2", "10", "info"]);

        Ok(())
    }

    fn records_sorted(tree: &PropertyTree) -> Result<(Vec<NodeRecord>, LayoutState<NodeHandle>)> {
        write_records(tree, NxWriterOptions::builder().sort_nodes(true).build())
    }

    #[test]
    fn sorting_stays_within_each_parent() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        let b = tree.add(root, "b", PropertyValue::Container);
        let a = tree.add(root, "a", PropertyValue::Container);
        tree.add(b, "1", PropertyValue::Container);
        tree.add(a, "0", PropertyValue::Container);

        let (records, state) = records_sorted(&tree)?;

        assert_eq!(names(&state, &records), vec!["", "a", "b", "0", "1"]);
        assert_eq!(records[1].first_child, 3);
        assert_eq!(records[2].first_child, 4);

        Ok(())
    }

    #[test]
    fn childless_container_has_empty_payload() -> Result<()> {
        let mut tree = PropertyTree::new("");
        tree.add(tree.root(), "empty", PropertyValue::Container);

        let (records, _) = write_records(&tree, NxWriterOptions::default())?;

        assert_eq!(records[1].child_count, 0);
        assert_eq!(records[1].payload, [0u8; 8]);

        Ok(())
    }

    #[test]
    fn canvases_keep_index_without_images() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        for name in ["0", "1"] {
            tree.add(
                root,
                name,
                PropertyValue::Canvas {
                    width: 2,
                    height: 3,
                    pixels: BlobSource::Inline(vec![0; 24]),
                },
            );
        }

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;
        assert_eq!(
            records[2].data(),
            NodeData::Canvas {
                id: 1,
                width: 0,
                height: 0
            }
        );
        assert_eq!(state.canvases().len(), 2);

        let (records, _) = write_records(
            &tree,
            NxWriterOptions::builder().dump_images(true).build(),
        )?;
        assert_eq!(
            records[2].data(),
            NodeData::Canvas {
                id: 1,
                width: 2,
                height: 3
            }
        );

        Ok(())
    }

    #[test]
    fn links_reserve_an_empty_record() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        let target = tree.add(root, "target", PropertyValue::Integer(5));
        tree.add(root, "link", PropertyValue::Link("target".into()));
        tree.add(root, "dangling", PropertyValue::Link("nowhere".into()));

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;

        assert_eq!(records[2].payload, [0u8; 8]);
        assert_eq!(records[2].child_count, 0);
        assert_eq!(records[2].first_child, 0);

        let patches = state.link_patches();
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].position, 40);
        assert_eq!(patches[0].target, Some(target));
        assert_eq!(patches[1].position, 60);
        assert_eq!(patches[1].target, None);

        Ok(())
    }

    #[test]
    fn link_children_are_numbered() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        let alias = tree.add(root, "alias", PropertyValue::Link("real".into()));
        tree.add(root, "real", PropertyValue::Integer(1));
        let child = tree.add(alias, "child", PropertyValue::Integer(2));
        tree.add(root, "ptr", PropertyValue::Link("alias/child".into()));

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;

        assert_eq!(names(&state, &records), vec!["", "alias", "real", "ptr", "child"]);
        assert_eq!(records[1].payload, [0u8; 8]);
        assert_eq!(records[2].first_child, 5);
        assert_eq!(state.lookup_node_id(child)?, 4);
        assert_eq!(state.link_patches()[1].target, Some(child));

        Ok(())
    }

    #[test]
    fn string_values_are_interned_after_names() -> Result<()> {
        let mut tree = PropertyTree::new("");
        let root = tree.root();
        tree.add(root, "name", PropertyValue::String("name".into()));
        tree.add(root, "desc", PropertyValue::String("hello".into()));

        let (records, state) = write_records(&tree, NxWriterOptions::default())?;

        assert_eq!(
            state.strings().collect::<Vec<_>>(),
            vec!["", "name", "desc", "hello"]
        );
        assert_eq!(records[1].data(), NodeData::String(1));
        assert_eq!(records[2].data(), NodeData::String(3));

        Ok(())
    }

    #[test]
    fn unsupported_nodes_abort() {
        let mut tree = PropertyTree::new("");
        tree.add(tree.root(), "shape", PropertyValue::Unsupported);

        assert!(matches!(
            write_records(&tree, NxWriterOptions::default()),
            Err(Error::UnsupportedNode(_))
        ));
    }
}
