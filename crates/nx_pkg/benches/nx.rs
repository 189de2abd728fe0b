use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn synthetic_tree(width: usize) -> nx_pkg::PropertyTree {
    use nx_pkg::tree::{BlobSource, PropertyValue, SourceTree};

    let mut tree = nx_pkg::PropertyTree::new("");
    let root = tree.root();
    for i in 0..width {
        let mob = tree.add(root, format!("{i:07}.img"), PropertyValue::Container);
        let info = tree.add(mob, "info", PropertyValue::Container);
        tree.add(info, "level", PropertyValue::Integer(i as i64));
        tree.add(info, "speed", PropertyValue::Float(i as f64 / 10.0));
        tree.add(info, "name", PropertyValue::String(format!("mob {i}")));
        let stand = tree.add(mob, "stand", PropertyValue::Container);
        for frame in 0..4 {
            let canvas = tree.add(
                stand,
                frame.to_string(),
                PropertyValue::Canvas {
                    width: 16,
                    height: 16,
                    pixels: BlobSource::Inline(vec![(i % 256) as u8; 16 * 16 * 4]),
                },
            );
            tree.add(canvas, "origin", PropertyValue::Point { x: 8, y: 16 });
        }
        tree.add(mob, "move", PropertyValue::Link("stand".into()));
    }
    tree
}

pub mod write {
    use divan::Bencher;
    use nx_pkg::write::{NxWriter, NxWriterOptions};
    use std::io::Cursor;

    #[divan::bench(args = [10, 100, 1000])]
    fn structure_only(bencher: Bencher, width: usize) {
        let tree = super::synthetic_tree(width);
        bencher.bench_local(|| {
            divan::black_box(
                NxWriter::new(Cursor::new(Vec::new()), NxWriterOptions::default())
                    .write_tree(&tree)
                    .unwrap(),
            );
        });
    }

    #[divan::bench(args = [10, 100])]
    fn with_images(bencher: Bencher, width: usize) {
        let tree = super::synthetic_tree(width);
        let options = NxWriterOptions::builder()
            .dump_images(true)
            .sort_nodes(true)
            .build();
        bencher.bench_local(|| {
            divan::black_box(
                NxWriter::new(Cursor::new(Vec::new()), options)
                    .write_tree(&tree)
                    .unwrap(),
            );
        });
    }
}

pub mod natural {
    use divan::Bencher;
    use nx_pkg::natural::natural_cmp;

    #[divan::bench]
    fn sort_names(bencher: Bencher) {
        bencher
            .with_inputs(|| {
                (0..1000)
                    .rev()
                    .map(|i| if i % 3 == 0 { format!("frame{i}") } else { i.to_string() })
                    .collect::<Vec<_>>()
            })
            .bench_local_values(|mut names| {
                names.sort_by(|a, b| natural_cmp(a, b));
                names
            });
    }
}
