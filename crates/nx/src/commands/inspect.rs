use clap::Args;
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use nx_pkg::{read::NxNode, types::NodeData, NxFile};
use owo_colors::OwoColorize;
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::PathBuf,
};

#[derive(Args)]
pub struct InspectArgs {
    /// An input NX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// `/` separated path of the node to start listing from
    #[arg(short, long, default_value = "")]
    path: String,

    /// How many levels below the start node to list
    #[arg(short, long, default_value_t = 2)]
    depth: usize,
}

fn describe<R: Read + Seek>(nx: &mut NxFile<R>, node: &NxNode) -> Result<String> {
    Ok(match node.data {
        NodeData::None => String::new(),
        NodeData::Integer(value) => format!("= {}", value.cyan()),
        NodeData::Float(value) => format!("= {}", value.cyan()),
        NodeData::String(id) => format!("= {}", format!("{:?}", nx.string(id)?).green()),
        NodeData::Point(x, y) => format!("= {}", format!("({x}, {y})").yellow()),
        NodeData::Canvas { id, width, height } => {
            format!("{}", format!("canvas #{id} {width}x{height}").magenta())
        }
        NodeData::Audio { id, length } => {
            format!("{}", format!("audio #{id} {length} bytes").blue())
        }
    })
}

impl InspectArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let mut nx = NxFile::new(BufReader::new(f))?;

        let header = *nx.header();
        println!(
            "{} {}",
            self.file.display().bold(),
            [
                format!("{} nodes", header.node_count),
                format!("{} strings", header.string_count),
                format!("{} canvases", header.canvas_count),
                format!("{} audio", header.audio_count),
            ]
            .iter()
            .join(", ")
        );

        let start = nx
            .resolve(&self.path)
            .context(format!("node: {}", self.path))?;

        let mut pending = vec![(start, 0usize)];
        while let Some((node, level)) = pending.pop() {
            let indent = "  ".repeat(level);
            let name = if node.id == 0 && node.name.is_empty() {
                "/".to_string()
            } else {
                node.name.clone()
            };
            println!("{indent}{} {}", name.bold(), describe(&mut nx, &node)?);

            if node.child_count == 0 {
                continue;
            }
            if level == self.depth {
                println!("{indent}  {}", format!("… {} children", node.child_count).dimmed());
                continue;
            }

            let children = nx.children(&node)?;
            pending.extend(children.into_iter().rev().map(|child| (child, level + 1)));
        }

        Ok(())
    }
}
