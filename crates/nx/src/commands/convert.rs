use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use nx_pkg::{
    write::{NxWriter, NxWriterOptions},
    PropertyTree,
};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

#[derive(Args)]
pub struct ConvertArgs {
    /// An input property tree in JSON form
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// The NX file to create, defaults to the input's name with an `.nx` extension
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Store canvas pixels
    #[arg(long, default_value_t = false)]
    dump_image: bool,

    /// Store audio data
    #[arg(long, default_value_t = false)]
    dump_sound: bool,

    /// Order children naturally instead of keeping the input order
    #[arg(long, default_value_t = false)]
    sort_nodes: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// The input's file name with an `.nx` extension, in the current directory
fn default_output(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| miette!("unable to create file stem of {}", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".nx");
    Ok(PathBuf::from(name))
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let start = Instant::now();

        let output = match &self.output {
            Some(output) => output.clone(),
            None => default_output(&self.input)?,
        };

        info!("loading {}", self.input.display());
        let tree = PropertyTree::from_json_path(&self.input)
            .context(format!("path: {}", self.input.display()))?;
        info!("loaded {} nodes", tree.len());

        let mut open = OpenOptions::new();
        open.read(true).write(true);
        if self.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let file = open
            .open(&output)
            .into_diagnostic()
            .context(format!("creating {}", output.display()))?;

        let options = NxWriterOptions::builder()
            .dump_images(self.dump_image)
            .dump_audio(self.dump_sound)
            .sort_nodes(self.sort_nodes)
            .build();

        info!("writing {}", output.display());
        NxWriter::new(file, options)
            .write_tree(&tree)
            .context(format!("writing {}", output.display()))?;

        info!("done in {:.2?}", start.elapsed());
        Ok(())
    }
}
