pub mod convert;
pub mod inspect;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert a JSON property tree into an NX file
    Convert(convert::ConvertArgs),
    /// Print the header and node tree of an NX file
    Inspect(inspect::InspectArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Convert(convert) => convert.handle(),
            Commands::Inspect(inspect) => inspect.handle(),
        }
    }
}
