use std::ffi::OsString;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Open files read-only; writes need `:w!`
    #[clap(short = 'R', help = "read-only mode")]
    read_only: bool,

    /// Line command to run after the first file is loaded; may repeat
    #[clap(short = 'c', value_name = "CMD", help = "run CMD after loading")]
    commands: Vec<String>,

    /// Files to edit; `:n` moves to the next one
    #[clap(value_name = "FILE")]
    files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    read_only: bool,
    commands: Vec<String>,
    files: Vec<String>,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            read_only: args.read_only,
            commands: args.commands,
            files: args.files,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}
