use clap::Parser;

/// Canvassing roster tool: links the padron with the coordinator, sub-coordinator and voter tables.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the campaign and where its tables are.
    /// See the manual of padron_roster for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (CI, optional) The identity of the acting user. Not needed for the superadmin.
    #[clap(short, long, value_parser)]
    pub user: Option<String>,

    /// (superadmin, coordinador or subcoordinador) The role of the acting user. Statistics and
    /// reports are scoped to it. Without a role, no statistics are computed.
    #[clap(long, value_parser)]
    pub role: Option<String>,

    /// (text, optional) Searches the padron for people matching all the words, in the CI or in the name.
    #[clap(short, long, value_parser)]
    pub search: Option<String>,

    /// (default 1) The page of search results to show.
    #[clap(short, long, value_parser)]
    pub page: Option<usize>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified in the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the computed summary must match it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Empties the offline cache of the padron before reading the tables.
    #[clap(long, takes_value = false)]
    pub clear_cache: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
