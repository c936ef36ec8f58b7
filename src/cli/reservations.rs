use labinv::domain::reservation::filter_by_component_name;

use super::{
    Client,
    progress::spin,
    render::{self, OutputFormat},
};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Only show requests whose component name contains this text
    #[arg(long, short, default_value = "")]
    filter: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Command {
    pub fn run(self, app: &Client) -> anyhow::Result<()> {
        let requests = spin("Fetching reservations…", || app.reservations())
            .unwrap_or_else(|e| render::fail(&e));
        render::reservations(filter_by_component_name(&requests, &self.filter), self.output)
    }
}
