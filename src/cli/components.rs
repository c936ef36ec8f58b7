use labinv::{Alert, ComponentId, app::LookupOutcome, domain::LabId};

use super::{
    Client,
    progress::spin,
    render::{self, OutputFormat},
};

pub fn empty_lab_alert() -> Alert {
    Alert::info("Info", "No components found for the selected lab.")
}

pub fn no_results_alert() -> Alert {
    Alert::info("Info", "No components found.")
}

#[derive(Debug, clap::Parser)]
pub struct Browse {
    /// Identifier of the lab (see `labinv hierarchy`)
    lab: LabId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Browse {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        match spin("Fetching components…", || app.browse_lab(self.lab)) {
            Ok(0) if self.output == OutputFormat::Table => render::alert(&empty_lab_alert()),
            Ok(_) => render::components(app.components().lab_listing(), self.output)?,
            Err(e) => render::fail(&e),
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Search {
    /// Text to look for in component names
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Search {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let query = self.query.join(" ");
        match spin("Searching…", || app.search(&query)) {
            Ok(Some(0)) if self.output == OutputFormat::Table => {
                render::alert(&no_results_alert());
            }
            Ok(Some(_)) => {
                if let Some(results) = app.components().search_results() {
                    render::components(results, self.output)?;
                }
            }
            Ok(None) => render::alert(&no_results_alert()),
            Err(e) => render::fail(&e),
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Show {
    /// Component identifier
    id: ComponentId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Show {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        show(app, &self.id, self.output)
    }
}

/// Looks up a component and prints it, or reports that it does not exist.
pub fn show(app: &mut Client, id: &ComponentId, output: OutputFormat) -> anyhow::Result<()> {
    let outcome =
        spin("Fetching component…", || app.lookup(id)).unwrap_or_else(|e| render::fail(&e));
    print_lookup(outcome, output)
}

pub fn print_lookup(outcome: LookupOutcome, output: OutputFormat) -> anyhow::Result<()> {
    match outcome {
        LookupOutcome::Found(component) => match output {
            OutputFormat::Table => render::component_details(&component),
            OutputFormat::Json => render::components(std::iter::once(&component), output)?,
        },
        LookupOutcome::NotFound(_) => render::alert(&LookupOutcome::not_found_alert()),
    }
    Ok(())
}
