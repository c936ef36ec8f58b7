//! A long-running interactive session.
//!
//! Commands share one controller, so the component store and the hierarchy
//! selection carry over from one command to the next.

use std::io::{self, BufRead, Write};

use clap::Parser;
use labinv::{
    AppError, ComponentId,
    domain::{DepartmentId, FacultyId, LabId, reservation::filter_by_component_name},
};

use super::{
    Client,
    components::{empty_lab_alert, no_results_alert, print_lookup},
    hierarchy::print_tree,
    progress::spin,
    render::{self, OutputFormat},
    reserve::{cancelled_alert, reserved_alert},
    terminal::Colorize,
};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {}

impl Command {
    pub fn run(self, mut app: Client) -> anyhow::Result<()> {
        let greeting = app.user().map_or_else(
            || "Not signed in. Run `labinv login` to reserve components.".warning(),
            |user| format!("Signed in as {}.", user.full_name()),
        );
        println!("{greeting}");
        println!("{}", "Type `help` for commands, `quit` to leave.".dim());

        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("{} ", prompt(&app));
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let input = match Input::try_parse_from(line.split_whitespace()) {
                Ok(input) => input,
                Err(e) => {
                    e.print()?;
                    continue;
                }
            };

            match input.action.execute(&mut app) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => render::alert(&e.alert()),
            }
        }
        Ok(())
    }
}

/// The prompt shows where in the hierarchy the user is.
fn prompt(app: &Client) -> String {
    let selection = app.selection();
    let Some(hierarchy) = app.hierarchy() else {
        return "labinv>".to_string();
    };

    let path: Vec<&str> = [
        selection
            .faculty()
            .and_then(|id| hierarchy.faculty(id))
            .map(|f| f.name.as_str()),
        selection
            .department()
            .and_then(|id| hierarchy.department(id))
            .map(|d| d.name.as_str()),
        selection
            .lab()
            .and_then(|id| hierarchy.lab(id))
            .map(|l| l.name.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if path.is_empty() {
        "labinv>".to_string()
    } else {
        format!("labinv [{}]>", path.join(" / "))
    }
}

enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, clap::Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Input {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Show the faculty → department → lab hierarchy
    Hierarchy,

    /// Select a faculty
    Faculty { id: FacultyId },

    /// Select a department of the selected faculty
    Department { id: DepartmentId },

    /// Select a lab of the selected department and list its components
    Lab { id: LabId },

    /// Refresh the components of the selected lab
    Browse,

    /// Show the components on screen (search results or the lab listing)
    List,

    /// Search components by name; with no text, return to the lab listing
    Search { query: Vec<String> },

    /// Show a single component
    Show { id: ComponentId },

    /// Request to reserve a component
    Reserve { id: ComponentId },

    /// Withdraw a reservation request
    Cancel { id: ComponentId },

    /// Look up a component from scanned QR code text
    Scan {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List reservation requests, optionally filtered by component name
    Reservations { filter: Vec<String> },

    /// Show the signed-in user
    Whoami,

    /// Log out and forget all components
    Logout,

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

impl Action {
    fn execute(self, app: &mut Client) -> Result<Flow, AppError> {
        match self {
            Self::Hierarchy => {
                let hierarchy = spin("Loading hierarchy…", || app.load_hierarchy().cloned())?;
                print_tree(&hierarchy, None);
            }
            Self::Faculty { id } => {
                let faculty = app.select_faculty(id)?;
                println!("Faculty: {}", faculty.name);
            }
            Self::Department { id } => {
                let department = app.select_department(id)?;
                println!("Department: {}", department.name);
            }
            Self::Lab { id } => {
                let lab = app.select_lab(id)?;
                println!("Lab: {}", lab.name);
                browse(app)?;
            }
            Self::Browse => browse(app)?,
            Self::List => list(app),
            Self::Search { query } => {
                let query = query.join(" ");
                match spin("Searching…", || app.search(&query))? {
                    Some(0) => render::alert(&no_results_alert()),
                    _ => list(app),
                }
            }
            Self::Show { id } => {
                let outcome = spin("Fetching component…", || app.lookup(&id))?;
                table(print_lookup(outcome, OutputFormat::Table));
            }
            Self::Reserve { id } => {
                spin("Submitting request…", || app.reserve(&id))?;
                render::alert(&reserved_alert());
            }
            Self::Cancel { id } => {
                spin("Cancelling request…", || app.cancel(&id))?;
                render::alert(&cancelled_alert());
            }
            Self::Scan { text } => {
                let text = text.join(" ");
                let outcome = spin("Looking up component…", || app.scan(&text))?;
                table(print_lookup(outcome, OutputFormat::Table));
            }
            Self::Reservations { filter } => {
                let filter = filter.join(" ");
                let requests = spin("Fetching reservations…", || app.reservations())?;
                table(render::reservations(
                    filter_by_component_name(&requests, &filter),
                    OutputFormat::Table,
                ));
            }
            Self::Whoami => match app.user() {
                Some(user) => render::user(user),
                None => return Err(AppError::SignedOut),
            },
            Self::Logout => {
                app.logout()?;
                println!("Logged out.");
            }
            Self::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn browse(app: &mut Client) -> Result<(), AppError> {
    match spin("Fetching components…", || app.browse_selected())? {
        0 => render::alert(&empty_lab_alert()),
        _ => list(app),
    }
    Ok(())
}

fn list(app: &Client) {
    let components = app.components();
    if components.visible().next().is_none() {
        println!("{}", "Nothing to show.".dim());
        return;
    }
    table(render::components(components.visible(), OutputFormat::Table));
}

/// Table output only fails on a broken stdout, which the next prompt will
/// hit as well.
fn table(result: anyhow::Result<()>) {
    if let Err(e) = result {
        tracing::warn!("{e:#}");
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn parse(line: &str) -> Action {
        Input::try_parse_from(line.split_whitespace()).unwrap().action
    }

    #[test]
    fn search_words_are_joined_later() {
        let Action::Search { query } = parse("search bench power supply") else {
            panic!("expected a search");
        };
        assert_eq!(query.join(" "), "bench power supply");
    }

    #[test]
    fn bare_search_has_no_query() {
        assert!(matches!(parse("search"), Action::Search { query } if query.is_empty()));
    }

    #[test]
    fn scanned_text_may_contain_spaces() {
        let Action::Scan { text } = parse("scan Component ID: 000123") else {
            panic!("expected a scan");
        };
        assert_eq!(text.join(" "), "Component ID: 000123");
    }

    #[test]
    fn scan_needs_text() {
        assert!(Input::try_parse_from(["scan"]).is_err());
    }

    #[test_case("quit"; "quit")]
    #[test_case("exit"; "alias")]
    fn leaving(line: &str) {
        assert!(matches!(parse(line), Action::Quit));
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(matches!(parse("lab 100"), Action::Lab { id } if id == LabId::new(100)));
        assert!(Input::try_parse_from(["lab", "power"]).is_err());
    }
}
