use labinv::{Hierarchy, domain::FacultyId};

use super::{
    Client,
    progress::spin,
    render::{self, OutputFormat},
    terminal::Colorize,
};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Only show this faculty
    #[arg(long, value_name = "ID")]
    faculty: Option<FacultyId>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Command {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let hierarchy = spin("Loading hierarchy…", || app.load_hierarchy().cloned())
            .unwrap_or_else(|e| render::fail(&e));

        match self.output {
            OutputFormat::Table => print_tree(&hierarchy, self.faculty),
            OutputFormat::Json => render::json(&hierarchy)?,
        }
        Ok(())
    }
}

/// Prints faculties, departments and labs as an indented tree.
///
/// Each entry shows the identifier the selection commands take.
pub fn print_tree(hierarchy: &Hierarchy, only: Option<FacultyId>) {
    let faculties = hierarchy
        .faculties
        .iter()
        .filter(|faculty| only.is_none_or(|id| faculty.id == id));

    for faculty in faculties {
        println!("{} {}", format!("[{}]", faculty.id).dim(), faculty.name);
        for department in hierarchy.departments_of(faculty.id) {
            println!(
                "  {} {}",
                format!("[{}]", department.id).dim(),
                department.name
            );
            for lab in hierarchy.labs_of(department.id) {
                println!("    {} {}", format!("[{}]", lab.id).dim(), lab.name);
            }
        }
    }
}
