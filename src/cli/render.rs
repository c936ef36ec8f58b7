//! Output shared by the one-shot commands and the interactive shell.

use std::{fmt, process};

use anyhow::Context;
use labinv::{
    Alert, AppError, Component, ReservationRequest, ReservationStatus, User,
    app::AlertLevel,
};
use serde::Serialize;

use super::terminal::{Colorize, is_narrow, paint_status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
        })
    }
}

pub fn alert(alert: &Alert) {
    match alert.level {
        AlertLevel::Info => println!("{}", alert.to_string().info()),
        AlertLevel::Success => println!("{}", format!("✅ {}", alert.message).success()),
        AlertLevel::Error => eprintln!("{}", format!("❌ {alert}").failure()),
    }
}

/// Reports a failed one-shot command and exits.
pub fn fail(error: &AppError) -> ! {
    tracing::debug!("{error}");
    alert(&error.alert());
    process::exit(1);
}

#[derive(Serialize)]
struct ComponentRow<'a> {
    #[serde(flatten)]
    component: &'a Component,
    status: ReservationStatus,
}

pub fn components<'a>(
    components: impl Iterator<Item = &'a Component>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Table => {
            component_table(components);
            Ok(())
        }
        OutputFormat::Json => {
            let rows: Vec<_> = components
                .map(|component| ComponentRow {
                    component,
                    status: component.status(),
                })
                .collect();
            json(&rows)
        }
    }
}

fn component_table<'a>(components: impl Iterator<Item = &'a Component>) {
    let narrow = is_narrow();
    let headers: &[&str] = if narrow {
        &["ID", "STATUS"]
    } else {
        &["ID", "NAME", "LAB", "STATUS"]
    };

    let rows: Vec<(Vec<String>, ReservationStatus)> = components
        .map(|c| {
            let status = c.status();
            let cells = if narrow {
                vec![c.id.to_string(), status.to_string()]
            } else {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.lab_name.clone(),
                    status.to_string(),
                ]
            };
            (cells, status)
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|(cells, _)| cells[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    let last = headers.len() - 1;
    for (cells, status) in rows {
        for (idx, value) in cells.iter().enumerate() {
            let width = widths[idx];
            let padded = format!("{value:<width$}  ");
            if idx == last {
                print!("{}", paint_status(status, &padded));
            } else {
                print!("{padded}");
            }
        }
        println!();
    }
}

pub fn component_details(component: &Component) {
    println!("# {}", component.id);
    println!("{}\n", component.name);

    println!("{}", "Location".dim());
    println!("  Lab:        {}", component.lab_name);
    if let Some(department) = &component.department_name {
        println!("  Department: {department}");
    }
    if let Some(faculty) = &component.faculty_name {
        println!("  Faculty:    {faculty}");
    }
    if let Some(image) = &component.image {
        println!("  Image:      {image}");
    }

    let status = component.status();
    println!("\n{}", "Status".dim());
    println!("  {}", paint_status(status, &status.to_string()));
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

pub fn reservations<'a>(
    requests: impl Iterator<Item = &'a ReservationRequest>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    if output == OutputFormat::Json {
        let rows: Vec<_> = requests.collect();
        return json(&rows);
    }

    let mut any = false;
    for request in requests {
        any = true;
        let when = request.requested_at().map_or_else(
            || request.request_date.clone(),
            |at| at.format("%d %b %Y, %H:%M").to_string(),
        );
        println!("{}  {}", request.component_id, request.component_name);
        println!(
            "    {} <{}>  {}",
            request.user_name,
            request.email,
            when.dim()
        );
    }
    if !any {
        println!("{}", "No reservation requests.".dim());
    }
    Ok(())
}

pub fn user(user: &User) {
    println!("# {}", user.full_name());
    println!("  ID:       {}", user.id);
    println!("  Email:    {}", user.email);
    println!("  Phone:    {}", user.phone);
    println!(
        "  Faculty:  {}",
        user.faculty.as_deref().unwrap_or("-")
    );
}
