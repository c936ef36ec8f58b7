use dialoguer::{Input, Password, Select};
use labinv::{
    Alert, User,
    domain::{Credentials, Registration},
};

use super::{Client, progress::spin, render, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Login {
    /// Account email (prompted for when omitted)
    #[arg(long)]
    email: Option<String>,

    /// Account password (prompted for when omitted)
    #[arg(long, env = "LABINV_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Login {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let credentials = Credentials {
            email: prompt_unless_given(self.email, "Email")?,
            password: password_unless_given(self.password)?,
        };

        let name = spin("Logging in…", || app.login(&credentials).map(User::full_name))
            .unwrap_or_else(|e| render::fail(&e));
        println!("{}", format!("✅ Logged in as {name}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Signup {
    /// Account email
    #[arg(long)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "LABINV_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Given name
    #[arg(long)]
    first_name: Option<String>,

    /// Family name
    #[arg(long)]
    last_name: Option<String>,

    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// Faculty name (chosen from the service's list when omitted)
    #[arg(long)]
    faculty: Option<String>,
}

impl Signup {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let email = prompt_unless_given(self.email, "Email")?;
        let password = password_unless_given(self.password)?;
        let first_name = prompt_unless_given(self.first_name, "First name")?;
        let last_name = prompt_unless_given(self.last_name, "Last name")?;
        let phone = prompt_unless_given(self.phone, "Phone")?;
        let faculty = match self.faculty {
            Some(faculty) => Some(faculty),
            None => choose_faculty(app, None)?,
        };

        let registration = Registration {
            email,
            password,
            first_name,
            last_name,
            phone,
            faculty,
        };

        let name = spin("Creating account…", || {
            app.signup(&registration).map(User::full_name)
        })
        .unwrap_or_else(|e| render::fail(&e));
        println!("{}", format!("✅ Signed up as {name}").success());
        Ok(())
    }
}

pub fn logout(app: &mut Client) {
    if let Err(e) = app.logout() {
        render::fail(&e);
    }
    render::alert(&Alert::success("Logged out", "Logged out."));
}

fn prompt_unless_given(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()?),
    }
}

fn password_unless_given(value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Password::new().with_prompt("Password").interact()?),
    }
}

/// Lets the user pick a faculty from the service's list.
///
/// A failure to load the list is reported and leaves the faculty unset.
pub fn choose_faculty(app: &Client, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let faculties = match spin("Loading faculties…", || app.faculties()) {
        Ok(faculties) => faculties,
        Err(e) => {
            render::alert(&e.alert());
            return Ok(current.map(str::to_string));
        }
    };
    if faculties.is_empty() {
        return Ok(current.map(str::to_string));
    }

    let names: Vec<&str> = faculties.iter().map(|f| f.name.as_str()).collect();
    let default = current
        .and_then(|current| names.iter().position(|name| *name == current))
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt("Faculty")
        .items(&names[..])
        .default(default)
        .interact_opt()?;

    Ok(choice
        .map(|idx| names[idx].to_string())
        .or_else(|| current.map(str::to_string)))
}
