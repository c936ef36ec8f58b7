use dialoguer::Input;
use labinv::{Alert, AppError, User, domain::ProfileUpdate};

use super::{Client, auth::choose_faculty, progress::spin, render};

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Show the signed-in user
    Show,

    /// Edit name, phone and faculty
    ///
    /// Fields not given as options are prompted for, pre-filled with their
    /// current values.
    Edit(Edit),
}

impl Command {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        match self {
            Self::Show => {
                let Some(user) = app.user() else {
                    render::fail(&AppError::SignedOut);
                };
                render::user(user);
            }
            Self::Edit(command) => command.run(app)?,
        }
        Ok(())
    }
}

#[derive(Debug, Default, clap::Parser)]
pub struct Edit {
    /// New given name
    #[arg(long)]
    first_name: Option<String>,

    /// New family name
    #[arg(long)]
    last_name: Option<String>,

    /// New phone number
    #[arg(long)]
    phone: Option<String>,

    /// New faculty name
    #[arg(long)]
    faculty: Option<String>,
}

impl Edit {
    const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.faculty.is_none()
    }

    /// Applies the given options over the current profile.
    fn update_for(self, user: &User) -> ProfileUpdate {
        let current = ProfileUpdate::from(user);
        ProfileUpdate {
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
            phone: self.phone.unwrap_or(current.phone),
            faculty: self.faculty.or(current.faculty),
        }
    }

    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let Some(user) = app.user() else {
            render::fail(&AppError::SignedOut);
        };

        let update = if self.is_empty() {
            prompt(app, user)?
        } else {
            self.update_for(user)
        };

        spin("Updating profile…", || app.edit_profile(&update).map(|_| ()))
            .unwrap_or_else(|e| render::fail(&e));
        render::alert(&Alert::success("Success", "Profile updated successfully!"));
        Ok(())
    }
}

fn prompt(app: &Client, user: &User) -> anyhow::Result<ProfileUpdate> {
    let first_name = Input::<String>::new()
        .with_prompt("First name")
        .with_initial_text(&user.first_name)
        .interact_text()?;
    let last_name = Input::<String>::new()
        .with_prompt("Last name")
        .with_initial_text(&user.last_name)
        .interact_text()?;
    let phone = Input::<String>::new()
        .with_prompt("Phone")
        .with_initial_text(&user.phone)
        .interact_text()?;
    let faculty = choose_faculty(app, user.faculty.as_deref())?;

    Ok(ProfileUpdate {
        first_name,
        last_name,
        phone,
        faculty,
    })
}

#[cfg(test)]
mod tests {
    use labinv::domain::UserId;

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new("17"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            phone: "0771234567".to_string(),
            faculty: Some("Engineering".to_string()),
            profile_picture: None,
        }
    }

    #[test]
    fn options_override_only_given_fields() {
        let edit = Edit {
            phone: Some("0710000000".to_string()),
            ..Edit::default()
        };
        assert!(!edit.is_empty());

        let update = edit.update_for(&user());

        assert_eq!(update.first_name, "Ada");
        assert_eq!(update.phone, "0710000000");
        assert_eq!(update.faculty.as_deref(), Some("Engineering"));
    }
}
