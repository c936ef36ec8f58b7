use labinv::{Alert, ComponentId};

use super::{Client, progress::spin, render};

pub fn reserved_alert() -> Alert {
    Alert::success("Success", "Request to reserve submitted.")
}

pub fn cancelled_alert() -> Alert {
    Alert::success("Success", "Reservation request canceled.")
}

#[derive(Debug, clap::Parser)]
pub struct Reserve {
    /// Component identifier
    id: ComponentId,
}

impl Reserve {
    pub fn run(self, app: &mut Client) {
        spin("Submitting request…", || app.reserve(&self.id))
            .unwrap_or_else(|e| render::fail(&e));
        render::alert(&reserved_alert());
    }
}

#[derive(Debug, clap::Parser)]
pub struct Cancel {
    /// Component identifier
    id: ComponentId,
}

impl Cancel {
    pub fn run(self, app: &mut Client) {
        spin("Cancelling request…", || app.cancel(&self.id))
            .unwrap_or_else(|e| render::fail(&e));
        render::alert(&cancelled_alert());
    }
}
