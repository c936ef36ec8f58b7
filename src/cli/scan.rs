use std::io::{self, BufRead};

use super::{
    Client, components,
    progress::spin,
    render::{self, OutputFormat},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Text decoded from the QR code (read from stdin when omitted)
    text: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

impl Command {
    pub fn run(self, app: &mut Client) -> anyhow::Result<()> {
        let text = match self.text {
            Some(text) => text,
            None => {
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                line
            }
        };

        let outcome = spin("Looking up component…", || app.scan(&text))
            .unwrap_or_else(|e| render::fail(&e));
        components::print_lookup(outcome, self.output)
    }
}
