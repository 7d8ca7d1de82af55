//! Configuration command handlers.

use tabled::Tabled;

use lumen_core::{ApplyRequest, Command as CoreCommand, CommandResult, Configuration, Controller};

use crate::cli::{ConfigsArgs, ConfigsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConfigurationRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Configuration> for ConfigurationRow {
    fn from(c: &Configuration) -> Self {
        Self {
            name: c.name.clone(),
            description: c.short_description().to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ConfigsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigsCommand::List => {
            let configs = controller.configurations().await?;
            let out = output::render_list(
                &global.output,
                &configs,
                |c| ConfigurationRow::from(c),
                |c| c.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigsCommand::Apply {
            name,
            transition,
            duration,
        } => {
            let request = ApplyRequest::from_form(
                &name,
                transition.as_deref().unwrap_or_default(),
                duration.as_deref().unwrap_or_default(),
            )?;
            let result = controller
                .execute(CoreCommand::ApplyConfiguration(request))
                .await?;
            if let CommandResult::Applied(ref outcome) = result {
                let out = output::render_single(
                    &global.output,
                    outcome,
                    |o| o.message.clone(),
                    |o| o.config_name.clone(),
                );
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}
