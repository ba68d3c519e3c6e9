//! Server health command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::display::{colorize_status, output, CommandOutput, DetailView};
use crate::domain::models::ServiceInfo;

#[derive(Debug, Serialize)]
pub struct HealthOutput {
    pub base_url: String,
    pub status: String,
    pub service: Option<ServiceInfo>,
}

impl CommandOutput for HealthOutput {
    fn to_human(&self) -> String {
        let mut view = DetailView::new("Simulation server")
            .field("URL", &self.base_url)
            .field("Health", &colorize_status(&self.status).to_string());

        if let Some(service) = &self.service {
            view = view
                .field("Service", &format!("{} {}", service.name, service.version))
                .field(
                    "LLM API",
                    if service.api_configured {
                        "configured"
                    } else {
                        "not configured"
                    },
                )
                .field_opt("API type", service.api_type.as_deref());
        }
        view.render()
    }
}

pub async fn execute(ctx: &CliContext, json_mode: bool) -> Result<()> {
    let health = ctx.transport.health().await?;
    // Older servers do not expose the root document.
    let service = ctx.transport.service_info().await.ok();

    let out = HealthOutput {
        base_url: ctx.config.api.base_url.clone(),
        status: health.status,
        service,
    };
    output(&out, json_mode);
    Ok(())
}
