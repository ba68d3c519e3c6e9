//! Agent CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::context::CliContext;
use crate::cli::display::{
    action_success, list_table, output, relative_time_opt, render_list, short_id,
    truncate_ellipsis, CommandOutput, DetailView,
};
use crate::domain::models::{
    validate_upload_file_name, Agent, AgentCreateRequest, AgentGenerateRequest,
    AgentUpdateRequest, Persona,
};

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommands,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List agents
    List,
    /// Show agent details
    Show {
        /// Agent ID
        id: String,
    },
    /// Create an agent from a persona
    Create {
        /// Agent type
        #[arg(long = "type", default_value = "TinyPerson")]
        agent_type: String,
        /// Persona name (ignored when --persona-file is given)
        #[arg(long, required_unless_present = "persona_file")]
        name: Option<String>,
        /// JSON file holding the full persona
        #[arg(long)]
        persona_file: Option<PathBuf>,
    },
    /// Generate an agent from a natural-language description
    Generate {
        /// Who the agent should be
        description: String,
        /// Extra context for the generator
        #[arg(short, long)]
        context: Option<String>,
    },
    /// Import an agent definition from a JSON file
    Upload {
        /// Path to the .json definition
        file: PathBuf,
    },
    /// Update an agent's type or persona
    Update {
        /// Agent ID
        id: String,
        /// New agent type
        #[arg(long = "type")]
        agent_type: Option<String>,
        /// JSON file holding the replacement persona
        #[arg(long)]
        persona_file: Option<PathBuf>,
    },
    /// Delete an agent
    Delete {
        /// Agent ID
        id: String,
    },
    /// List an agent's memory fragments
    Fragments {
        /// Agent ID
        id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct AgentListOutput {
    pub agents: Vec<Agent>,
    pub total: usize,
}

impl CommandOutput for AgentListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "type", "occupation", "created"]);
        for agent in &self.agents {
            let occupation = agent
                .persona
                .occupation
                .as_ref()
                .map_or("-", |o| o.title.as_str());
            table.add_row(vec![
                short_id(&agent.id).to_string(),
                truncate_ellipsis(&agent.persona.name, 24),
                agent.agent_type.clone(),
                truncate_ellipsis(occupation, 24),
                relative_time_opt(agent.created_at.as_deref()),
            ]);
        }
        render_list("agent", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct AgentDetailOutput {
    #[serde(flatten)]
    pub agent: Agent,
}

impl CommandOutput for AgentDetailOutput {
    fn to_human(&self) -> String {
        let agent = &self.agent;
        let persona = &agent.persona;
        let age = persona.age.map(|a| a.to_string());

        let mut view = DetailView::new(&format!("Agent: {}", persona.name))
            .field("ID", &agent.id)
            .field("Type", &agent.agent_type)
            .field_opt("Age", age.as_deref())
            .field_opt("Gender", persona.gender.as_deref())
            .field_opt("Nationality", persona.nationality.as_deref())
            .field_opt("Residence", persona.residence.as_deref())
            .field_opt("Education", persona.education.as_deref())
            .field_opt("Occupation", persona.occupation.as_ref().map(|o| o.title.as_str()))
            .field_opt("Created", agent.created_at.as_deref())
            .field_opt("Updated", agent.updated_at.as_deref());

        if let Some(traits) = persona.personality.as_ref().map(|p| &p.traits) {
            view = view.section("Personality");
            for t in traits {
                view = view.item(t);
            }
        }
        if let Some(skills) = &persona.skills {
            view = view.section("Skills");
            for skill in skills {
                view = view.item(skill);
            }
        }
        if let Some(goals) = &persona.long_term_goals {
            view = view.section("Goals");
            for goal in goals {
                view = view.item(goal);
            }
        }
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct AgentActionOutput {
    pub success: bool,
    pub message: String,
    pub agent: Option<Agent>,
}

impl CommandOutput for AgentActionOutput {
    fn to_human(&self) -> String {
        action_success(&self.message)
    }
}

#[derive(Debug, Serialize)]
pub struct FragmentsOutput {
    pub agent_id: String,
    pub fragments: Vec<String>,
    pub total: usize,
}

impl CommandOutput for FragmentsOutput {
    fn to_human(&self) -> String {
        if self.fragments.is_empty() {
            return format!("No fragments for agent {}.", self.agent_id);
        }
        let mut view = DetailView::new(&format!("Fragments of {}", self.agent_id))
            .field("Total", &self.total.to_string())
            .section("Fragments");
        for fragment in &self.fragments {
            view = view.item(fragment);
        }
        view.render()
    }
}

fn created(verb: &str, agent: Agent) -> AgentActionOutput {
    AgentActionOutput {
        success: true,
        message: format!("Agent {verb}: {} ({})", agent.persona.name, agent.id),
        agent: Some(agent),
    }
}

async fn read_persona(path: &Path) -> Result<Persona> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read persona file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid persona JSON in {}", path.display()))
}

pub async fn execute(args: AgentArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    match args.command {
        AgentCommands::List => {
            let list = ctx.agents.list().await?;
            let out = AgentListOutput {
                total: list.total,
                agents: list.agents,
            };
            output(&out, json_mode);
        }

        AgentCommands::Show { id } => {
            let agent = ctx.agents.get(&id).await?;
            output(&AgentDetailOutput { agent }, json_mode);
        }

        AgentCommands::Create {
            agent_type,
            name,
            persona_file,
        } => {
            let persona = match (persona_file, name) {
                (Some(path), _) => read_persona(&path).await?,
                (None, Some(name)) => Persona::named(name.trim()),
                (None, None) => anyhow::bail!("Either --name or --persona-file is required"),
            };
            let request = AgentCreateRequest {
                agent_type,
                persona,
            };
            let agent = ctx.mutations.create_agent(&request).await?;
            output(&created("created", agent), json_mode);
        }

        AgentCommands::Generate {
            description,
            context,
        } => {
            let request = AgentGenerateRequest::new(&description, context.as_deref());
            request.validate()?;
            let agent = ctx.mutations.generate_agent(&request).await?;
            output(&created("generated", agent), json_mode);
        }

        AgentCommands::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            validate_upload_file_name(&file_name)?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let agent = ctx.mutations.upload_agent(&file_name, bytes).await?;
            output(&created("uploaded", agent), json_mode);
        }

        AgentCommands::Update {
            id,
            agent_type,
            persona_file,
        } => {
            let persona = match persona_file {
                Some(path) => Some(read_persona(&path).await?),
                None => None,
            };
            let request = AgentUpdateRequest {
                agent_type,
                persona,
            };
            if request.is_empty() {
                anyhow::bail!("Nothing to update: pass --type or --persona-file");
            }
            let agent = ctx.mutations.update_agent(&id, &request).await?;
            output(&created("updated", agent), json_mode);
        }

        AgentCommands::Delete { id } => {
            ctx.mutations.delete_agent(&id).await?;
            let out = AgentActionOutput {
                success: true,
                message: format!("Agent deleted: {id}"),
                agent: None,
            };
            output(&out, json_mode);
        }

        AgentCommands::Fragments { id } => {
            let list = ctx.agents.fragments(&id).await?;
            let out = FragmentsOutput {
                agent_id: id,
                total: list.total,
                fragments: list.fragments,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
