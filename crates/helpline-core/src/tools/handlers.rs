//! Operations behind each tool kind. Gating has already passed when these run.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::{ToolEnv, ToolKind, ToolOutput, ToolResult, ToolSettings, pause};
use crate::error::ToolError;
use crate::tickets::{TicketStatus, UserSnapshot};
use crate::types::{Category, UserContext, email_is_premium};

#[derive(Deserialize)]
struct CreateTicketArgs {
    title: String,
    description: String,
}

#[derive(Deserialize)]
struct RefundArgs {
    #[serde(default)]
    ticket_id: Option<String>,
}

#[derive(Deserialize)]
struct RestartArgs {
    #[serde(default)]
    service_name: Option<String>,
}

#[derive(Deserialize)]
struct CheckSubscriptionArgs {
    #[serde(default)]
    email: Option<String>,
}

fn parse_args<T: DeserializeOwned>(kind: ToolKind, args: Value) -> Result<T, ToolError> {
    // A bare call with no arguments is treated as an empty object
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: kind.name().to_string(),
        reason: e.to_string(),
    })
}

pub(super) fn create_ticket(args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
    let args: CreateTicketArgs = parse_args(ToolKind::CreateTicket, args)?;
    let category = env.context.issue_type.unwrap_or(Category::General);

    let ticket = env.store.create(
        &args.title,
        &args.description,
        UserSnapshot::from(&*env.context),
        category,
    );
    env.context.last_ticket_id = Some(ticket.id.clone());

    Ok(ToolOutput::TicketCreated { ticket })
}

pub(super) fn refund(args: Value, env: &mut ToolEnv<'_>) -> ToolResult {
    let args: RefundArgs = parse_args(ToolKind::Refund, args)?;
    let ticket_id = args.ticket_id.ok_or(ToolError::NoTicket)?;

    let ticket = env.store.find_by_id(&ticket_id)?;
    if ticket.status == TicketStatus::Refunded {
        debug!("Ticket {} already refunded", ticket_id);
        return Ok(ToolOutput::Refunded {
            ticket,
            message: "Ticket was already refunded.".to_string(),
        });
    }

    let ticket = env.store.update_status(&ticket_id, TicketStatus::Refunded)?;
    info!("Refunded ticket {}", ticket_id);
    Ok(ToolOutput::Refunded {
        ticket,
        message: "Refund processed.".to_string(),
    })
}

pub(super) fn restart_service(args: Value, settings: &ToolSettings) -> ToolResult {
    let args: RestartArgs = parse_args(ToolKind::RestartService, args)?;
    let service = args
        .service_name
        .unwrap_or_else(|| settings.service_name.clone());

    // Simulated restart
    pause(settings.restart_delay);
    info!("Restarted service {}", service);

    Ok(ToolOutput::Restarted {
        message: format!("Service '{}' restarted successfully.", service),
        service,
    })
}

pub(super) fn check_subscription(args: Value, ctx: &UserContext) -> ToolResult {
    let args: CheckSubscriptionArgs = parse_args(ToolKind::CheckSubscription, args)?;
    let email = args.email.or_else(|| ctx.email.clone());
    let is_premium = ctx.is_premium_user || email.as_deref().is_some_and(email_is_premium);

    Ok(ToolOutput::Subscription { email, is_premium })
}
