//! Interactive console loop

use anyhow::{Context, Result};
use helpline_core::{Session, ToolEvent, ToolObserver, ToolOutput};
use serde_json::{Value, json};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::debug;

use crate::config::Desk;

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Identify { name: String, email: String },
    Ask(String),
    ShowContext,
    Tickets,
    Ticket(String),
    Tools,
    Subscription,
    Help,
    Quit,
    Empty,
    Usage(&'static str),
    Unknown,
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "quit" | "exit" => ReplCommand::Quit,
        "help" => ReplCommand::Help,
        "show_context" => ReplCommand::ShowContext,
        "tickets" => ReplCommand::Tickets,
        "tools" => ReplCommand::Tools,
        "subscription" => ReplCommand::Subscription,
        "ticket" if rest.is_empty() => ReplCommand::Usage("ticket <id>"),
        "ticket" => ReplCommand::Ticket(rest.to_string()),
        "ask" if rest.is_empty() => ReplCommand::Usage("ask <message>"),
        "ask" => ReplCommand::Ask(rest.to_string()),
        "identify" => match rest.split_once(char::is_whitespace) {
            Some((name, email)) if !email.trim().is_empty() => ReplCommand::Identify {
                name: name.to_string(),
                email: email.trim().to_string(),
            },
            _ => ReplCommand::Usage("identify <Name> <email>"),
        },
        _ => ReplCommand::Unknown,
    }
}

/// Prints streamed tool progress to the console
pub struct ConsoleObserver;

impl ToolObserver for ConsoleObserver {
    fn on_event(&self, event: &ToolEvent) {
        match event {
            ToolEvent::Started { tool } => println!("[stream] starting tool {}...", tool),
            ToolEvent::Finished { tool, summary, .. } => {
                println!("[stream] finished tool {}: {}", tool, summary)
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  identify <Name> <email>   - set user identity and premium detection");
    println!("  ask <message>             - ask the desk (triage + handoff)");
    println!("  show_context              - show current user context");
    println!("  tickets                   - list tickets (in-memory)");
    println!("  ticket <id>               - show one ticket");
    println!("  tools                     - list each agent's tools and whether they are enabled");
    println!("  subscription              - check the current email's subscription");
    println!("  help                      - show this help");
    println!("  quit                      - exit");
}

/// Run the console until `quit`, EOF or Ctrl-C
pub async fn run(desk: &Desk, session: &mut Session) -> Result<()> {
    println!("Helpline multi-agent support console");
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!("\nGoodbye");
            break;
        };

        let command = parse_command(&line);
        debug!("Console command: {:?}", command);

        match command {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                println!("Bye");
                break;
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Usage(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown => println!("Unknown command. Type 'help' for commands."),
            ReplCommand::ShowContext => {
                println!("{}", serde_json::to_string_pretty(session.context())?)
            }
            ReplCommand::Tickets => print_tickets(session),
            ReplCommand::Ticket(id) => match session.ticket(&id) {
                Ok(ticket) => println!("{}", serde_json::to_string_pretty(&ticket)?),
                Err(e) => println!("{}", e),
            },
            ReplCommand::Tools => print_tools(desk, session),
            ReplCommand::Subscription => check_subscription(desk, session),
            ReplCommand::Identify { name, email } => {
                session.identify(&name, &email);
                let ctx = session.context();
                println!(
                    "Identified {} <{}> | premium: {}",
                    name, email, ctx.is_premium_user
                );
            }
            ReplCommand::Ask(message) => {
                // the core sleeps through its simulated delays
                let reply = tokio::task::block_in_place(|| session.ask(&desk.router, &message));
                println!(
                    "[System] {} handled a {} request",
                    reply.agent, reply.category
                );
                println!("[{}] {}", reply.agent, reply.text);
            }
        }
    }

    Ok(())
}

fn print_tickets(session: &Session) {
    let tickets = session.tickets();
    if tickets.is_empty() {
        println!("No tickets yet");
        return;
    }
    for t in tickets {
        println!("- {} | {} | {} | {}", t.id, t.title, t.status, t.category);
    }
}

fn print_tools(desk: &Desk, session: &Session) {
    let ctx = session.context();
    for agent in desk.router.agents() {
        println!("{} ({}):", agent.name(), agent.kind());
        for tool in agent.tools() {
            let state = if agent.can_use(tool.name(), ctx) {
                "enabled"
            } else {
                "disabled"
            };
            println!("  {:<20} {:<9} {}", tool.name(), state, tool.description());
            println!("  {:<20} args: {}", "", describe_args(&tool.input_schema()));
        }
    }
}

/// Argument names from a tool's input schema; optional ones end in `?`
fn describe_args(schema: &Value) -> String {
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    match schema["properties"].as_object() {
        Some(props) if !props.is_empty() => props
            .keys()
            .map(|name| {
                if required.contains(&name.as_str()) {
                    name.clone()
                } else {
                    format!("{}?", name)
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => "none".to_string(),
    }
}

fn check_subscription(desk: &Desk, session: &mut Session) {
    let Some(email) = session.context().email.clone() else {
        println!("No email on record. Use: identify <Name> <email>");
        return;
    };
    match session.run_tool(&desk.registry, "check_subscription", json!({ "email": email })) {
        Ok(ToolOutput::Subscription { email, is_premium }) => println!(
            "{}: {}",
            email.unwrap_or_default(),
            if is_premium { "premium" } else { "standard" }
        ),
        Ok(other) => println!("{}", other.summary()),
        Err(e) => println!("Subscription check failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_core::ToolKind;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("help"), ReplCommand::Help);
        assert_eq!(parse_command("  QUIT "), ReplCommand::Quit);
        assert_eq!(parse_command("exit"), ReplCommand::Quit);
        assert_eq!(parse_command("show_context"), ReplCommand::ShowContext);
        assert_eq!(parse_command("tickets"), ReplCommand::Tickets);
        assert_eq!(parse_command("tools"), ReplCommand::Tools);
        assert_eq!(parse_command("subscription"), ReplCommand::Subscription);
        assert_eq!(parse_command(""), ReplCommand::Empty);
        assert_eq!(parse_command("dance"), ReplCommand::Unknown);
    }

    #[test]
    fn test_parse_ask_keeps_message() {
        assert_eq!(
            parse_command("ask I need a refund for a crash"),
            ReplCommand::Ask("I need a refund for a crash".to_string())
        );
        assert_eq!(parse_command("ask"), ReplCommand::Usage("ask <message>"));
    }

    #[test]
    fn test_parse_identify() {
        assert_eq!(
            parse_command("identify Jane jane@pro.com"),
            ReplCommand::Identify {
                name: "Jane".to_string(),
                email: "jane@pro.com".to_string()
            }
        );
        assert_eq!(
            parse_command("identify Jane"),
            ReplCommand::Usage("identify <Name> <email>")
        );
    }

    #[test]
    fn test_describe_args_marks_optional() {
        assert_eq!(
            describe_args(&ToolKind::CreateTicket.input_schema()),
            "description, title"
        );
        assert_eq!(describe_args(&ToolKind::Refund.input_schema()), "ticket_id");
        assert_eq!(
            describe_args(&ToolKind::RestartService.input_schema()),
            "service_name?"
        );
        assert_eq!(describe_args(&json!({"type": "object"})), "none");
    }

    #[test]
    fn test_parse_ticket() {
        assert_eq!(parse_command("ticket abc-123"), ReplCommand::Ticket("abc-123".to_string()));
        assert_eq!(parse_command("ticket"), ReplCommand::Usage("ticket <id>"));
    }
}
