//! Ticket records and the ticket store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::types::{Category, UserContext};

/// Lifecycle state of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    Refunded,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// Who the ticket was opened for, copied at creation time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&UserContext> for UserSnapshot {
    fn from(ctx: &UserContext) -> Self {
        Self {
            name: ctx.name.clone(),
            email: ctx.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub user: UserSnapshot,
    pub category: Category,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Storage for tickets. Tickets are appended and updated, never deleted.
pub trait TicketStore {
    fn create(
        &mut self,
        title: &str,
        description: &str,
        user: UserSnapshot,
        category: Category,
    ) -> Ticket;

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError>;

    fn update_status(&mut self, id: &str, status: TicketStatus) -> Result<Ticket, StoreError>;

    /// All tickets in creation order
    fn list_all(&self) -> Vec<Ticket>;
}

/// Process-local ticket store
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: Vec<Ticket>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create(
        &mut self,
        title: &str,
        description: &str,
        user: UserSnapshot,
        category: Category,
    ) -> Ticket {
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            user,
            category,
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        info!("Created ticket {} ({}, {})", ticket.id, ticket.title, category);
        self.tickets.push(ticket.clone());
        ticket
    }

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn update_status(&mut self, id: &str, status: TicketStatus) -> Result<Ticket, StoreError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!("Ticket {}: {} -> {}", id, ticket.status, status);
        ticket.status = status;
        Ok(ticket.clone())
    }

    fn list_all(&self) -> Vec<Ticket> {
        self.tickets.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            name: Some("Jane".to_string()),
            email: Some("jane@example.com".to_string()),
        }
    }

    #[test]
    fn test_create_ticket_is_open() {
        let mut store = InMemoryTicketStore::new();
        let ticket = store.create("Billing issue", "refund please", snapshot(), Category::Billing);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.category, Category::Billing);
        assert_eq!(ticket.user.name.as_deref(), Some("Jane"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ticket_ids_unique() {
        let mut store = InMemoryTicketStore::new();
        for i in 0..50 {
            store.create(&format!("t{}", i), "", UserSnapshot::default(), Category::General);
        }
        let ids: HashSet<String> = store.list_all().into_iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_find_by_id() {
        let mut store = InMemoryTicketStore::new();
        let ticket = store.create("a", "b", snapshot(), Category::General);
        assert_eq!(store.find_by_id(&ticket.id).unwrap(), ticket);
        assert_eq!(
            store.find_by_id("missing"),
            Err(StoreError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_update_status() {
        let mut store = InMemoryTicketStore::new();
        let ticket = store.create("a", "b", snapshot(), Category::Billing);
        let updated = store.update_status(&ticket.id, TicketStatus::Refunded).unwrap();
        assert_eq!(updated.status, TicketStatus::Refunded);
        assert_eq!(store.find_by_id(&ticket.id).unwrap().status, TicketStatus::Refunded);
    }

    #[test]
    fn test_update_status_missing() {
        let mut store = InMemoryTicketStore::new();
        assert!(store.update_status("nope", TicketStatus::Refunded).is_err());
    }

    #[test]
    fn test_list_all_in_creation_order() {
        let mut store = InMemoryTicketStore::new();
        let first = store.create("first", "", UserSnapshot::default(), Category::General);
        let second = store.create("second", "", UserSnapshot::default(), Category::Technical);
        let all = store.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[test]
    fn test_snapshot_from_context() {
        let ctx = UserContext {
            name: Some("Bob".to_string()),
            email: None,
            ..Default::default()
        };
        let snap = UserSnapshot::from(&ctx);
        assert_eq!(snap.name.as_deref(), Some("Bob"));
        assert!(snap.email.is_none());
    }
}
