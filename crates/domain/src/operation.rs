use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One audited mailbox event on the exchange timeline.
///
/// Summary fields feed the timeline table; `full_data` carries the raw audit
/// payload and is consumed only by the detail projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Event time, when the payload carried one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Operation tag, e.g. `MailItemsAccessed` or `New-InboxRule`.
    pub operation: String,
    /// Item subject or synthesized label.
    pub subject: Option<String>,
    /// Folder path, display fallback when no subject is set.
    pub folder: Option<String>,
    /// Acting mailbox or user principal.
    pub user: Option<String>,
    /// Client IP address reported by the payload.
    pub client_ip: Option<String>,
    /// Item size in bytes.
    pub size: Option<u64>,
    /// Complete raw audit payload.
    pub full_data: Option<Value>,
}

impl OperationRecord {
    /// Classifies this record for detail projection dispatch.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        OperationKind::classify(self.operation.as_str())
    }
}

/// Closed dispatch set for operation-dependent detail projection.
///
/// `Generic` is the default arm; every operation tag maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Inbox rule creation or change (`New-InboxRule`, `Set-InboxRule`, ...).
    InboxRule,
    /// Item update.
    Update,
    /// Mailbox item access.
    MailAccess,
    /// Move into the deleted-items folder.
    MoveToDeleted,
    /// Any other operation.
    Generic,
}

impl OperationKind {
    /// Classifies an operation tag.
    ///
    /// The rule-indicator substring wins over the exact matches, so e.g. a
    /// hypothetical `Update-InboxRule` still projects as a rule.
    #[must_use]
    pub fn classify(operation: &str) -> Self {
        if operation.contains("InboxRule") {
            return Self::InboxRule;
        }

        match operation {
            "Update" => Self::Update,
            "MailItemsAccessed" => Self::MailAccess,
            "MoveToDeletedItems" => Self::MoveToDeleted,
            _ => Self::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OperationKind;

    #[test]
    fn rule_indicator_takes_precedence() {
        assert_eq!(
            OperationKind::classify("New-InboxRule"),
            OperationKind::InboxRule
        );
        assert_eq!(
            OperationKind::classify("Set-InboxRule"),
            OperationKind::InboxRule
        );
    }

    #[test]
    fn exact_kinds_classify() {
        assert_eq!(OperationKind::classify("Update"), OperationKind::Update);
        assert_eq!(
            OperationKind::classify("MailItemsAccessed"),
            OperationKind::MailAccess
        );
        assert_eq!(
            OperationKind::classify("MoveToDeletedItems"),
            OperationKind::MoveToDeleted
        );
    }

    #[test]
    fn unknown_operations_fall_back_to_generic() {
        assert_eq!(OperationKind::classify("SendAs"), OperationKind::Generic);
        assert_eq!(OperationKind::classify(""), OperationKind::Generic);
    }
}
