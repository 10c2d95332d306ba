//! Detail projection of one operation record's raw audit payload.
//!
//! Everything here is a pure function from payload to view model; every field
//! access is optional-safe and degrades to a localized placeholder instead of
//! failing or dropping the surrounding section.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{
    PLACEHOLDER, format_bytes, format_timestamp, normalize_folder_path, parse_audit_timestamp,
};
use crate::operation::{OperationKind, OperationRecord};

const NO_SUBJECT: &str = "Sans sujet";
const NOT_AVAILABLE: &str = "N/A";
const NO_ATTACHMENTS: &str = "Aucune";
const NO_CONDITIONS: &str = "Aucune condition définie";
const NO_ACTIONS: &str = "Aucune action définie";
const NO_FOLDERS: &str = "Aucun dossier dans ce log";
const NO_FOLDER_ITEMS: &str = "Aucun item";
const NO_ITEMS: &str = "Aucun élément pour ce log";

const MAX_ACCESSED_FOLDERS: usize = 5;
const MAX_SAMPLE_SUBJECTS: usize = 2;
const MAX_MOVED_ITEMS: usize = 5;
const MAX_ITEMIZED_PARAMETERS: usize = 10;

/// One labelled display line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailField {
    /// Localized field label.
    pub label: String,
    /// Display value.
    pub value: String,
}

impl DetailField {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_owned(),
            value: value.into(),
        }
    }
}

/// A group of display lines with an explicit notice when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Lines of the group.
    pub fields: Vec<DetailField>,
    /// Localized empty-group notice, present only when `fields` is empty.
    pub empty_notice: Option<String>,
}

impl FieldGroup {
    fn new(fields: Vec<DetailField>, notice: &str) -> Self {
        let empty_notice = fields.is_empty().then(|| notice.to_owned());
        Self {
            fields,
            empty_notice,
        }
    }
}

/// Always-rendered header panel of the detail modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPanel {
    /// Formatted event time.
    pub date: String,
    /// Operation tag.
    pub operation: String,
    /// Acting user.
    pub user: String,
    /// Result status reported by the platform.
    pub result_status: String,
    /// Originating workload.
    pub workload: String,
    /// Client IP (`ClientIP`, falling back to `ClientIPAddress`).
    pub client_ip: String,
    /// Client application string.
    pub client_info: String,
}

/// Inbox-rule projection: flat parameters split into conditions and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleView {
    /// Rule name, when the parameter list carried one.
    pub rule_name: Option<String>,
    /// Rule trigger conditions.
    pub conditions: FieldGroup,
    /// Rule actions.
    pub actions: FieldGroup,
}

/// Item-update projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateView {
    /// Updated item subject.
    pub subject: Option<String>,
    /// Normalized parent folder path.
    pub folder_path: Option<String>,
    /// Item size in whole kilobytes.
    pub size_kb: Option<u64>,
    /// Modified property names, translated where a label is known.
    pub modified_properties: Vec<String>,
}

/// One folder touched by a mail-access operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessedFolder {
    /// Normalized folder path.
    pub path: String,
    /// Number of items accessed in the folder.
    pub item_count: usize,
    /// Up to two sample subjects.
    pub sample_subjects: Vec<String>,
}

/// Mail-access projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAccessView {
    /// Localized access type label (raw code when unknown).
    pub access_type: String,
    /// Total number of folders in the payload.
    pub folder_count: usize,
    /// At most five folders.
    pub folders: Vec<AccessedFolder>,
    /// Overflow notice when more folders exist than are listed.
    pub overflow_notice: Option<String>,
}

/// One item listed by a move/delete projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedItem {
    /// Item subject, `Sans sujet` when absent.
    pub subject: String,
    /// Internet message id, when present.
    pub message_id: Option<String>,
}

/// Move-to-deleted-items projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveView {
    /// Number of affected items.
    pub affected_count: usize,
    /// Normalized source folder path.
    pub source_folder: Option<String>,
    /// Normalized destination folder path.
    pub destination_folder: Option<String>,
    /// At most five affected items.
    pub items: Vec<MovedItem>,
    /// Overflow notice when more items exist than are listed.
    pub overflow_notice: Option<String>,
}

/// Fallback projection for every other operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericView {
    /// Localized section title, raw operation tag when unknown.
    pub title: String,
    /// Item subject, when present.
    pub subject: Option<String>,
    /// Normalized parent folder path, when present.
    pub folder_path: Option<String>,
    /// Name/value parameters, itemized only for lists of one to ten entries.
    pub parameters: Vec<DetailField>,
}

/// Operation-kind-dependent projection; `Generic` is the default arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationDetailView {
    /// Inbox rule definition.
    Rule(RuleView),
    /// Item update.
    Update(UpdateView),
    /// Mailbox item access.
    MailAccess(MailAccessView),
    /// Move into deleted items.
    Move(MoveView),
    /// Generic parameter dump.
    Generic(GenericView),
}

/// One item inside a folder of the folders view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderItemDetail {
    /// Item subject.
    pub subject: String,
    /// Formatted item size.
    pub size: String,
    /// Formatted creation time.
    pub created: String,
    /// Internet message id.
    pub message_id: String,
}

/// One folder of the folders view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDetail {
    /// Folder path as reported by the payload.
    pub path: String,
    /// Items of the folder.
    pub items: Vec<FolderItemDetail>,
    /// Notice shown when the folder has no items.
    pub empty_notice: Option<String>,
}

/// Folders view of the detail modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldersView {
    /// Every folder from the payload, unbounded.
    pub folders: Vec<FolderDetail>,
    /// Notice shown when the payload has no folders at all.
    pub empty_notice: Option<String>,
}

/// One affected item of the items view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedItemDetail {
    /// Item subject.
    pub subject: String,
    /// Parent folder path.
    pub parent_folder: String,
    /// Attachment summary.
    pub attachments: String,
    /// Internet message id.
    pub message_id: String,
}

/// The single `Item` entry of the items view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Item subject.
    pub subject: String,
    /// Formatted item size.
    pub size: String,
    /// Parent folder path.
    pub parent_folder: String,
    /// Attachment summary.
    pub attachments: String,
}

/// Items view of the detail modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsView {
    /// Affected items, when the payload carries any.
    pub affected_items: Vec<AffectedItemDetail>,
    /// The single item, when the payload carries one.
    pub item: Option<ItemDetail>,
    /// Notice shown when neither is present.
    pub empty_notice: Option<String>,
}

/// Complete detail projection of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDetail {
    /// Always-rendered header panel.
    pub info: InfoPanel,
    /// Operation-kind-dependent breakdown.
    pub operation_view: OperationDetailView,
    /// Folders view.
    pub folders: FoldersView,
    /// Items view.
    pub items: ItemsView,
    /// Complete payload as indented JSON.
    pub raw_json: String,
}

/// One run of raw-JSON text, marked when it matched the search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSegment {
    /// Text run.
    pub text: String,
    /// Whether this run is a search match.
    pub highlighted: bool,
}

/// Projects one record into the four modal views plus its raw JSON.
///
/// When the record carries no raw payload the summary record itself is
/// projected, so the modal always has content.
#[must_use]
pub fn project(record: &OperationRecord) -> LogDetail {
    let payload = record
        .full_data
        .clone()
        .or_else(|| serde_json::to_value(record).ok())
        .unwrap_or(Value::Null);

    let operation = str_field(&payload, "Operation")
        .unwrap_or(record.operation.as_str())
        .to_owned();

    let operation_view = match OperationKind::classify(operation.as_str()) {
        OperationKind::InboxRule => OperationDetailView::Rule(project_rule(&payload)),
        OperationKind::Update => OperationDetailView::Update(project_update(&payload)),
        OperationKind::MailAccess => OperationDetailView::MailAccess(project_mail_access(&payload)),
        OperationKind::MoveToDeleted => OperationDetailView::Move(project_move(&payload)),
        OperationKind::Generic => {
            OperationDetailView::Generic(project_generic(operation.as_str(), &payload))
        }
    };

    LogDetail {
        info: project_info(&payload),
        operation_view,
        folders: project_folders(&payload),
        items: project_items(&payload),
        raw_json: serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|_| payload.to_string()),
    }
}

/// Splits `text` into segments, marking every case-insensitive occurrence of
/// `query`. An empty or whitespace query yields one unmarked segment; segment
/// concatenation always reproduces `text` exactly.
#[must_use]
pub fn highlight_matches(text: &str, query: &str) -> Vec<RawSegment> {
    let needle = query.trim();
    if needle.is_empty() {
        return vec![RawSegment {
            text: text.to_owned(),
            highlighted: false,
        }];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while cursor + needle.len() <= text.len() {
        let is_match = text
            .get(cursor..cursor + needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle));

        if is_match {
            if plain_start < cursor {
                segments.push(RawSegment {
                    text: text[plain_start..cursor].to_owned(),
                    highlighted: false,
                });
            }
            segments.push(RawSegment {
                text: text[cursor..cursor + needle.len()].to_owned(),
                highlighted: true,
            });
            cursor += needle.len();
            plain_start = cursor;
        } else {
            cursor += 1;
            while cursor < text.len() && !text.is_char_boundary(cursor) {
                cursor += 1;
            }
        }
    }

    if plain_start < text.len() {
        segments.push(RawSegment {
            text: text[plain_start..].to_owned(),
            highlighted: false,
        });
    }

    if segments.is_empty() {
        segments.push(RawSegment {
            text: String::new(),
            highlighted: false,
        });
    }

    segments
}

fn project_info(payload: &Value) -> InfoPanel {
    let date = match str_field(payload, "CreationTime") {
        Some(raw) => parse_audit_timestamp(raw)
            .map_or_else(|| raw.to_owned(), |parsed| format_timestamp(Some(&parsed))),
        None => PLACEHOLDER.to_owned(),
    };

    InfoPanel {
        date,
        operation: display_field(payload, "Operation"),
        user: display_field(payload, "UserId"),
        result_status: display_field(payload, "ResultStatus"),
        workload: display_field(payload, "Workload"),
        client_ip: str_field(payload, "ClientIP")
            .or_else(|| str_field(payload, "ClientIPAddress"))
            .unwrap_or(PLACEHOLDER)
            .to_owned(),
        client_info: display_field(payload, "ClientInfoString"),
    }
}

fn project_rule(payload: &Value) -> RuleView {
    let parameters = parameter_map(payload);
    let lookup = |name: &str| {
        parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    let flag_set = |name: &str| lookup(name).is_some_and(|value| value == "True");

    let mut conditions = Vec::new();
    if let Some(from) = lookup("From") {
        conditions.push(DetailField::new("De (From)", from));
    }
    if let Some(subject) = lookup("SubjectContainsWords") {
        conditions.push(DetailField::new("Sujet contient", subject));
    }
    if let Some(body) = lookup("BodyContainsWords") {
        conditions.push(DetailField::new("Corps contient", body));
    }
    if let Some(sent_to) = lookup("SentTo") {
        conditions.push(DetailField::new("Envoyé à", sent_to));
    }

    let mut actions = Vec::new();
    if flag_set("DeleteMessage") {
        actions.push(DetailField::new("Supprimer le message", "Oui"));
    }
    if let Some(folder) = lookup("MoveToFolder") {
        actions.push(DetailField::new("Déplacer vers", folder));
    }
    if flag_set("MarkAsRead") {
        actions.push(DetailField::new("Marquer comme lu", "Oui"));
    }
    if let Some(target) = lookup("ForwardTo") {
        actions.push(DetailField::new("Transférer à", target));
    }
    if let Some(target) = lookup("RedirectTo") {
        actions.push(DetailField::new("Rediriger vers", target));
    }
    if flag_set("StopProcessingRules") {
        actions.push(DetailField::new("Arrêter le traitement des règles", "Oui"));
    }

    RuleView {
        rule_name: lookup("Name").map(ToOwned::to_owned),
        conditions: FieldGroup::new(conditions, NO_CONDITIONS),
        actions: FieldGroup::new(actions, NO_ACTIONS),
    }
}

fn project_update(payload: &Value) -> UpdateView {
    let item = payload.get("Item");

    UpdateView {
        subject: item
            .and_then(|item| str_field(item, "Subject"))
            .map(ToOwned::to_owned),
        folder_path: item
            .and_then(nested_folder_path)
            .map(|path| normalize_folder_path(path.as_str())),
        size_kb: item
            .and_then(|item| u64_field(item, "SizeInBytes"))
            .map(|bytes| ((bytes as f64) / 1024.0).round() as u64),
        modified_properties: payload
            .get("ModifiedProperties")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| match entry.as_str() {
                        Some(name) => modified_property_label(name).to_owned(),
                        None => entry.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn project_mail_access(payload: &Value) -> MailAccessView {
    let access_code = payload
        .get("OperationProperties")
        .and_then(Value::as_array)
        .and_then(|properties| {
            properties
                .iter()
                .find(|property| str_field(property, "Name") == Some("MailAccessType"))
        })
        .and_then(|property| str_field(property, "Value"))
        .unwrap_or("Unknown");

    let all_folders = payload
        .get("Folders")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let folders = all_folders
        .iter()
        .take(MAX_ACCESSED_FOLDERS)
        .map(|folder| {
            let items = folder
                .get("FolderItems")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            AccessedFolder {
                path: str_field(folder, "Path")
                    .map(normalize_folder_path)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
                item_count: items.len(),
                sample_subjects: items
                    .iter()
                    .take(MAX_SAMPLE_SUBJECTS)
                    .map(|item| str_field(item, "Subject").unwrap_or(NO_SUBJECT).to_owned())
                    .collect(),
            }
        })
        .collect();

    let hidden = all_folders.len().saturating_sub(MAX_ACCESSED_FOLDERS);

    MailAccessView {
        access_type: access_type_label(access_code).to_owned(),
        folder_count: all_folders.len(),
        folders,
        overflow_notice: (hidden > 0).then(|| format!("... et {hidden} autres dossiers")),
    }
}

fn project_move(payload: &Value) -> MoveView {
    let affected = payload
        .get("AffectedItems")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let items = affected
        .iter()
        .take(MAX_MOVED_ITEMS)
        .map(|item| MovedItem {
            subject: str_field(item, "Subject").unwrap_or(NO_SUBJECT).to_owned(),
            message_id: str_field(item, "InternetMessageId").map(ToOwned::to_owned),
        })
        .collect();

    let hidden = affected.len().saturating_sub(MAX_MOVED_ITEMS);

    MoveView {
        affected_count: affected.len(),
        source_folder: payload
            .get("Folder")
            .and_then(|folder| str_field(folder, "Path"))
            .map(normalize_folder_path),
        destination_folder: payload
            .get("DestFolder")
            .and_then(|folder| str_field(folder, "Path"))
            .map(normalize_folder_path),
        items,
        overflow_notice: (hidden > 0).then(|| format!("... et {hidden} autres éléments")),
    }
}

fn project_generic(operation: &str, payload: &Value) -> GenericView {
    let item = payload.get("Item");
    let parameters = parameter_map(payload);

    let itemized = if (1..=MAX_ITEMIZED_PARAMETERS).contains(&parameters.len()) {
        parameters
            .iter()
            .map(|(name, value)| DetailField::new(name.as_str(), value.as_str()))
            .collect()
    } else {
        Vec::new()
    };

    GenericView {
        title: operation_label(operation)
            .map_or_else(|| operation.to_owned(), ToOwned::to_owned),
        subject: item
            .and_then(|item| str_field(item, "Subject"))
            .map(ToOwned::to_owned),
        folder_path: item
            .and_then(nested_folder_path)
            .map(|path| normalize_folder_path(path.as_str())),
        parameters: itemized,
    }
}

fn project_folders(payload: &Value) -> FoldersView {
    let folders: Vec<FolderDetail> = payload
        .get("Folders")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|folder| {
            let items: Vec<FolderItemDetail> = folder
                .get("FolderItems")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .map(|item| FolderItemDetail {
                    subject: str_field(item, "Subject").unwrap_or(NOT_AVAILABLE).to_owned(),
                    size: u64_field(item, "SizeInBytes")
                        .map_or_else(|| NOT_AVAILABLE.to_owned(), format_bytes),
                    created: str_field(item, "CreationTime")
                        .and_then(parse_audit_timestamp)
                        .map_or_else(
                            || PLACEHOLDER.to_owned(),
                            |parsed| format_timestamp(Some(&parsed)),
                        ),
                    message_id: str_field(item, "InternetMessageId")
                        .unwrap_or(PLACEHOLDER)
                        .to_owned(),
                })
                .collect();

            FolderDetail {
                path: str_field(folder, "Path").unwrap_or(NOT_AVAILABLE).to_owned(),
                empty_notice: items.is_empty().then(|| NO_FOLDER_ITEMS.to_owned()),
                items,
            }
        })
        .collect();

    FoldersView {
        empty_notice: folders.is_empty().then(|| NO_FOLDERS.to_owned()),
        folders,
    }
}

fn project_items(payload: &Value) -> ItemsView {
    let affected_items: Vec<AffectedItemDetail> = payload
        .get("AffectedItems")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|item| AffectedItemDetail {
            subject: str_field(item, "Subject").unwrap_or(NOT_AVAILABLE).to_owned(),
            parent_folder: nested_folder_path(item)
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            attachments: str_field(item, "Attachments")
                .unwrap_or(NO_ATTACHMENTS)
                .to_owned(),
            message_id: str_field(item, "InternetMessageId")
                .unwrap_or(PLACEHOLDER)
                .to_owned(),
        })
        .collect();

    let item = payload.get("Item").map(|item| ItemDetail {
        subject: str_field(item, "Subject").unwrap_or(NOT_AVAILABLE).to_owned(),
        size: format_bytes(u64_field(item, "SizeInBytes").unwrap_or(0)),
        parent_folder: nested_folder_path(item).unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
        attachments: str_field(item, "Attachments")
            .unwrap_or(NO_ATTACHMENTS)
            .to_owned(),
    });

    ItemsView {
        empty_notice: (affected_items.is_empty() && item.is_none()).then(|| NO_ITEMS.to_owned()),
        affected_items,
        item,
    }
}

/// Flattens the payload's `Parameters` list of `{Name, Value}` pairs,
/// preserving order and skipping malformed entries.
fn parameter_map(payload: &Value) -> Vec<(String, String)> {
    payload
        .get("Parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|parameter| {
            let name = str_field(parameter, "Name")?;
            let value = parameter.get("Value")?;
            let value = match value.as_str() {
                Some(text) => text.to_owned(),
                None => value.to_string(),
            };
            Some((name.to_owned(), value))
        })
        .collect()
}

fn nested_folder_path(item: &Value) -> Option<String> {
    item.get("ParentFolder")
        .and_then(|folder| str_field(folder, "Path"))
        .map(ToOwned::to_owned)
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64)
}

fn display_field(value: &Value, key: &str) -> String {
    str_field(value, key).unwrap_or(PLACEHOLDER).to_owned()
}

fn modified_property_label(name: &str) -> &str {
    match name {
        "RecipientCollection" => "Destinataires",
        "AllAttachmentsHidden" => "Pièces jointes cachées",
        "ItemClass" => "Type d'élément",
        "Subject" => "Sujet",
        "Body" => "Corps du message",
        other => other,
    }
}

fn access_type_label(code: &str) -> &str {
    match code {
        "Bind" => "Consultation",
        "Sync" => "Synchronisation",
        "Search" => "Recherche",
        other => other,
    }
}

fn operation_label(operation: &str) -> Option<&'static str> {
    match operation {
        "Send" => Some("Envoi de Message"),
        "Create" => Some("Création d'Élément"),
        "Copy" => Some("Copie d'Élément"),
        "Move" => Some("Déplacement"),
        "HardDelete" => Some("Suppression Définitive"),
        "SoftDelete" => Some("Suppression Temporaire"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{OperationDetailView, highlight_matches, project};
    use crate::operation::OperationRecord;

    fn record_with(payload: serde_json::Value) -> OperationRecord {
        OperationRecord {
            timestamp: None,
            operation: payload
                .get("Operation")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            subject: None,
            folder: None,
            user: None,
            client_ip: None,
            size: None,
            full_data: Some(payload),
        }
    }

    #[test]
    fn inbox_rule_without_conditions_shows_placeholder() {
        let detail = project(&record_with(json!({
            "Operation": "New-InboxRule",
            "Parameters": [
                {"Name": "Name", "Value": "Archive"},
                {"Name": "MoveToFolder", "Value": "Archive"},
            ],
        })));

        let OperationDetailView::Rule(rule) = detail.operation_view else {
            panic!("expected a rule view");
        };

        assert_eq!(rule.rule_name.as_deref(), Some("Archive"));
        assert!(rule.conditions.fields.is_empty());
        assert_eq!(
            rule.conditions.empty_notice.as_deref(),
            Some("Aucune condition définie")
        );
        assert_eq!(rule.actions.fields.len(), 1);
        assert_eq!(rule.actions.fields[0].label, "Déplacer vers");
        assert_eq!(rule.actions.fields[0].value, "Archive");
        assert!(rule.actions.empty_notice.is_none());
    }

    #[test]
    fn inbox_rule_collects_conditions_and_boolean_actions() {
        let detail = project(&record_with(json!({
            "Operation": "Set-InboxRule",
            "Parameters": [
                {"Name": "From", "Value": "ceo@contoso.com"},
                {"Name": "SubjectContainsWords", "Value": "invoice"},
                {"Name": "DeleteMessage", "Value": "True"},
                {"Name": "MarkAsRead", "Value": "False"},
            ],
        })));

        let OperationDetailView::Rule(rule) = detail.operation_view else {
            panic!("expected a rule view");
        };

        let condition_labels: Vec<&str> = rule
            .conditions
            .fields
            .iter()
            .map(|field| field.label.as_str())
            .collect();
        assert_eq!(condition_labels, vec!["De (From)", "Sujet contient"]);

        // MarkAsRead is only an action when the flag is the string "True".
        let action_labels: Vec<&str> = rule
            .actions
            .fields
            .iter()
            .map(|field| field.label.as_str())
            .collect();
        assert_eq!(action_labels, vec!["Supprimer le message"]);
    }

    #[test]
    fn update_view_normalizes_path_and_rounds_kilobytes() {
        let detail = project(&record_with(json!({
            "Operation": "Update",
            "Item": {
                "Subject": "Quarterly report",
                "ParentFolder": {"Path": "\\Inbox\\Reports"},
                "SizeInBytes": 3100,
            },
            "ModifiedProperties": ["RecipientCollection", "UnknownProp"],
        })));

        let OperationDetailView::Update(update) = detail.operation_view else {
            panic!("expected an update view");
        };

        assert_eq!(update.folder_path.as_deref(), Some("/Inbox/Reports"));
        assert_eq!(update.size_kb, Some(3));
        assert_eq!(
            update.modified_properties,
            vec!["Destinataires".to_owned(), "UnknownProp".to_owned()]
        );
    }

    #[test]
    fn mail_access_caps_folders_and_translates_access_type() {
        let folders: Vec<serde_json::Value> = (0..7)
            .map(|index| {
                json!({
                    "Path": format!("\\Inbox\\F{index}"),
                    "FolderItems": [
                        {"Subject": format!("first {index}")},
                        {"Subject": format!("second {index}")},
                        {"Subject": format!("third {index}")},
                    ],
                })
            })
            .collect();

        let detail = project(&record_with(json!({
            "Operation": "MailItemsAccessed",
            "OperationProperties": [{"Name": "MailAccessType", "Value": "Bind"}],
            "Folders": folders,
        })));

        let OperationDetailView::MailAccess(access) = detail.operation_view else {
            panic!("expected a mail access view");
        };

        assert_eq!(access.access_type, "Consultation");
        assert_eq!(access.folder_count, 7);
        assert_eq!(access.folders.len(), 5);
        assert_eq!(access.folders[0].item_count, 3);
        assert_eq!(access.folders[0].sample_subjects.len(), 2);
        assert_eq!(
            access.overflow_notice.as_deref(),
            Some("... et 2 autres dossiers")
        );
    }

    #[test]
    fn mail_access_without_type_property_reads_unknown() {
        let detail = project(&record_with(json!({
            "Operation": "MailItemsAccessed",
        })));

        let OperationDetailView::MailAccess(access) = detail.operation_view else {
            panic!("expected a mail access view");
        };

        assert_eq!(access.access_type, "Unknown");
        assert_eq!(access.folder_count, 0);
    }

    #[test]
    fn move_view_lists_five_items_with_overflow_note() {
        let affected: Vec<serde_json::Value> = (0..6)
            .map(|index| {
                json!({
                    "Subject": format!("mail {index}"),
                    "InternetMessageId": format!("<{index}@contoso.com>"),
                })
            })
            .collect();

        let detail = project(&record_with(json!({
            "Operation": "MoveToDeletedItems",
            "Folder": {"Path": "\\Inbox"},
            "DestFolder": {"Path": "\\Deleted Items"},
            "AffectedItems": affected,
        })));

        let OperationDetailView::Move(moved) = detail.operation_view else {
            panic!("expected a move view");
        };

        assert_eq!(moved.affected_count, 6);
        assert_eq!(moved.items.len(), 5);
        assert_eq!(moved.source_folder.as_deref(), Some("/Inbox"));
        assert_eq!(moved.destination_folder.as_deref(), Some("/Deleted Items"));
        assert_eq!(
            moved.overflow_notice.as_deref(),
            Some("... et 1 autres éléments")
        );
    }

    #[test]
    fn generic_view_itemizes_small_parameter_lists_only() {
        let small = project(&record_with(json!({
            "Operation": "SendAs",
            "Parameters": [{"Name": "SendAsUser", "Value": "shared@contoso.com"}],
        })));
        let OperationDetailView::Generic(generic) = small.operation_view else {
            panic!("expected a generic view");
        };
        assert_eq!(generic.title, "SendAs");
        assert_eq!(generic.parameters.len(), 1);

        let many: Vec<serde_json::Value> = (0..11)
            .map(|index| json!({"Name": format!("P{index}"), "Value": "x"}))
            .collect();
        let large = project(&record_with(json!({
            "Operation": "Send",
            "Parameters": many,
        })));
        let OperationDetailView::Generic(generic) = large.operation_view else {
            panic!("expected a generic view");
        };
        assert_eq!(generic.title, "Envoi de Message");
        assert!(generic.parameters.is_empty());
    }

    #[test]
    fn info_panel_defaults_every_field_independently() {
        let detail = project(&record_with(json!({
            "Operation": "Update",
            "ClientIPAddress": "10.1.2.3",
        })));

        assert_eq!(detail.info.date, "-");
        assert_eq!(detail.info.operation, "Update");
        assert_eq!(detail.info.user, "-");
        assert_eq!(detail.info.result_status, "-");
        assert_eq!(detail.info.workload, "-");
        assert_eq!(detail.info.client_ip, "10.1.2.3");
        assert_eq!(detail.info.client_info, "-");
    }

    #[test]
    fn empty_payload_never_panics_and_keeps_sections() {
        let detail = project(&record_with(json!({})));

        assert_eq!(detail.info.operation, "-");
        assert_eq!(
            detail.folders.empty_notice.as_deref(),
            Some("Aucun dossier dans ce log")
        );
        assert_eq!(
            detail.items.empty_notice.as_deref(),
            Some("Aucun élément pour ce log")
        );
    }

    #[test]
    fn record_without_payload_projects_its_summary_fields() {
        let record = OperationRecord {
            timestamp: None,
            operation: "SendAs".to_owned(),
            subject: Some("hello".to_owned()),
            folder: None,
            user: Some("alice".to_owned()),
            client_ip: None,
            size: None,
            full_data: None,
        };

        let detail = project(&record);
        assert!(detail.raw_json.contains("SendAs"));
        assert!(matches!(
            detail.operation_view,
            OperationDetailView::Generic(_)
        ));
    }

    #[test]
    fn search_highlights_case_insensitive_matches() {
        let segments = highlight_matches("{\"Action\": \"DeleteMessage\"}", "delete");

        let marked: Vec<&str> = segments
            .iter()
            .filter(|segment| segment.highlighted)
            .map(|segment| segment.text.as_str())
            .collect();
        assert_eq!(marked, vec!["Delete"]);

        let rebuilt: String = segments.iter().map(|segment| segment.text.as_str()).collect();
        assert_eq!(rebuilt, "{\"Action\": \"DeleteMessage\"}");
    }

    #[test]
    fn clearing_the_query_restores_unmodified_text() {
        let segments = highlight_matches("plain text", "");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].highlighted);
        assert_eq!(segments[0].text, "plain text");
    }

    #[test]
    fn search_handles_multibyte_text_without_panicking() {
        let text = "{\"Sujet\": \"réunion détaillée\"}";
        let segments = highlight_matches(text, "d");

        let rebuilt: String = segments.iter().map(|segment| segment.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        assert!(segments.iter().any(|segment| segment.highlighted));
    }
}
