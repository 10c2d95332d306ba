use mailtrail_application::DetailProjection;
use mailtrail_domain::{
    AccessedFolder, AffectedItemDetail, DetailField, FieldGroup, FolderDetail, FolderItemDetail,
    FoldersView, GenericView, InfoPanel, ItemDetail, ItemsView, LogDetail, MailAccessView,
    MoveView, MovedItem, OperationDetailView, RawSegment, RuleView, UpdateView,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Detail request carrying the raw-JSON search query.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/detail-request.ts"
)]
pub struct DetailRequest {
    /// Case-insensitive substring to highlight in the raw JSON.
    #[serde(default)]
    pub highlight: Option<String>,
}

/// One labelled display line.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/detail-field.ts"
)]
pub struct DetailFieldResponse {
    pub label: String,
    pub value: String,
}

impl From<DetailField> for DetailFieldResponse {
    fn from(field: DetailField) -> Self {
        Self {
            label: field.label,
            value: field.value,
        }
    }
}

/// A group of lines with its localized empty notice.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-group.ts"
)]
pub struct FieldGroupResponse {
    pub fields: Vec<DetailFieldResponse>,
    pub empty_notice: Option<String>,
}

impl From<FieldGroup> for FieldGroupResponse {
    fn from(group: FieldGroup) -> Self {
        Self {
            fields: group.fields.into_iter().map(Into::into).collect(),
            empty_notice: group.empty_notice,
        }
    }
}

/// Always-rendered header panel.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/info-panel.ts"
)]
pub struct InfoPanelResponse {
    pub date: String,
    pub operation: String,
    pub user: String,
    pub result_status: String,
    pub workload: String,
    pub client_ip: String,
    pub client_info: String,
}

impl From<InfoPanel> for InfoPanelResponse {
    fn from(info: InfoPanel) -> Self {
        Self {
            date: info.date,
            operation: info.operation,
            user: info.user,
            result_status: info.result_status,
            workload: info.workload,
            client_ip: info.client_ip,
            client_info: info.client_info,
        }
    }
}

/// Operation-kind-dependent breakdown.
#[derive(Debug, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/operation-detail-view.ts"
)]
pub enum OperationDetailViewResponse {
    Rule {
        rule_name: Option<String>,
        conditions: FieldGroupResponse,
        actions: FieldGroupResponse,
    },
    Update {
        subject: Option<String>,
        folder_path: Option<String>,
        size_kb: Option<u64>,
        modified_properties: Vec<String>,
    },
    MailAccess {
        access_type: String,
        folder_count: usize,
        folders: Vec<AccessedFolderResponse>,
        overflow_notice: Option<String>,
    },
    Move {
        affected_count: usize,
        source_folder: Option<String>,
        destination_folder: Option<String>,
        items: Vec<MovedItemResponse>,
        overflow_notice: Option<String>,
    },
    Generic {
        title: String,
        subject: Option<String>,
        folder_path: Option<String>,
        parameters: Vec<DetailFieldResponse>,
    },
}

impl From<OperationDetailView> for OperationDetailViewResponse {
    fn from(view: OperationDetailView) -> Self {
        match view {
            OperationDetailView::Rule(RuleView {
                rule_name,
                conditions,
                actions,
            }) => Self::Rule {
                rule_name,
                conditions: conditions.into(),
                actions: actions.into(),
            },
            OperationDetailView::Update(UpdateView {
                subject,
                folder_path,
                size_kb,
                modified_properties,
            }) => Self::Update {
                subject,
                folder_path,
                size_kb,
                modified_properties,
            },
            OperationDetailView::MailAccess(MailAccessView {
                access_type,
                folder_count,
                folders,
                overflow_notice,
            }) => Self::MailAccess {
                access_type,
                folder_count,
                folders: folders.into_iter().map(Into::into).collect(),
                overflow_notice,
            },
            OperationDetailView::Move(MoveView {
                affected_count,
                source_folder,
                destination_folder,
                items,
                overflow_notice,
            }) => Self::Move {
                affected_count,
                source_folder,
                destination_folder,
                items: items.into_iter().map(Into::into).collect(),
                overflow_notice,
            },
            OperationDetailView::Generic(GenericView {
                title,
                subject,
                folder_path,
                parameters,
            }) => Self::Generic {
                title,
                subject,
                folder_path,
                parameters: parameters.into_iter().map(Into::into).collect(),
            },
        }
    }
}

/// One folder of the mail-access breakdown.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/accessed-folder.ts"
)]
pub struct AccessedFolderResponse {
    pub path: String,
    pub item_count: usize,
    pub sample_subjects: Vec<String>,
}

impl From<AccessedFolder> for AccessedFolderResponse {
    fn from(folder: AccessedFolder) -> Self {
        Self {
            path: folder.path,
            item_count: folder.item_count,
            sample_subjects: folder.sample_subjects,
        }
    }
}

/// One item of the move/delete breakdown.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/moved-item.ts"
)]
pub struct MovedItemResponse {
    pub subject: String,
    pub message_id: Option<String>,
}

impl From<MovedItem> for MovedItemResponse {
    fn from(item: MovedItem) -> Self {
        Self {
            subject: item.subject,
            message_id: item.message_id,
        }
    }
}

/// One item of the folders view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/folder-item.ts"
)]
pub struct FolderItemResponse {
    pub subject: String,
    pub size: String,
    pub created: String,
    pub message_id: String,
}

impl From<FolderItemDetail> for FolderItemResponse {
    fn from(item: FolderItemDetail) -> Self {
        Self {
            subject: item.subject,
            size: item.size,
            created: item.created,
            message_id: item.message_id,
        }
    }
}

/// One folder of the folders view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/folder-detail.ts"
)]
pub struct FolderDetailResponse {
    pub path: String,
    pub items: Vec<FolderItemResponse>,
    pub empty_notice: Option<String>,
}

impl From<FolderDetail> for FolderDetailResponse {
    fn from(folder: FolderDetail) -> Self {
        Self {
            path: folder.path,
            items: folder.items.into_iter().map(Into::into).collect(),
            empty_notice: folder.empty_notice,
        }
    }
}

/// Folders view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/folders-view.ts"
)]
pub struct FoldersViewResponse {
    pub folders: Vec<FolderDetailResponse>,
    pub empty_notice: Option<String>,
}

impl From<FoldersView> for FoldersViewResponse {
    fn from(view: FoldersView) -> Self {
        Self {
            folders: view.folders.into_iter().map(Into::into).collect(),
            empty_notice: view.empty_notice,
        }
    }
}

/// One affected item of the items view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/affected-item.ts"
)]
pub struct AffectedItemResponse {
    pub subject: String,
    pub parent_folder: String,
    pub attachments: String,
    pub message_id: String,
}

impl From<AffectedItemDetail> for AffectedItemResponse {
    fn from(item: AffectedItemDetail) -> Self {
        Self {
            subject: item.subject,
            parent_folder: item.parent_folder,
            attachments: item.attachments,
            message_id: item.message_id,
        }
    }
}

/// The single item of the items view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/item-detail.ts"
)]
pub struct ItemDetailResponse {
    pub subject: String,
    pub size: String,
    pub parent_folder: String,
    pub attachments: String,
}

impl From<ItemDetail> for ItemDetailResponse {
    fn from(item: ItemDetail) -> Self {
        Self {
            subject: item.subject,
            size: item.size,
            parent_folder: item.parent_folder,
            attachments: item.attachments,
        }
    }
}

/// Items view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/items-view.ts"
)]
pub struct ItemsViewResponse {
    pub affected_items: Vec<AffectedItemResponse>,
    pub item: Option<ItemDetailResponse>,
    pub empty_notice: Option<String>,
}

impl From<ItemsView> for ItemsViewResponse {
    fn from(view: ItemsView) -> Self {
        Self {
            affected_items: view.affected_items.into_iter().map(Into::into).collect(),
            item: view.item.map(Into::into),
            empty_notice: view.empty_notice,
        }
    }
}

/// One raw-JSON text run.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/raw-segment.ts"
)]
pub struct RawSegmentResponse {
    pub text: String,
    pub highlighted: bool,
}

impl From<RawSegment> for RawSegmentResponse {
    fn from(segment: RawSegment) -> Self {
        Self {
            text: segment.text,
            highlighted: segment.highlighted,
        }
    }
}

/// Complete detail projection of one record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/log-detail-response.ts"
)]
pub struct LogDetailResponse {
    pub info: InfoPanelResponse,
    pub operation_view: OperationDetailViewResponse,
    pub folders: FoldersViewResponse,
    pub items: ItemsViewResponse,
    pub raw_json: String,
}

impl From<LogDetail> for LogDetailResponse {
    fn from(detail: LogDetail) -> Self {
        Self {
            info: detail.info.into(),
            operation_view: detail.operation_view.into(),
            folders: detail.folders.into(),
            items: detail.items.into(),
            raw_json: detail.raw_json,
        }
    }
}

/// Detail endpoint payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/detail-response.ts"
)]
pub struct DetailResponse {
    pub detail: LogDetailResponse,
    pub highlighted: Option<Vec<RawSegmentResponse>>,
}

impl From<DetailProjection> for DetailResponse {
    fn from(projection: DetailProjection) -> Self {
        Self {
            detail: projection.detail.into(),
            highlighted: projection
                .highlighted
                .map(|segments| segments.into_iter().map(Into::into).collect()),
        }
    }
}
