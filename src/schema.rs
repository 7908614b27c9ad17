// Data model for the knowledge-transfer store.
//
// Records serialize with camelCase field names because the dashboard client
// consumes them directly as JSON. Nullable record fields serialize as null;
// optional fields on the derived view types are omitted entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scan lifecycle of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Pending,
    Scanning,
    Completed,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::Scanning => write!(f, "scanning"),
            ScanStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A codebase being described by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub root_path: String,
    pub framework: Option<String>,
    pub language: Option<String>,
    pub build_tool: Option<String>,
    pub status: ScanStatus,
    pub last_scanned: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub root_path: String,
    pub framework: Option<String>,
    pub language: Option<String>,
    pub build_tool: Option<String>,
    pub status: ScanStatus,
}

/// Aggregate counts for a project, one-to-one with `Project`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub id: i64,
    pub project_id: i64,
    pub total_files: i64,
    pub total_lines: i64,
    pub total_components: i64,
    pub total_services: i64,
    pub total_directives: i64,
    pub total_pipes: i64,
    pub total_modules: i64,
    pub total_routes: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProjectMetrics {
    pub project_id: i64,
    pub total_files: i64,
    pub total_lines: i64,
    pub total_components: i64,
    pub total_services: i64,
    pub total_directives: i64,
    pub total_pipes: i64,
    pub total_modules: i64,
    pub total_routes: i64,
}

/// A UI component record (layout, page, ui, visualization, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file_path: String,
    pub module_id: Option<i64>,
    pub props: Vec<String>,
    pub state: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComponent {
    pub project_id: i64,
    pub name: String,
    pub kind: String,
    pub file_path: String,
    pub module_id: Option<i64>,
    pub props: Vec<String>,
    pub state: Vec<String>,
    pub description: Option<String>,
}

/// A service/business-logic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub file_path: String,
    pub methods: Vec<String>,
    pub dependencies: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub project_id: i64,
    pub name: String,
    pub file_path: String,
    pub methods: Vec<String>,
    pub dependencies: Vec<String>,
    pub description: Option<String>,
}

/// A client-side route record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i64,
    pub project_id: i64,
    pub path: String,
    pub component_name: Option<String>,
    pub file_path: Option<String>,
    pub guards: Vec<String>,
    pub children: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewRoute {
    pub project_id: i64,
    pub path: String,
    pub component_name: Option<String>,
    pub file_path: Option<String>,
    pub guards: Vec<String>,
    pub children: Vec<String>,
}

/// A package dependency record (`production` or `development`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDependency {
    pub project_id: i64,
    pub name: String,
    pub version: Option<String>,
    pub kind: String,
    pub category: Option<String>,
}

/// A source module record grouping related files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeModule {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file_path: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub exports: Vec<String>,
    pub lines_of_code: i64,
}

#[derive(Debug, Clone)]
pub struct NewCodeModule {
    pub project_id: i64,
    pub name: String,
    pub kind: String,
    pub file_path: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub exports: Vec<String>,
    pub lines_of_code: i64,
}

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A chat thread. Owns an ordered sequence of `Message`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub project_id: Option<i64>,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub project_id: Option<i64>,
    pub title: String,
}

/// One turn in a conversation. Insertion order defines display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub image_url: Option<String>,
    /// File paths extracted from markdown links in the assistant response.
    pub file_references: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub image_url: Option<String>,
    pub file_references: Vec<String>,
}

/// Derived graph node for the architecture view. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ArchitectureNode>>,
}

/// A named, ordered sequence of steps describing a feature's execution path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFlow {
    pub id: String,
    pub name: String,
    pub steps: Vec<FlowStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

/// Node in the demo file-tree view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
