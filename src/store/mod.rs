// In-memory repository for the knowledge-transfer data model.
//
// A cloneable handle over a single RwLock'd table set. Identifiers come from
// an explicit per-entity sequence, so ascending BTreeMap order is insertion
// order (the dependency truncation in the context builder and message display
// order both rely on this). Each method takes the lock once; there are no
// cross-call transactions, and concurrent writers interleave last-write-wins.

pub mod seed;

use crate::schema::{
    ArchitectureNode, CodeFlow, CodeModule, Component, Conversation, Dependency, FileTreeNode,
    Message, NewCodeModule, NewComponent, NewConversation, NewDependency, NewMessage, NewProject,
    NewProjectMetrics, NewRoute, NewService, Project, ProjectMetrics, Route, Service,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Monotonic id allocator for one entity type. Starts at 1.
#[derive(Debug)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Sequence(1)
    }
}

#[derive(Default)]
struct Tables {
    projects: BTreeMap<i64, Project>,
    metrics: BTreeMap<i64, ProjectMetrics>,
    components: BTreeMap<i64, Component>,
    services: BTreeMap<i64, Service>,
    routes: BTreeMap<i64, Route>,
    modules: BTreeMap<i64, CodeModule>,
    dependencies: BTreeMap<i64, Dependency>,
    conversations: BTreeMap<i64, Conversation>,
    messages: BTreeMap<i64, Message>,
    project_seq: Sequence,
    metrics_seq: Sequence,
    component_seq: Sequence,
    service_seq: Sequence,
    route_seq: Sequence,
    module_seq: Sequence,
    dependency_seq: Sequence,
    conversation_seq: Sequence,
    message_seq: Sequence,
    /// The single active project, repointed by `create_project`.
    current_project: Option<i64>,
}

/// Thread-safe in-memory store shared across request handlers.
#[derive(Clone)]
pub struct MemStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }

    // Projects

    pub async fn project(&self, id: i64) -> Option<Project> {
        self.tables.read().await.projects.get(&id).cloned()
    }

    /// The active project: the one under the current pointer, else the first
    /// ever created. `None` only when the store holds no projects at all.
    pub async fn current_project(&self) -> Option<Project> {
        let tables = self.tables.read().await;
        match tables.current_project {
            Some(id) => tables.projects.get(&id).cloned(),
            None => tables.projects.values().next().cloned(),
        }
    }

    /// Create a project and repoint the current-project pointer at it.
    pub async fn create_project(&self, new: NewProject) -> Project {
        let mut tables = self.tables.write().await;
        let id = tables.project_seq.next();
        let project = Project {
            id,
            name: new.name,
            root_path: new.root_path,
            framework: new.framework,
            language: new.language,
            build_tool: new.build_tool,
            status: new.status,
            last_scanned: None,
            created_at: Utc::now(),
        };
        tables.projects.insert(id, project.clone());
        tables.current_project = Some(id);
        project
    }

    /// Apply a partial update in place; last writer wins.
    pub async fn update_project(
        &self,
        id: i64,
        apply: impl FnOnce(&mut Project),
    ) -> Option<Project> {
        let mut tables = self.tables.write().await;
        let project = tables.projects.get_mut(&id)?;
        apply(project);
        Some(project.clone())
    }

    // Metrics

    pub async fn project_metrics(&self, project_id: i64) -> Option<ProjectMetrics> {
        self.tables
            .read()
            .await
            .metrics
            .values()
            .find(|m| m.project_id == project_id)
            .cloned()
    }

    pub async fn create_project_metrics(&self, new: NewProjectMetrics) -> ProjectMetrics {
        let mut tables = self.tables.write().await;
        let id = tables.metrics_seq.next();
        let metrics = ProjectMetrics {
            id,
            project_id: new.project_id,
            total_files: new.total_files,
            total_lines: new.total_lines,
            total_components: new.total_components,
            total_services: new.total_services,
            total_directives: new.total_directives,
            total_pipes: new.total_pipes,
            total_modules: new.total_modules,
            total_routes: new.total_routes,
            updated_at: Utc::now(),
        };
        tables.metrics.insert(id, metrics.clone());
        metrics
    }

    // Components

    pub async fn components(&self, project_id: i64) -> Vec<Component> {
        self.tables
            .read()
            .await
            .components
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn create_component(&self, new: NewComponent) -> Component {
        let mut tables = self.tables.write().await;
        let id = tables.component_seq.next();
        let component = Component {
            id,
            project_id: new.project_id,
            name: new.name,
            kind: new.kind,
            file_path: new.file_path,
            module_id: new.module_id,
            props: new.props,
            state: new.state,
            description: new.description,
        };
        tables.components.insert(id, component.clone());
        component
    }

    // Services

    pub async fn services(&self, project_id: i64) -> Vec<Service> {
        self.tables
            .read()
            .await
            .services
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn create_service(&self, new: NewService) -> Service {
        let mut tables = self.tables.write().await;
        let id = tables.service_seq.next();
        let service = Service {
            id,
            project_id: new.project_id,
            name: new.name,
            file_path: new.file_path,
            methods: new.methods,
            dependencies: new.dependencies,
            description: new.description,
        };
        tables.services.insert(id, service.clone());
        service
    }

    // Routes

    pub async fn routes(&self, project_id: i64) -> Vec<Route> {
        self.tables
            .read()
            .await
            .routes
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn create_route(&self, new: NewRoute) -> Route {
        let mut tables = self.tables.write().await;
        let id = tables.route_seq.next();
        let route = Route {
            id,
            project_id: new.project_id,
            path: new.path,
            component_name: new.component_name,
            file_path: new.file_path,
            guards: new.guards,
            children: new.children,
        };
        tables.routes.insert(id, route.clone());
        route
    }

    // Modules

    pub async fn modules(&self, project_id: i64) -> Vec<CodeModule> {
        self.tables
            .read()
            .await
            .modules
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn create_module(&self, new: NewCodeModule) -> CodeModule {
        let mut tables = self.tables.write().await;
        let id = tables.module_seq.next();
        let module = CodeModule {
            id,
            project_id: new.project_id,
            name: new.name,
            kind: new.kind,
            file_path: new.file_path,
            description: new.description,
            dependencies: new.dependencies,
            exports: new.exports,
            lines_of_code: new.lines_of_code,
        };
        tables.modules.insert(id, module.clone());
        module
    }

    // Dependencies

    pub async fn dependencies(&self, project_id: i64) -> Vec<Dependency> {
        self.tables
            .read()
            .await
            .dependencies
            .values()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect()
    }

    pub async fn create_dependency(&self, new: NewDependency) -> Dependency {
        let mut tables = self.tables.write().await;
        let id = tables.dependency_seq.next();
        let dependency = Dependency {
            id,
            project_id: new.project_id,
            name: new.name,
            version: new.version,
            kind: new.kind,
            category: new.category,
        };
        tables.dependencies.insert(id, dependency.clone());
        dependency
    }

    // Conversations

    /// All conversations, newest first. Id breaks same-timestamp ties so the
    /// ordering stays deterministic.
    pub async fn conversations(&self) -> Vec<Conversation> {
        let tables = self.tables.read().await;
        let mut list: Vec<Conversation> = tables.conversations.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list
    }

    pub async fn conversation(&self, id: i64) -> Option<Conversation> {
        self.tables.read().await.conversations.get(&id).cloned()
    }

    pub async fn create_conversation(&self, new: NewConversation) -> Conversation {
        let mut tables = self.tables.write().await;
        let id = tables.conversation_seq.next();
        let conversation = Conversation {
            id,
            project_id: new.project_id,
            title: new.title,
            created_at: Utc::now(),
        };
        tables.conversations.insert(id, conversation.clone());
        conversation
    }

    /// Delete a conversation and cascade-delete its messages. Unknown ids are
    /// a no-op.
    pub async fn delete_conversation(&self, id: i64) {
        let mut tables = self.tables.write().await;
        tables.conversations.remove(&id);
        tables.messages.retain(|_, m| m.conversation_id != id);
    }

    // Messages

    /// Messages for a conversation in insertion order.
    pub async fn messages(&self, conversation_id: i64) -> Vec<Message> {
        self.tables
            .read()
            .await
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    /// Append a message. The conversation id is not validated (no referential
    /// integrity beyond the stored value).
    pub async fn create_message(&self, new: NewMessage) -> Message {
        let mut tables = self.tables.write().await;
        let id = tables.message_seq.next();
        let message = Message {
            id,
            conversation_id: new.conversation_id,
            role: new.role,
            content: new.content,
            image_url: new.image_url,
            file_references: new.file_references,
            created_at: Utc::now(),
        };
        tables.messages.insert(id, message.clone());
        message
    }

    // Derived views

    /// Architecture graph derived from routes, components and services under
    /// a root app-module node.
    pub async fn architecture_nodes(&self, project_id: i64) -> Vec<ArchitectureNode> {
        let tables = self.tables.read().await;
        let mut nodes = vec![ArchitectureNode {
            id: "module-app".to_string(),
            label: "App Module".to_string(),
            kind: "module".to_string(),
            file_path: Some("src/App.tsx".to_string()),
            children: None,
        }];
        for route in tables.routes.values().filter(|r| r.project_id == project_id) {
            nodes.push(ArchitectureNode {
                id: format!("page-{}", route.id),
                label: route
                    .component_name
                    .clone()
                    .unwrap_or_else(|| route.path.clone()),
                kind: "page".to_string(),
                file_path: route.file_path.clone(),
                children: None,
            });
        }
        for component in tables
            .components
            .values()
            .filter(|c| c.project_id == project_id)
        {
            nodes.push(ArchitectureNode {
                id: format!("component-{}", component.id),
                label: component.name.clone(),
                kind: "component".to_string(),
                file_path: Some(component.file_path.clone()),
                children: None,
            });
        }
        for service in tables
            .services
            .values()
            .filter(|s| s.project_id == project_id)
        {
            nodes.push(ArchitectureNode {
                id: format!("service-{}", service.id),
                label: service.name.clone(),
                kind: "service".to_string(),
                file_path: Some(service.file_path.clone()),
                children: None,
            });
        }
        nodes
    }

    /// Code flows are fixed demo data until real analysis exists.
    pub async fn code_flows(&self, _project_id: i64) -> Vec<CodeFlow> {
        seed::demo_code_flows()
    }

    /// File tree is fixed demo data until real analysis exists.
    pub async fn file_tree(&self, _project_id: i64) -> Vec<FileTreeNode> {
        seed::demo_file_tree()
    }

    /// Demo file contents with a generic placeholder for unknown paths.
    pub async fn file_content(&self, path: &str) -> String {
        seed::demo_file_content(path)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MessageRole, ScanStatus};

    fn new_project(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            root_path: "./src".to_string(),
            framework: None,
            language: None,
            build_tool: None,
            status: ScanStatus::Pending,
        }
    }

    fn new_message(conversation_id: i64, role: MessageRole, content: &str) -> NewMessage {
        NewMessage {
            conversation_id,
            role,
            content: content.to_string(),
            image_url: None,
            file_references: vec![],
        }
    }

    #[tokio::test]
    async fn test_sequences_are_per_entity() {
        let store = MemStore::new();
        let project = store.create_project(new_project("a")).await;
        let conversation = store
            .create_conversation(NewConversation {
                project_id: None,
                title: "New Chat".to_string(),
            })
            .await;
        // Each entity type allocates from its own sequence starting at 1.
        assert_eq!(project.id, 1);
        assert_eq!(conversation.id, 1);

        let second = store
            .create_conversation(NewConversation {
                project_id: None,
                title: "New Chat".to_string(),
            })
            .await;
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_create_project_repoints_current() {
        let store = MemStore::new();
        store.create_project(new_project("first")).await;
        let second = store.create_project(new_project("second")).await;
        let current = store.current_project().await.unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.name, "second");
    }

    #[tokio::test]
    async fn test_update_project_is_partial() {
        let store = MemStore::new();
        let project = store.create_project(new_project("app")).await;
        let updated = store
            .update_project(project.id, |p| p.status = ScanStatus::Scanning)
            .await
            .unwrap();
        assert_eq!(updated.status, ScanStatus::Scanning);
        assert_eq!(updated.name, "app");
        assert!(store.update_project(999, |_| {}).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_conversation_cascades_messages() {
        let store = MemStore::new();
        let kept = store
            .create_conversation(NewConversation {
                project_id: None,
                title: "kept".to_string(),
            })
            .await;
        let doomed = store
            .create_conversation(NewConversation {
                project_id: None,
                title: "doomed".to_string(),
            })
            .await;
        store
            .create_message(new_message(doomed.id, MessageRole::User, "hello"))
            .await;
        store
            .create_message(new_message(doomed.id, MessageRole::Assistant, "hi"))
            .await;
        store
            .create_message(new_message(kept.id, MessageRole::User, "other thread"))
            .await;

        store.delete_conversation(doomed.id).await;

        assert!(store.conversation(doomed.id).await.is_none());
        assert!(store.messages(doomed.id).await.is_empty());
        assert_eq!(store.messages(kept.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_conversations_list_newest_first() {
        let store = MemStore::new();
        for title in ["one", "two", "three"] {
            store
                .create_conversation(NewConversation {
                    project_id: None,
                    title: title.to_string(),
                })
                .await;
        }
        let list = store.conversations().await;
        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_messages_in_insertion_order() {
        let store = MemStore::new();
        let conversation = store
            .create_conversation(NewConversation {
                project_id: None,
                title: "chat".to_string(),
            })
            .await;
        store
            .create_message(new_message(conversation.id, MessageRole::User, "first"))
            .await;
        store
            .create_message(new_message(conversation.id, MessageRole::Assistant, "second"))
            .await;
        let messages = store.messages(conversation.id).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].content, "second");
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_modules_store_and_component_link() {
        let store = MemStore::new();
        let project = store.create_project(new_project("app")).await;
        let module = store
            .create_module(NewCodeModule {
                project_id: project.id,
                name: "auth".to_string(),
                kind: "feature".to_string(),
                file_path: "src/features/auth".to_string(),
                description: None,
                dependencies: vec!["core".to_string()],
                exports: vec!["login".to_string()],
                lines_of_code: 240,
            })
            .await;
        assert_eq!(module.id, 1);

        store
            .create_component(NewComponent {
                project_id: project.id,
                name: "LoginForm".to_string(),
                kind: "ui".to_string(),
                file_path: "src/features/auth/LoginForm.tsx".to_string(),
                module_id: Some(module.id),
                props: vec![],
                state: vec![],
                description: None,
            })
            .await;

        let modules = store.modules(project.id).await;
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "auth");
        // The link is a plain value; nothing validates it.
        assert_eq!(store.components(project.id).await[0].module_id, Some(module.id));
        assert!(store.modules(project.id + 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_scoped_by_project() {
        let store = MemStore::new();
        let first = store.create_project(new_project("first")).await;
        let second = store.create_project(new_project("second")).await;
        store
            .create_dependency(NewDependency {
                project_id: first.id,
                name: "react".to_string(),
                version: Some("18.3.0".to_string()),
                kind: "production".to_string(),
                category: None,
            })
            .await;
        assert_eq!(store.dependencies(first.id).await.len(), 1);
        assert!(store.dependencies(second.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_architecture_nodes_derivation() {
        let store = MemStore::new();
        let project = seed::load_demo_project(&store).await;
        let nodes = store.architecture_nodes(project.id).await;
        // Root module + 6 routes + 8 components + 4 services.
        assert_eq!(nodes.len(), 19);
        assert_eq!(nodes[0].id, "module-app");
        assert!(nodes.iter().any(|n| n.id == "page-1" && n.kind == "page"));
        assert!(nodes
            .iter()
            .any(|n| n.kind == "component" && n.label == "AppSidebar"));
        assert!(nodes
            .iter()
            .any(|n| n.kind == "service" && n.label == "AuthService"));
    }
}
