// Project context builder: one text block summarizing everything the
// store knows about a project, used as the grounding section of the
// system prompt.

use crate::schema::Component;
use crate::store::MemStore;

/// Group components by their `type` field, preserving first-seen type order.
pub(super) fn group_components_by_type(components: &[Component]) -> Vec<(&str, Vec<&Component>)> {
    let mut groups: Vec<(&str, Vec<&Component>)> = Vec::new();
    for component in components {
        match groups
            .iter_mut()
            .find(|(kind, _)| *kind == component.kind.as_str())
        {
            Some((_, members)) => members.push(component),
            None => groups.push((component.kind.as_str(), vec![component])),
        }
    }
    groups
}

/// First non-empty choice. Empty strings count as missing.
pub(super) fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

pub(super) fn block_or(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// Build the project context block.
///
/// The fetches are independent reads; a write landing between them can
/// produce a mixed snapshot, which is accepted. Empty collections render
/// placeholder lines, a missing project renders the demo identity, and
/// the dependency list is truncated to the first 10 entries in storage
/// order. Never fails.
pub async fn build_project_context(store: &MemStore, project_id: i64) -> String {
    let project = store.project(project_id).await;
    let components = store.components(project_id).await;
    let services = store.services(project_id).await;
    let routes = store.routes(project_id).await;
    let flows = store.code_flows(project_id).await;
    let dependencies = store.dependencies(project_id).await;
    let metrics = store.project_metrics(project_id).await;

    let name = text_or(project.as_ref().map(|p| p.name.as_str()), "Demo Frontend App");
    let framework = text_or(project.as_ref().and_then(|p| p.framework.as_deref()), "React");
    let language = text_or(
        project.as_ref().and_then(|p| p.language.as_deref()),
        "TypeScript",
    );
    let build_tool = text_or(project.as_ref().and_then(|p| p.build_tool.as_deref()), "Vite");
    let status = project
        .as_ref()
        .map(|p| p.status.to_string())
        .unwrap_or_else(|| "completed".to_string());

    let total_files = metrics.as_ref().map(|m| m.total_files).unwrap_or(0);
    let total_lines = metrics.as_ref().map(|m| m.total_lines).unwrap_or(0);
    // Zero counts fall through to the live collection sizes, so a project
    // configured with blank metrics still reports what the store holds.
    let total_components = metrics
        .as_ref()
        .map(|m| m.total_components)
        .filter(|n| *n != 0)
        .unwrap_or(components.len() as i64);
    let total_services = metrics
        .as_ref()
        .map(|m| m.total_services)
        .filter(|n| *n != 0)
        .unwrap_or(services.len() as i64);
    let total_routes = metrics
        .as_ref()
        .map(|m| m.total_routes)
        .filter(|n| *n != 0)
        .unwrap_or(routes.len() as i64);

    let component_summary = group_components_by_type(&components)
        .iter()
        .map(|(kind, members)| {
            let listing = members
                .iter()
                .map(|c| format!("{} ({})", c.name, c.file_path))
                .collect::<Vec<_>>()
                .join(", ");
            format!("  {kind}: {listing}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let component_details = components
        .iter()
        .map(|c| {
            format!(
                "- {}: {} at [{}]",
                c.name,
                text_or(c.description.as_deref(), &c.kind),
                c.file_path
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let service_details = services
        .iter()
        .map(|s| {
            format!(
                "- {}: {} at [{}]\n  Methods: {}\n  Dependencies: {}",
                s.name,
                text_or(s.description.as_deref(), "Service"),
                s.file_path,
                block_or(s.methods.join(", "), "N/A"),
                block_or(s.dependencies.join(", "), "None"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let route_lines = routes
        .iter()
        .map(|r| {
            format!(
                "- {} -> {} [{}]",
                r.path,
                text_or(r.component_name.as_deref(), "Unknown"),
                text_or(r.file_path.as_deref(), "unknown"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let flow_lines = flows
        .iter()
        .map(|f| {
            let steps = f
                .steps
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            format!("- {}: {}", f.name, steps)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let dependency_lines = dependencies
        .iter()
        .take(10)
        .map(|d| {
            format!(
                "- {}@{} ({})",
                d.name,
                text_or(d.version.as_deref(), "unknown"),
                d.kind
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "
PROJECT: {name}
FRAMEWORK: {framework} with {language}
BUILD TOOL: {build_tool}
STATUS: {status}

METRICS:
- Total Files: {total_files}
- Total Lines: {total_lines}
- Components: {total_components}
- Services: {total_services}
- Routes: {total_routes}

COMPONENTS BY TYPE:
{component_summary}

DETAILED COMPONENTS:
{component_details}

SERVICES:
{service_details}

ROUTES:
{route_lines}

WORKFLOWS/CODE FLOWS:
{flow_lines}

DEPENDENCIES:
{dependency_lines}
",
        component_summary = block_or(component_summary, "No components found"),
        component_details = block_or(component_details, "None"),
        service_details = block_or(service_details, "None"),
        route_lines = block_or(route_lines, "None"),
        flow_lines = block_or(flow_lines, "None"),
        dependency_lines = block_or(dependency_lines, "None"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NewComponent, NewDependency, NewProject, NewProjectMetrics, ScanStatus};
    use crate::store::seed;

    fn demo_component(project_id: i64, name: &str, kind: &str) -> NewComponent {
        NewComponent {
            project_id,
            name: name.to_string(),
            kind: kind.to_string(),
            file_path: format!("src/components/{name}.tsx"),
            module_id: None,
            props: vec![],
            state: vec![],
            description: None,
        }
    }

    #[tokio::test]
    async fn test_context_contains_seeded_project_sections() {
        let store = MemStore::new();
        let project = seed::load_demo_project(&store).await;

        let context = build_project_context(&store, project.id).await;
        assert!(context.contains("PROJECT: Demo Frontend App"));
        assert!(context.contains("FRAMEWORK: React with TypeScript"));
        assert!(context.contains("BUILD TOOL: Vite"));
        assert!(context.contains("- Total Files: 45"));
        assert!(context.contains("COMPONENTS BY TYPE:"));
        assert!(context.contains("- / -> Dashboard [src/pages/Dashboard.tsx]"));
        assert!(context.contains("- User Login Flow:"));
    }

    #[tokio::test]
    async fn test_dependency_list_never_exceeds_ten_entries() {
        let store = MemStore::new();
        let project = store
            .create_project(NewProject {
                name: "Big".to_string(),
                root_path: "./src".to_string(),
                framework: None,
                language: None,
                build_tool: None,
                status: ScanStatus::Completed,
            })
            .await;
        for i in 0..14 {
            store
                .create_dependency(NewDependency {
                    project_id: project.id,
                    name: format!("dep-{i}"),
                    version: Some("1.0.0".to_string()),
                    kind: "production".to_string(),
                    category: None,
                })
                .await;
        }

        let context = build_project_context(&store, project.id).await;
        let lines = context.matches("- dep-").count();
        assert_eq!(lines, 10);
        // Truncation keeps storage order: the first ten survive.
        assert!(context.contains("- dep-0@1.0.0 (production)"));
        assert!(context.contains("- dep-9@1.0.0 (production)"));
        assert!(!context.contains("- dep-10@"));
    }

    #[tokio::test]
    async fn test_empty_collections_render_placeholders() {
        let store = MemStore::new();
        let project = store
            .create_project(NewProject {
                name: "Empty".to_string(),
                root_path: "./src".to_string(),
                framework: None,
                language: None,
                build_tool: None,
                status: ScanStatus::Pending,
            })
            .await;

        let context = build_project_context(&store, project.id).await;
        assert!(context.contains("COMPONENTS BY TYPE:\nNo components found"));
        assert!(context.contains("DETAILED COMPONENTS:\nNone"));
        assert!(context.contains("SERVICES:\nNone"));
        assert!(context.contains("ROUTES:\nNone"));
        assert!(context.contains("DEPENDENCIES:\nNone"));
    }

    #[tokio::test]
    async fn test_missing_project_falls_back_to_demo_identity() {
        let store = MemStore::new();
        let context = build_project_context(&store, 99).await;
        assert!(context.contains("PROJECT: Demo Frontend App"));
        assert!(context.contains("FRAMEWORK: React with TypeScript"));
        assert!(context.contains("STATUS: completed"));
    }

    #[tokio::test]
    async fn test_zero_metrics_fall_back_to_collection_counts() {
        let store = MemStore::new();
        let project = store
            .create_project(NewProject {
                name: "Fresh".to_string(),
                root_path: "./src".to_string(),
                framework: None,
                language: None,
                build_tool: None,
                status: ScanStatus::Pending,
            })
            .await;
        store
            .create_project_metrics(NewProjectMetrics {
                project_id: project.id,
                ..NewProjectMetrics::default()
            })
            .await;
        store.create_component(demo_component(project.id, "A", "ui")).await;
        store.create_component(demo_component(project.id, "B", "ui")).await;

        let context = build_project_context(&store, project.id).await;
        assert!(context.contains("- Total Files: 0"));
        assert!(context.contains("- Components: 2"));
    }

    #[tokio::test]
    async fn test_components_group_in_first_seen_type_order() {
        let store = MemStore::new();
        let project = store
            .create_project(NewProject {
                name: "Grouped".to_string(),
                root_path: "./src".to_string(),
                framework: None,
                language: None,
                build_tool: None,
                status: ScanStatus::Completed,
            })
            .await;
        store.create_component(demo_component(project.id, "Shell", "layout")).await;
        store.create_component(demo_component(project.id, "Card", "ui")).await;
        store.create_component(demo_component(project.id, "Nav", "layout")).await;

        let context = build_project_context(&store, project.id).await;
        let layout = context.find("  layout: ").unwrap();
        let ui = context.find("  ui: ").unwrap();
        assert!(layout < ui);
        assert!(context.contains("  layout: Shell (src/components/Shell.tsx), Nav (src/components/Nav.tsx)"));
    }
}
