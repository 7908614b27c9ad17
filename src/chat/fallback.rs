// Keyword-template responder used when no model credentials are
// configured. Total over its inputs: every message produces exactly one
// canned answer.

use crate::schema::{CodeFlow, Component, Project, Route, Service};

use super::context::{block_or, group_components_by_type, text_or};

fn safe_path(path: Option<&str>) -> &str {
    text_or(path, "unknown")
}

fn capitalize(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick a canned answer for the message.
///
/// Empty or whitespace-only input short-circuits to a prompt for a real
/// question. Otherwise the keyword rules run in order against the
/// lowercased message and the first hit wins, so "explain the routes"
/// gets the architecture answer, not the routing one. No rule matching
/// falls through to the welcome answer.
pub fn respond(
    message: &str,
    components: &[Component],
    services: &[Service],
    routes: &[Route],
    flows: &[CodeFlow],
    project: Option<&Project>,
) -> String {
    if message.trim().is_empty() {
        return "Please ask a question about this project.".to_string();
    }

    let lower = message.to_lowercase();
    let project_name = text_or(project.map(|p| p.name.as_str()), "Demo Frontend App");

    let rules: [(&[&str], &dyn Fn() -> String); 5] = [
        (
            &["structure", "architecture", "explain", "overview"],
            &|| architecture_overview(project, project_name, components, services, routes),
        ),
        (&["component"], &|| {
            component_breakdown(project_name, components)
        }),
        (&["route", "navigation", "page"], &|| {
            routing_table(project_name, routes)
        }),
        (&["service", "api", "data"], &|| {
            service_overview(project_name, services)
        }),
        (&["flow", "workflow", "how does"], &|| {
            flow_walkthrough(project_name, flows)
        }),
    ];

    for (keywords, template) in rules {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return template();
        }
    }

    welcome(project_name, components, services, routes, flows)
}

fn architecture_overview(
    project: Option<&Project>,
    project_name: &str,
    components: &[Component],
    services: &[Service],
    routes: &[Route],
) -> String {
    let type_breakdown = block_or(
        group_components_by_type(components)
            .iter()
            .map(|(kind, members)| format!("  - {} {} components", members.len(), kind))
            .collect::<Vec<_>>()
            .join("\n"),
        "  - No components found",
    );

    let key_components = block_or(
        components
            .iter()
            .take(5)
            .map(|c| {
                format!(
                    "- [{}]({}) - {}",
                    c.name,
                    safe_path(Some(&c.file_path)),
                    text_or(c.description.as_deref(), &c.kind)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "- No components found",
    );

    let services_list = block_or(
        services
            .iter()
            .map(|s| {
                format!(
                    "- [{}]({}) - {}",
                    s.name,
                    safe_path(Some(&s.file_path)),
                    text_or(s.description.as_deref(), "Business logic")
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "- No services found",
    );

    let routes_list = block_or(
        routes
            .iter()
            .map(|r| {
                format!(
                    "- `{}` -> [{}]({})",
                    r.path,
                    text_or(r.component_name.as_deref(), "Unknown"),
                    safe_path(r.file_path.as_deref())
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "- No routes found",
    );

    let framework = text_or(project.and_then(|p| p.framework.as_deref()), "React");
    let language = text_or(project.and_then(|p| p.language.as_deref()), "TypeScript");
    let build_tool = text_or(project.and_then(|p| p.build_tool.as_deref()), "Vite");

    format!(
        "## {project_name} - Architecture Overview

This is a **{framework}** application built with **{language}** and bundled using **{build_tool}**.

### Project Structure

**Components ({component_count} total):**
{type_breakdown}

**Key Components:**
{key_components}

**Services ({service_count}):**
{services_list}

**Routes ({route_count}):**
{routes_list}

### Entry Point
The main entry is [App.tsx](src/App.tsx), which sets up routing, providers, and the overall layout with sidebar navigation.

### Data Flow
State management uses **TanStack React Query** for server state. The [queryClient.ts](src/lib/queryClient.ts) configures API calls and caching.",
        component_count = components.len(),
        service_count = services.len(),
        route_count = routes.len(),
    )
}

fn component_breakdown(project_name: &str, components: &[Component]) -> String {
    let mut response = format!("## Components in {project_name}\n\n");

    let groups = group_components_by_type(components);
    if groups.is_empty() {
        response.push_str("No components found in this project.");
        return response;
    }

    for (kind, members) in groups {
        response.push_str(&format!("### {} Components\n", capitalize(kind)));
        let lines = members
            .iter()
            .map(|c| {
                format!(
                    "- **[{}]({})** - {}",
                    c.name,
                    safe_path(Some(&c.file_path)),
                    text_or(c.description.as_deref(), "Component")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        response.push_str(&lines);
        response.push_str("\n\n");
    }

    response
}

fn routing_table(project_name: &str, routes: &[Route]) -> String {
    let routes_list = block_or(
        routes
            .iter()
            .map(|r| {
                format!(
                    "| `{}` | [{}]({}) |",
                    r.path,
                    text_or(r.component_name.as_deref(), "Unknown"),
                    safe_path(r.file_path.as_deref())
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "| No routes | found |",
    );

    format!(
        "## Routing in {project_name}

Routes are defined in [App.tsx](src/App.tsx) using **wouter** for lightweight client-side routing.

### Available Routes:
{routes_list}

### Navigation
The sidebar uses the **SidebarProvider** from shadcn/ui for collapsible navigation. Each route renders its page component in the main content area."
    )
}

fn service_overview(project_name: &str, services: &[Service]) -> String {
    let services_list = block_or(
        services
            .iter()
            .map(|s| {
                let dependencies = if s.dependencies.is_empty() {
                    "None".to_string()
                } else {
                    s.dependencies.join(", ")
                };
                format!(
                    "\n**[{}]({})**\n- Description: {}\n- Methods: {}\n- Dependencies: {}",
                    s.name,
                    safe_path(Some(&s.file_path)),
                    text_or(s.description.as_deref(), "Business logic service"),
                    block_or(s.methods.join(", "), "Various"),
                    dependencies,
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "\nNo services found.",
    );

    format!(
        "## Services & API in {project_name}

### Services:
{services_list}

### API Client
The [queryClient.ts](src/lib/queryClient.ts) provides:
- `apiRequest(method, url, data)` - Makes HTTP requests
- TanStack Query integration for caching and refetching"
    )
}

fn flow_walkthrough(project_name: &str, flows: &[CodeFlow]) -> String {
    if flows.is_empty() {
        return format!("## Code Flows in {project_name}\n\nNo code flows have been detected yet. Try scanning the project to analyze code flows.");
    }

    let flows_list = flows
        .iter()
        .map(|f| {
            let steps = f
                .steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let path = safe_path(step.file_path.as_deref());
                    format!(
                        "{}. **{}** ([{path}]({path}))\n   {}",
                        i + 1,
                        step.name,
                        text_or(step.description.as_deref(), "Step in the flow")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n### {}\n{}", f.name, steps)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("## Code Flows in {project_name}\n{flows_list}")
}

fn welcome(
    project_name: &str,
    components: &[Component],
    services: &[Service],
    routes: &[Route],
    flows: &[CodeFlow],
) -> String {
    format!(
        "## Welcome to {project_name} Knowledge Transfer

I can help you understand this codebase! Here's a quick overview:

| Metric | Count |
|--------|-------|
| Components | {} |
| Services | {} |
| Routes | {} |
| Code Flows | {} |

### Try asking about:
- \"Explain the project architecture\"
- \"Show me the components\"
- \"How does routing work?\"
- \"What services are available?\"
- \"Explain the login flow\"

Or upload a screenshot of the UI and I'll identify the relevant components!",
        components.len(),
        services.len(),
        routes.len(),
        flows.len(),
    )
}
