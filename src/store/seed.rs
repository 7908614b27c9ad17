// Demo data seed: the pre-scanned project fixture the dashboard serves
// before a real scan exists.

use super::MemStore;
use crate::schema::{
    CodeFlow, FileKind, FileTreeNode, FlowStep, NewComponent, NewDependency, NewProject,
    NewProjectMetrics, NewRoute, NewService, Project, ScanStatus,
};
use chrono::Utc;

/// Load the demo project and its metadata, returning the created project.
pub async fn load_demo_project(store: &MemStore) -> Project {
    let created = store
        .create_project(NewProject {
            name: "Demo Frontend App".to_string(),
            root_path: "./src".to_string(),
            framework: Some("React".to_string()),
            language: Some("TypeScript".to_string()),
            build_tool: Some("Vite".to_string()),
            status: ScanStatus::Completed,
        })
        .await;
    let project = store
        .update_project(created.id, |p| p.last_scanned = Some(Utc::now()))
        .await
        .unwrap_or(created);

    store
        .create_project_metrics(NewProjectMetrics {
            project_id: project.id,
            total_files: 45,
            total_lines: 8500,
            total_components: 24,
            total_services: 8,
            total_directives: 3,
            total_pipes: 5,
            total_modules: 6,
            total_routes: 12,
        })
        .await;

    let components = [
        component(project.id, "AppSidebar", "layout", "src/components/layout/AppSidebar.tsx", &["items"], &[], "Main navigation sidebar"),
        component(project.id, "Header", "layout", "src/components/layout/Header.tsx", &["onScan"], &[], "Top header with search and actions"),
        component(project.id, "Dashboard", "page", "src/pages/Dashboard.tsx", &[], &[], "Main dashboard view"),
        component(project.id, "MetricsCard", "ui", "src/components/dashboard/MetricsCard.tsx", &["title", "value", "icon"], &[], "Displays a single metric"),
        component(project.id, "ChatMessage", "ui", "src/components/chat/ChatMessage.tsx", &["role", "content"], &[], "Chat message bubble"),
        component(project.id, "FileTree", "ui", "src/components/explorer/FileTree.tsx", &["nodes", "onSelect"], &["expanded"], "File browser tree"),
        component(project.id, "CodeViewer", "ui", "src/components/explorer/CodeViewer.tsx", &["file", "content"], &[], "Source code display"),
        component(project.id, "ArchitectureGraph", "visualization", "src/components/architecture/ArchitectureGraph.tsx", &["nodes"], &["zoom"], "Architecture diagram"),
    ];
    for new in components {
        store.create_component(new).await;
    }

    let services = [
        service(project.id, "ApiService", "src/lib/queryClient.ts", &["apiRequest", "getQueryClient"], &[], "HTTP API client"),
        service(project.id, "ThemeService", "src/lib/theme.tsx", &["useTheme", "setTheme"], &[], "Theme management"),
        service(project.id, "StorageService", "src/lib/storage.ts", &["get", "set", "remove"], &[], "Local storage wrapper"),
        service(project.id, "AuthService", "src/lib/auth.ts", &["login", "logout", "getUser"], &["ApiService"], "Authentication handling"),
    ];
    for new in services {
        store.create_service(new).await;
    }

    let routes = [
        route(project.id, "/", "Dashboard", "src/pages/Dashboard.tsx"),
        route(project.id, "/architecture", "Architecture", "src/pages/Architecture.tsx"),
        route(project.id, "/explorer", "Explorer", "src/pages/Explorer.tsx"),
        route(project.id, "/chat", "Chat", "src/pages/Chat.tsx"),
        route(project.id, "/workflows", "Workflows", "src/pages/Workflows.tsx"),
        route(project.id, "/config", "Config", "src/pages/Config.tsx"),
    ];
    for new in routes {
        store.create_route(new).await;
    }

    let dependencies = [
        dependency(project.id, "react", "18.3.0", "production", "ui"),
        dependency(project.id, "react-dom", "18.3.0", "production", "ui"),
        dependency(project.id, "@tanstack/react-query", "5.0.0", "production", "state"),
        dependency(project.id, "wouter", "3.0.0", "production", "utility"),
        dependency(project.id, "tailwindcss", "3.4.0", "production", "ui"),
        dependency(project.id, "lucide-react", "0.400.0", "production", "ui"),
        dependency(project.id, "typescript", "5.5.0", "development", "utility"),
        dependency(project.id, "vite", "5.0.0", "development", "utility"),
    ];
    for new in dependencies {
        store.create_dependency(new).await;
    }

    project
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn component(
    project_id: i64,
    name: &str,
    kind: &str,
    file_path: &str,
    props: &[&str],
    state: &[&str],
    description: &str,
) -> NewComponent {
    NewComponent {
        project_id,
        name: name.to_string(),
        kind: kind.to_string(),
        file_path: file_path.to_string(),
        module_id: None,
        props: strings(props),
        state: strings(state),
        description: Some(description.to_string()),
    }
}

fn service(
    project_id: i64,
    name: &str,
    file_path: &str,
    methods: &[&str],
    dependencies: &[&str],
    description: &str,
) -> NewService {
    NewService {
        project_id,
        name: name.to_string(),
        file_path: file_path.to_string(),
        methods: strings(methods),
        dependencies: strings(dependencies),
        description: Some(description.to_string()),
    }
}

fn route(project_id: i64, path: &str, component_name: &str, file_path: &str) -> NewRoute {
    NewRoute {
        project_id,
        path: path.to_string(),
        component_name: Some(component_name.to_string()),
        file_path: Some(file_path.to_string()),
        guards: vec![],
        children: vec![],
    }
}

fn dependency(
    project_id: i64,
    name: &str,
    version: &str,
    kind: &str,
    category: &str,
) -> NewDependency {
    NewDependency {
        project_id,
        name: name.to_string(),
        version: Some(version.to_string()),
        kind: kind.to_string(),
        category: Some(category.to_string()),
    }
}

/// Fixed demo code flows: the feature walkthroughs shown on the workflows
/// page and enumerated by the fallback responder.
pub(crate) fn demo_code_flows() -> Vec<CodeFlow> {
    vec![
        CodeFlow {
            id: "flow-login".to_string(),
            name: "User Login Flow".to_string(),
            steps: vec![
                step("step-1", "component", "LoginForm", "src/components/auth/LoginForm.tsx", "User enters credentials"),
                step("step-2", "service", "AuthService.login", "src/lib/auth.ts", "Validate and authenticate"),
                step("step-3", "store", "UserStore", "src/stores/user.ts", "Store user session"),
                step("step-4", "route", "Navigate to Dashboard", "src/App.tsx", "Redirect after login"),
            ],
        },
        CodeFlow {
            id: "flow-chat".to_string(),
            name: "Chat with AI".to_string(),
            steps: vec![
                step("step-1", "component", "ChatInput", "src/components/chat/ChatInput.tsx", "User enters message or uploads image"),
                step("step-2", "service", "ChatService.send", "src/lib/chat.ts", "Send message to API"),
                step("step-3", "service", "AIService.analyze", "server/routes.ts", "Process with AI model"),
                step("step-4", "component", "ChatMessage", "src/components/chat/ChatMessage.tsx", "Display AI response"),
            ],
        },
        CodeFlow {
            id: "flow-scan".to_string(),
            name: "Project Scan".to_string(),
            steps: vec![
                step("step-1", "component", "Header.onScan", "src/components/layout/Header.tsx", "User clicks scan button"),
                step("step-2", "service", "ScanService.scan", "server/routes.ts", "Traverse file system"),
                step("step-3", "service", "AnalyzerService", "server/analyzer.ts", "Parse and analyze code"),
                step("step-4", "store", "ProjectStore", "src/stores/project.ts", "Update project data"),
                step("step-5", "component", "Dashboard", "src/pages/Dashboard.tsx", "Refresh metrics display"),
            ],
        },
    ]
}

fn step(id: &str, kind: &str, name: &str, file_path: &str, description: &str) -> FlowStep {
    FlowStep {
        id: id.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        file_path: Some(file_path.to_string()),
        description: Some(description.to_string()),
    }
}

/// Fixed demo file tree for the explorer page.
pub(crate) fn demo_file_tree() -> Vec<FileTreeNode> {
    vec![
        folder("src", "src", vec![
            folder("components", "src/components", vec![
                folder("layout", "src/components/layout", vec![
                    file("AppSidebar.tsx", "src/components/layout/AppSidebar.tsx", "typescript"),
                    file("Header.tsx", "src/components/layout/Header.tsx", "typescript"),
                ]),
                folder("dashboard", "src/components/dashboard", vec![
                    file("MetricsCard.tsx", "src/components/dashboard/MetricsCard.tsx", "typescript"),
                    file("ProjectOverview.tsx", "src/components/dashboard/ProjectOverview.tsx", "typescript"),
                    file("QuickActions.tsx", "src/components/dashboard/QuickActions.tsx", "typescript"),
                ]),
                folder("chat", "src/components/chat", vec![
                    file("ChatMessage.tsx", "src/components/chat/ChatMessage.tsx", "typescript"),
                    file("ChatInput.tsx", "src/components/chat/ChatInput.tsx", "typescript"),
                ]),
                folder("explorer", "src/components/explorer", vec![
                    file("FileTree.tsx", "src/components/explorer/FileTree.tsx", "typescript"),
                    file("CodeViewer.tsx", "src/components/explorer/CodeViewer.tsx", "typescript"),
                ]),
            ]),
            folder("pages", "src/pages", vec![
                file("Dashboard.tsx", "src/pages/Dashboard.tsx", "typescript"),
                file("Architecture.tsx", "src/pages/Architecture.tsx", "typescript"),
                file("Explorer.tsx", "src/pages/Explorer.tsx", "typescript"),
                file("Chat.tsx", "src/pages/Chat.tsx", "typescript"),
                file("Workflows.tsx", "src/pages/Workflows.tsx", "typescript"),
                file("Config.tsx", "src/pages/Config.tsx", "typescript"),
            ]),
            folder("lib", "src/lib", vec![
                file("queryClient.ts", "src/lib/queryClient.ts", "typescript"),
                file("theme.tsx", "src/lib/theme.tsx", "typescript"),
                file("utils.ts", "src/lib/utils.ts", "typescript"),
            ]),
            file("App.tsx", "src/App.tsx", "typescript"),
            file("main.tsx", "src/main.tsx", "typescript"),
            file("index.css", "src/index.css", "css"),
        ]),
        folder("server", "server", vec![
            file("index.ts", "server/index.ts", "typescript"),
            file("routes.ts", "server/routes.ts", "typescript"),
            file("storage.ts", "server/storage.ts", "typescript"),
        ]),
        file("package.json", "package.json", "json"),
        file("tsconfig.json", "tsconfig.json", "json"),
        file("vite.config.ts", "vite.config.ts", "typescript"),
    ]
}

fn file(name: &str, path: &str, language: &str) -> FileTreeNode {
    FileTreeNode {
        name: name.to_string(),
        path: path.to_string(),
        kind: FileKind::File,
        children: None,
        language: Some(language.to_string()),
        size: None,
    }
}

fn folder(name: &str, path: &str, children: Vec<FileTreeNode>) -> FileTreeNode {
    FileTreeNode {
        name: name.to_string(),
        path: path.to_string(),
        kind: FileKind::Folder,
        children: Some(children),
        language: None,
        size: None,
    }
}

/// Demo file contents for the code viewer. Unknown paths get a generic
/// placeholder naming the path.
pub(crate) fn demo_file_content(path: &str) -> String {
    match path {
        "src/App.tsx" => APP_TSX.to_string(),
        "src/components/layout/Header.tsx" => HEADER_TSX.to_string(),
        _ => format!(
            "// File: {path}\n//\n// This file is part of the demo project structure.\n// In a real project scan, actual file contents would be loaded here.\n//\n// The Code KT platform analyzes:\n// - Component structure and props\n// - Service dependencies\n// - Route definitions\n// - Import/export relationships\n//\nexport default function Component() {{\n  return <div>Component content</div>;\n}}"
        ),
    }
}

const APP_TSX: &str = r#"import { Switch, Route } from "wouter";
import { QueryClientProvider } from "@tanstack/react-query";
import { queryClient } from "./lib/queryClient";
import { ThemeProvider } from "@/lib/theme";
import { SidebarProvider } from "@/components/ui/sidebar";
import { AppSidebar } from "@/components/layout/AppSidebar";
import { Header } from "@/components/layout/Header";
import Dashboard from "@/pages/Dashboard";
import Architecture from "@/pages/Architecture";
import Explorer from "@/pages/Explorer";
import Chat from "@/pages/Chat";

function Router() {
  return (
    <Switch>
      <Route path="/" component={Dashboard} />
      <Route path="/architecture" component={Architecture} />
      <Route path="/explorer" component={Explorer} />
      <Route path="/chat" component={Chat} />
    </Switch>
  );
}

export default function App() {
  return (
    <QueryClientProvider client={queryClient}>
      <ThemeProvider>
        <SidebarProvider>
          <div className="flex h-screen w-full">
            <AppSidebar />
            <div className="flex-1 flex flex-col">
              <Header />
              <main className="flex-1 overflow-hidden">
                <Router />
              </main>
            </div>
          </div>
        </SidebarProvider>
      </ThemeProvider>
    </QueryClientProvider>
  );
}"#;

const HEADER_TSX: &str = r#"import { SidebarTrigger } from "@/components/ui/sidebar";
import { Button } from "@/components/ui/button";
import { Input } from "@/components/ui/input";
import { Search, Moon, Sun } from "lucide-react";
import { useTheme } from "@/lib/theme";

interface HeaderProps {
  onScan?: () => void;
}

export function Header({ onScan }: HeaderProps) {
  const { theme, toggleTheme } = useTheme();

  return (
    <header className="flex items-center justify-between h-14 px-4 border-b">
      <div className="flex items-center gap-4">
        <SidebarTrigger />
        <div className="relative">
          <Search className="absolute left-3 w-4 h-4 text-muted-foreground" />
          <Input placeholder="Search..." className="pl-9 w-80" />
        </div>
      </div>
      <div className="flex items-center gap-2">
        <Button onClick={onScan}>Scan Project</Button>
        <Button variant="ghost" size="icon" onClick={toggleTheme}>
          {theme === "light" ? <Moon className="w-4 h-4" /> : <Sun className="w-4 h-4" />}
        </Button>
      </div>
    </header>
  );
}"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
