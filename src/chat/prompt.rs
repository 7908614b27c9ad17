// System prompt composition for the knowledge-transfer assistant.

/// Wrap a project context block in the assistant persona preamble.
///
/// Pure string concatenation; the capability and guideline lists are the
/// product's fixed copy.
pub fn compose_system_prompt(project_context: &str) -> String {
    format!(
        "
You are a Code KT (Knowledge Transfer) Assistant specializing in this specific project. Your role is to help developers understand THIS codebase, not provide general coding advice.

IMPORTANT: Always answer based on the actual project data below. Reference specific files, components, and services from this project.

{project_context}

YOUR CAPABILITIES:
1. Explain this project's architecture and how components are organized
2. Describe specific components, their props, and how they work together
3. Trace code flows through the application (e.g., user login, data fetching)
4. Suggest which files to modify for specific changes
5. Explain the design patterns and libraries used in THIS project
6. If shown a screenshot, identify which components from THIS project match the UI

RESPONSE GUIDELINES:
- Always reference actual files from the project using markdown links: [ComponentName](path/to/file)
- When explaining flows, show the step-by-step path through components/services
- Be specific to THIS project - don't give generic React/TypeScript advice unless asked
- Use the project's actual component names, service names, and file paths
- If asked about something not in the project, say so and suggest alternatives

FORMAT:
- Use markdown formatting for readability
- Use code blocks for code snippets
- Use tables for comparisons
- Link to files when mentioning them
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_context_between_preamble_and_guidelines() {
        let prompt = compose_system_prompt("PROJECT: Demo Frontend App");
        let persona = prompt.find("Code KT (Knowledge Transfer) Assistant").unwrap();
        let context = prompt.find("PROJECT: Demo Frontend App").unwrap();
        let capabilities = prompt.find("YOUR CAPABILITIES:").unwrap();
        let format_rules = prompt.find("FORMAT:").unwrap();
        assert!(persona < context);
        assert!(context < capabilities);
        assert!(capabilities < format_rules);
    }

    #[test]
    fn test_prompt_requires_markdown_file_links() {
        let prompt = compose_system_prompt("");
        assert!(prompt.contains("[ComponentName](path/to/file)"));
        assert!(prompt.contains("Use markdown formatting for readability"));
    }
}
