//! Resource URI templates.

use crate::types::ResourceTemplateDefinition;

fn template(uri_template: &str, name: &str, description: &str) -> ResourceTemplateDefinition {
    ResourceTemplateDefinition {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        mime_type: Some("text/plain".to_string()),
    }
}

pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
    vec![
        template(
            "wiki://{space_key}",
            "Confluence Space",
            "All pages of a Confluence space",
        ),
        template(
            "wiki://{space_key}/pages/{title}",
            "Confluence Page",
            "A single Confluence page, looked up by title",
        ),
        template(
            "tracker://{project_key}",
            "Jira Project",
            "Issues of a Jira project, newest first",
        ),
        template(
            "tracker://{project_key}/issues/{issue_key}",
            "Jira Issue",
            "A single Jira issue",
        ),
    ]
}
