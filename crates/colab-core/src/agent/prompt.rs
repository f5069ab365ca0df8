//! System prompts used by the orchestrator.

/// System message of the default single-chat assistant.
pub fn default_assistant_prompt(termination_phrase: &str) -> String {
    format!(
        "You are a helpful AI assistant with broad expertise. Work through the user's \
         request step by step and answer clearly and accurately. If the request needs \
         several steps, explain each one. Reply \"{termination_phrase}\" at the end of \
         your message once the task is fully complete."
    )
}

/// Appended to every team member's instructions. Only the manager may end a
/// team exchange.
pub fn no_termination_suffix(termination_phrase: &str) -> String {
    format!("You must NOT respond with '{termination_phrase}' in any part of your response.")
}

/// System message of the group chat manager.
pub const MANAGER_SYSTEM_PROMPT: &str = "You control the flow of a group chat between \
specialist agents. Route each step of the user's request to the agent best suited to it, \
make sure errors or open questions raised by one agent are handed to an agent that can \
resolve them, and keep the conversation moving until every requirement is met.";

/// Instruction appended to the transcript when the manager picks the next
/// speaker.
pub fn speaker_selection_prompt(roles: &[(String, String)]) -> String {
    let names: Vec<&str> = roles.iter().map(|(name, _)| name.as_str()).collect();
    let listing: Vec<String> = roles
        .iter()
        .map(|(name, description)| format!("{name}: {description}"))
        .collect();
    format!(
        "You are in a role play game. The following roles are available:\n{}\n\n\
         Read the conversation so far. Then select the next role from [{}] to play. \
         Only return the role.",
        listing.join("\n"),
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_names_phrase() {
        assert_eq!(
            no_termination_suffix("TERMINATE"),
            "You must NOT respond with 'TERMINATE' in any part of your response."
        );
    }

    #[test]
    fn test_default_prompt_mentions_phrase() {
        assert!(default_assistant_prompt("DONE").contains("\"DONE\""));
    }

    #[test]
    fn test_selection_prompt_lists_roles() {
        let prompt = speaker_selection_prompt(&[
            ("Planner".to_string(), "plans work".to_string()),
            ("Coder".to_string(), "writes code".to_string()),
        ]);
        assert!(prompt.contains("Planner: plans work"));
        assert!(prompt.contains("[Planner, Coder]"));
    }
}
