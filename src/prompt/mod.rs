use crate::wire::Step;

pub fn system_prompt_plan() -> &'static str {
    "You are a JSON generator. You only output valid JSON."
}

/// The idea is interpolated verbatim.
pub fn user_prompt_plan(idea: &str) -> String {
    format!(
r#"You are a senior software architect designed to help absolute beginners build projects.
The user wants to build: "{idea}".

Create a step-by-step plan to build this project.
The plan MUST be broken down into small, executable steps.
Each step should involve running a command or writing code.

Output a valid JSON object matching this schema:
{{
    "id": "unique_id",
    "title": "Project Title",
    "goal": "Project Goal",
    "steps": [
        {{
            "id": "step_1",
            "title": "Step Title",
            "description": "Simple explanation of what this step does",
            "command": "The exact shell command to run (e.g., 'npm init -y' or 'echo \"code\" > file.js')",
            "verification": "A command to verify it worked (e.g., 'ls' or 'cat file.js')",
            "terms": [
                {{ "name": "Term Name", "definition": "Simple explanation for a 5-year-old" }}
            ],
            "status": "pending"
        }}
    ],
    "status": "planning"
}}

IMPORTANT:
- Use simple, standard tools (HTML/JS for web, Python for scripts).
- Assume the user is on Windows/Mac/Linux (use cross-platform commands if possible, or prioritize common ones).
- If creating a file, use 'echo' or similar to write content. For complex files, break it down.
- Keep it simple! 3-5 steps for a first version."#
    )
}

pub fn system_prompt_tutor_success() -> &'static str {
    "You are a helpful tutor. Explain simply in Chinese."
}

pub fn user_prompt_tutor_success(step: &Step) -> String {
    format!(
r#"You are a friendly coding tutor for absolute beginners.
The user just successfully executed this step:
Title: "{title}"
Description: "{description}"
Command: "{command}"

Explain simply what this command did and why it's important.
Use an analogy if possible (e.g., "npm init is like creating a birth certificate for your project").
Keep it short (2-3 sentences)."#,
        title = step.title,
        description = step.description,
        command = step.command,
    )
}

pub fn system_prompt_tutor_error() -> &'static str {
    "You are a helpful tutor. Explain errors simply in Chinese."
}

pub fn user_prompt_tutor_error(step: &Step, error_output: &str) -> String {
    format!(
r#"You are a friendly coding tutor. The user encountered an error while executing a step.

Context:
- Step Title: "{title}"
- Command Executed: "{command}"

Error Output:
"""
{error_output}
"""

Task:
1. Explain what went wrong in simple, non-technical language (as if explaining to a beginner).
2. Provide a specific, actionable solution or the exact command to run next to fix it.
3. If the error suggests a missing dependency, provide the install command.

Keep your response encouraging and concise."#,
        title = step.title,
        command = step.command,
    )
}

/// Opens the free-chat history.
pub fn system_prompt_chat() -> &'static str {
    "You are BabyCoding, a patient programming mentor for absolute beginners. \
Answer in plain language, keep replies short, and suggest the next concrete thing to try."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_prompt_embeds_idea_and_schema() {
        let p = user_prompt_plan("a snake game");
        assert!(p.contains(r#"The user wants to build: "a snake game"."#));
        assert!(p.contains(r#""verification": "A command"#));
        assert!(p.contains("\"steps\": ["));
    }

    #[test]
    fn error_prompt_quotes_raw_output() {
        let step = Step {
            id: "s1".into(),
            title: "Install".into(),
            description: String::new(),
            command: "npm i".into(),
            verification: String::new(),
            terms: vec![],
            status: Default::default(),
            output: None,
            error: None,
        };
        let p = user_prompt_tutor_error(&step, "npm: command not found");
        assert!(p.contains("\"\"\"\nnpm: command not found\n\"\"\""));
        assert!(p.contains(r#"Command Executed: "npm i""#));
    }
}
