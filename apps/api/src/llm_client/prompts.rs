// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs next to it and appends these where they apply.

/// Keeps advice anchored to what the candidate actually wrote.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only suggest wording for experience the candidate plausibly has, based on the \
    résumé text provided. Never invent employers, titles, dates, metrics or certifications. \
    When a skill is absent from the résumé, advise how to show it honestly (projects, \
    coursework) instead of claiming it.";

/// Keeps output renderable as plain text in any client.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond in plain text with short numbered points. No markdown headings, no tables, \
    no preamble.";
