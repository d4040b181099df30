// Shared prompt fragments. Each workflow that calls the LLM keeps its own
// prompts.rs alongside it and pulls these in.

/// Formatting rules appended to every client-facing text request.
pub const FORMATTING_INSTRUCTION: &str = "\
    [Note Important: Use line breaks as \\n wherever possible for better formatting and readability. \
    Don't greet the user as we don't know the name.]\n\
    [Important: don't use H^ and ^H in the message.]";

/// Discourages boilerplate in text that is forwarded verbatim to a client.
pub const NO_TEMPLATE_INSTRUCTION: &str = "\
    I will be directly forwarding this to the client so don't give a template like message. \
    Make it unique and attractive and make sure it doesn't contain static text.";
