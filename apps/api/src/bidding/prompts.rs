// LLM prompt constants for proposal drafting.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System message. Replace `{words}`, `{instruction}` and `{name}` before sending.
pub const PROPOSAL_SYSTEM_TEMPLATE: &str =
    "write a short and persuasive project bid in around {words} words using {instruction} .my name is {name}. ";

/// User message. Replace `{name}`, `{description}`, `{instruction}`, `{words}`,
/// `{formatting_instruction}` and `{no_template_instruction}` before sending.
pub const PROPOSAL_PROMPT_TEMPLATE: &str = "\
My name is {name}
Job description: {description}
Instructions: {instruction}
Words: {words}
{formatting_instruction}
{no_template_instruction}";

/// Sent verbatim when the text generator cannot produce a message.
pub const FALLBACK_PROPOSAL: &str = "Hello,\n\n\
I am interested in this project and would like to discuss the details with you.\n\n\
I have experience in the required skills and can deliver high-quality work within your timeline.\n\n\
Please let me know if you have any questions.\n\n\
Best regards";

pub const MISSING_DESCRIPTION: &str = "No description available";
