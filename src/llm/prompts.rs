/// Fixed reply the model is told to give when the context cannot answer.
pub const SME_FALLBACK: &str = "Requires SME Input";

pub fn proposal_prompt(tone: &str, context: &str, requirement: &str) -> String {
    format!(
        "You are a Senior Proposal Manager. Adopt a {tone} tone.\n\
         Rules:\n\
         1. Base answer ONLY on context.\n\
         2. If context is missing answer, say \"{SME_FALLBACK}\".\n\
         \n\
         Context: {context}\n\
         Requirement: {requirement}\n\
         \n\
         Draft Response:"
    )
}
