use carebridge_types::ResourceSubmission;

pub const SYSTEM_PROMPT: &str =
    "You are a healthcare verification assistant. Always respond with valid JSON.";

/// Build the user prompt for a submission.
pub fn build_prompt(submission: &ResourceSubmission) -> String {
    let mut prompt = String::from(
        "You are a healthcare resource verification AI assistant.\n\n\
         Analyze this healthcare resource post for authenticity and provide verification:\n\n",
    );

    prompt.push_str(&format!("Resource Name: {}\n", submission.name));
    prompt.push_str(&format!("Type: {}\n", submission.resource_type));
    prompt.push_str(&format!("Location: {}\n", submission.location));
    prompt.push_str(&format!(
        "Quantity/Details: {}\n",
        submission.quantity.as_deref().unwrap_or("")
    ));
    prompt.push_str(&format!(
        "Description: {}\n\n",
        submission.description.as_deref().unwrap_or("")
    ));

    prompt.push_str(
        "Evaluate:\n\
         1. Does this seem like a legitimate healthcare resource?\n\
         2. Are there any red flags or concerns?\n\
         3. Is the information complete and clear?\n\n\
         Respond in JSON format:\n\
         {\n  \
           \"verified\": true/false,\n  \
           \"confidence\": \"high\"/\"medium\"/\"low\",\n  \
           \"notes\": \"Brief explanation of your assessment and any suggestions\",\n  \
           \"category\": \"standardized type if different from input\"\n\
         }",
    );

    prompt
}
