//! Prompt assembly for roadmap generation.
//!
//! Builds the single user prompt sent to the generation service. The prompt
//! spells out the exact JSON envelope that [`crate::parse_roadmap`] accepts.

use sha2::{Digest, Sha256};

use crate::request::RoadmapRequest;
use crate::types::ResourceType;

/// Assembles prompts from roadmap requests.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Build the roadmap generation prompt.
    ///
    /// Section, topic and resource counts are left to the model; only the
    /// resource type tags are a hard constraint.
    pub fn build_roadmap_prompt(request: &RoadmapRequest) -> String {
        let styles = request.styles_joined();
        let level = request.skill_level.as_str();
        let hours = request.weekly_hours;
        let type_tags = ResourceType::ALL.map(|t| t.as_str());

        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Create a comprehensive learning roadmap for: {}\n\n",
            request.title.trim()
        ));

        prompt.push_str("Context:\n");
        prompt.push_str(&format!("- Skill Level: {level}\n"));
        prompt.push_str(&format!("- Time Commitment: {hours} hours per week\n"));
        prompt.push_str(&format!("- Learning Styles: {styles}\n\n"));

        prompt.push_str(
            "Create a detailed roadmap and return it in the following JSON format:\n\n",
        );
        prompt.push_str(&Self::response_shape(&type_tags.join("|")));

        prompt.push_str("\nRequirements:\n");
        prompt.push_str("1. Create as many sections as needed to comprehensively cover the topic\n");
        prompt.push_str("2. Each section should have all necessary topics to master that section\n");
        prompt.push_str("3. Each topic should have all relevant high-quality resources\n");
        prompt.push_str(&format!(
            "4. Resource types must be one of: {}\n",
            type_tags.join(", ")
        ));
        prompt.push_str(
            "5. URLs should be fictional but realistic (e.g., coursera.org/learn/topic)\n",
        );
        prompt.push_str(&format!("6. Content should match {level} level\n"));
        prompt.push_str(&format!("7. Structure should support {hours} hours/week\n"));
        prompt.push_str(&format!(
            "8. Prefer resources matching these learning styles: {styles}\n\n"
        ));

        prompt.push_str("Return only valid JSON that matches the format above.");

        prompt
    }

    /// The JSON envelope the model is asked to produce.
    fn response_shape(type_tags: &str) -> String {
        let mut shape = String::new();
        shape.push_str("{\n");
        shape.push_str("  \"sections\": [\n");
        shape.push_str("    {\n");
        shape.push_str("      \"title\": \"Section title\",\n");
        shape.push_str("      \"description\": \"Section description\",\n");
        shape.push_str("      \"topics\": [\n");
        shape.push_str("        {\n");
        shape.push_str("          \"title\": \"Topic title\",\n");
        shape.push_str("          \"description\": \"Topic description\",\n");
        shape.push_str("          \"resources\": [\n");
        shape.push_str("            {\n");
        shape.push_str("              \"title\": \"Resource title\",\n");
        shape.push_str("              \"url\": \"Resource URL\",\n");
        shape.push_str(&format!("              \"type\": \"{type_tags}\",\n"));
        shape.push_str("              \"description\": \"Resource description\"\n");
        shape.push_str("            }\n");
        shape.push_str("          ]\n");
        shape.push_str("        }\n");
        shape.push_str("      ]\n");
        shape.push_str("    }\n");
        shape.push_str("  ]\n");
        shape.push_str("}\n");
        shape
    }

    /// Short content hash of a prompt, for correlating log lines.
    pub fn fingerprint(prompt: &str) -> String {
        let digest = Sha256::digest(prompt.as_bytes());
        hex::encode(&digest[..8])
    }

    /// Estimate token count for a prompt (rough approximation).
    ///
    /// Uses 4 characters per token as a rough estimate.
    pub fn estimate_tokens(prompt: &str) -> usize {
        prompt.len() / 4
    }
}
