/// Output shape the model is asked to produce. Field names must stay in sync
/// with [`crate::analysis::AnalysisResult`].
const RESPONSE_TEMPLATE: &str = r#"{
  "productName": "string",
  "oneLineSummary": "string",
  "marketPositioning": "string",
  "targetAudience": "string",
  "keyDifferentiators": ["string"],
  "trendAnalysis": "string",
  "growthPotential": "string",
  "recommendations": ["string"]
}"#;

const INSTRUCTIONS: &str = "You are a product and market analyst. Analyze the product described below \
and respond with a single JSON object that matches this exact structure:\n\n";

const RULES: &str = "\n\nRules:\n\
1. Return ONLY the JSON object, with no explanations before or after it.\n\
2. Do not wrap the JSON in markdown code fences.\n\
3. Fill every field. Use plain text strings and arrays of strings only.\n\n\
Product description:\n";

/// Embeds `description` verbatim into the fixed analysis instructions.
pub fn build_prompt(description: &str) -> String {
    let mut result = String::with_capacity(
        INSTRUCTIONS.len() + RESPONSE_TEMPLATE.len() + RULES.len() + description.len(),
    );
    result.push_str(INSTRUCTIONS);
    result.push_str(RESPONSE_TEMPLATE);
    result.push_str(RULES);
    result.push_str(description);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_input_verbatim() {
        let description = "  Line one of a product pitch.\n\tIndented {braces} and \"quotes\"  ";
        let prompt = build_prompt(description);
        assert!(prompt.ends_with(description));
    }

    #[test]
    fn names_all_eight_fields() {
        let prompt = build_prompt("anything");
        for field in [
            "productName",
            "oneLineSummary",
            "marketPositioning",
            "targetAudience",
            "keyDifferentiators",
            "trendAnalysis",
            "growthPotential",
            "recommendations",
        ] {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }

    #[test]
    fn template_is_valid_json_with_eight_keys() {
        let value: serde_json::Value = serde_json::from_str(RESPONSE_TEMPLATE).unwrap();
        assert_eq!(value.as_object().map(|o| o.len()), Some(8));
    }

    #[test]
    fn forbids_code_fences_and_is_deterministic() {
        let a = build_prompt("same input");
        assert!(a.contains("Do not wrap the JSON in markdown code fences"));
        assert_eq!(a, build_prompt("same input"));
    }
}
