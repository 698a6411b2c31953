use serde::{Deserialize, Serialize};

/// Structured product analysis decoded from the model reply.
///
/// Only `product_name`, `one_line_summary` and `key_differentiators` are
/// guaranteed by the response contract. The rest are optional so a missing
/// field shows up as `None` rather than a silently empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub product_name: String,
    pub one_line_summary: String,
    #[serde(default)]
    pub market_positioning: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    pub key_differentiators: Vec<String>,
    #[serde(default)]
    pub trend_analysis: Option<String>,
    #[serde(default)]
    pub growth_potential: Option<String>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

impl AnalysisResult {
    /// Markdown export of the analysis. Absent sections are left out.
    pub fn to_markdown(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(&format!("# {}\n\n_{}_\n", self.product_name, self.one_line_summary));

        push_section(&mut out, "Market Positioning", self.market_positioning.as_deref());
        push_section(&mut out, "Target Audience", self.target_audience.as_deref());
        push_list(&mut out, "Key Differentiators", &self.key_differentiators);
        push_section(&mut out, "Trend Analysis", self.trend_analysis.as_deref());
        push_section(&mut out, "Growth Potential", self.growth_potential.as_deref());
        if let Some(recommendations) = &self.recommendations {
            push_list(&mut out, "Recommendations", recommendations);
        }

        out
    }
}

fn push_section(out: &mut String, title: &str, body: Option<&str>) {
    if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
        out.push_str(&format!("\n## {}\n\n{}\n", title, body));
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n\n", title));
    for item in items {
        out.push_str("- ");
        out.push_str(item.trim());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            product_name: "LockBeam".into(),
            one_line_summary: "A smart bike lock with tamper alerts.".into(),
            market_positioning: Some("Premium urban commuter accessory.".into()),
            target_audience: Some("City cyclists".into()),
            key_differentiators: vec!["Solar charging".into(), "Phone alerts".into()],
            trend_analysis: Some("Micromobility keeps growing.".into()),
            growth_potential: Some("High".into()),
            recommendations: Some(vec!["Partner with bike-share fleets".into()]),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["productName"], "LockBeam");
        assert_eq!(value["keyDifferentiators"][1], "Phone alerts");
        assert_eq!(value["recommendations"][0], "Partner with bike-share fleets");
    }

    #[test]
    fn markdown_contains_every_present_section() {
        let md = sample().to_markdown();
        assert!(md.starts_with("# LockBeam\n\n_A smart bike lock with tamper alerts._\n"));
        assert!(md.contains("## Market Positioning\n\nPremium urban commuter accessory."));
        assert!(md.contains("## Key Differentiators\n\n- Solar charging\n- Phone alerts\n"));
        assert!(md.contains("## Recommendations\n\n- Partner with bike-share fleets\n"));
    }

    #[test]
    fn markdown_skips_absent_sections() {
        let result = AnalysisResult {
            market_positioning: None,
            trend_analysis: Some("   ".into()),
            key_differentiators: vec![],
            recommendations: None,
            ..sample()
        };
        let md = result.to_markdown();
        assert!(!md.contains("Market Positioning"));
        assert!(!md.contains("Trend Analysis"));
        assert!(!md.contains("Key Differentiators"));
        assert!(!md.contains("Recommendations"));
        assert!(md.contains("## Target Audience"));
    }
}
