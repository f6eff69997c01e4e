//! Plain-text rendering of a full report

use super::types::FullReport;
use chrono::{DateTime, Utc};

const RULE: &str = "==================================================";

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(RULE.to_string());
    lines.push(title.to_string());
    lines.push(RULE.to_string());
    lines.push(String::new());
}

/// Human-readable form of an RFC 3339 timestamp, the raw string if unparsable
fn display_time(timestamp: &str) -> String {
    if timestamp.is_empty() {
        return "N/A".to_string();
    }
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Render `report` as the downloadable text attachment
pub fn render_text_report(report: &FullReport) -> String {
    let analysis = &report.analysis;
    let report_id = report.report_id.as_deref().unwrap_or("N/A");
    let mut lines = Vec::new();

    section(&mut lines, "INBOXSHIELD MINI - EMAIL SECURITY REPORT");
    lines.push(format!("Domain: {}", or_na(&analysis.domain)));
    lines.push(format!("Report ID: {}", report_id));
    lines.push(format!("Generated: {}", display_time(&analysis.timestamp)));
    lines.push(format!("Security Score: {}/100", analysis.overall_score));
    lines.push(String::new());

    section(&mut lines, "BUSINESS IMPACT ANALYSIS");
    match &report.business_impact {
        Some(impact) => {
            lines.push(format!("Current Impact Level: {}", impact.current_impact_level));
            lines.push(format!(
                "Estimated Deliverability: {}",
                impact.estimated_deliverability_rate
            ));
            lines.push(format!("Critical Issues Found: {}", impact.critical_issues_found));
            lines.push(format!("Potential Improvement: {}", impact.potential_improvement_rate));
            lines.push(format!("Action Timeframe: {}", impact.recommended_action_timeframe));
        }
        None => {
            lines.push("Current Impact Level: UNKNOWN".to_string());
            lines.push("Critical Issues Found: 0".to_string());
        }
    }
    lines.push(String::new());

    section(&mut lines, "DNS RECORD FIXES (COPY-PASTE READY)");
    if report.dns_fixes.is_empty() {
        lines.push("No DNS fixes needed".to_string());
        lines.push(String::new());
    }
    for (index, fix) in report.dns_fixes.iter().enumerate() {
        lines.push(format!("{}. {} RECORD ({} PRIORITY)", index + 1, fix.fix_type, fix.priority));
        lines.push(format!("   Description: {}", fix.description));
        lines.push(format!("   Record Type: {}", fix.record_type));
        lines.push(format!("   Name/Host: {}", fix.name));
        lines.push(format!("   Value: {}", fix.record));
        lines.push(String::new());
    }

    section(&mut lines, "PROVIDER SETUP INSTRUCTIONS");
    match &report.provider_instructions {
        Some(instructions) => {
            let provider = report
                .dns_provider
                .as_ref()
                .map(|p| p.name.as_str())
                .unwrap_or("Generic DNS Provider");
            lines.push(format!("--- {} ---", provider.to_uppercase()));

            for (title, steps) in [
                ("Getting started", &instructions.setup_steps),
                ("SPF record", &instructions.spf_steps),
                ("DMARC record", &instructions.dmarc_steps),
                ("DKIM record", &instructions.dkim_steps),
            ] {
                lines.push(format!("{}:", title));
                for (index, step) in steps.iter().enumerate() {
                    lines.push(format!("  {}. {}", index + 1, step));
                }
            }

            if !instructions.notes.is_empty() {
                lines.push("Notes:".to_string());
                lines.extend(instructions.notes.iter().map(|note| format!("  - {}", note)));
            }
            lines.push(String::new());
        }
        None => {
            lines.push("Provider-specific instructions not available.".to_string());
            lines.push(
                "Please refer to the DNS fixes section above for exact records to add.".to_string(),
            );
            lines.push(String::new());
        }
    }

    section(&mut lines, "PRIORITY RECOMMENDATIONS");
    if report.recommendations.is_empty() {
        lines.push("No specific recommendations available".to_string());
        lines.push(String::new());
    }
    for (index, rec) in report.recommendations.iter().enumerate() {
        lines.push(format!("{}. {} ({} PRIORITY)", index + 1, rec.title, rec.priority));
        lines.push(format!("   {}", rec.description));
        lines.push(format!("   Impact: {}", rec.impact));
        lines.push(format!("   Time to implement: {}", rec.time_to_implement));
        lines.push(String::new());
    }

    section(&mut lines, "VERIFICATION & TESTING");
    if report.verification_steps.is_empty() {
        lines.push("1. Wait 24 hours for DNS propagation".to_string());
        lines.push("2. Test email authentication".to_string());
        lines.push("3. Monitor DMARC reports".to_string());
        lines.push(String::new());
    }
    for step in &report.verification_steps {
        lines.push(format!("Step {}: {}", step.step, step.title));
        lines.push(step.description.clone());
        lines.push(format!("Timeframe: {}", step.time_frame));
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.push("InboxShield Mini Professional Report".to_string());
    lines.push(format!("Generated on {}", Utc::now().format("%Y-%m-%d")));
    lines.push(format!("Report ID: {}", report_id));
    lines.push(RULE.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DomainCheckResult;
    use crate::provider::DnsProvider;

    fn analysis(spf: &str, dmarc: &str, dkim: &str) -> DomainCheckResult {
        serde_json::from_value(serde_json::json!({
            "domain": "example.com",
            "timestamp": "2024-03-05T10:20:30.000Z",
            "spf": { "status": spf },
            "dmarc": { "status": dmarc },
            "dkim": { "status": dkim },
            "bimi": { "status": "pass" },
            "mtaSts": { "status": "pass" },
            "overallScore": 40,
            "isPreview": false
        }))
        .unwrap()
    }

    #[test]
    fn test_render_full_report() {
        let report = FullReport::build(analysis("fail", "fail", "pass"), DnsProvider::generic());
        let text = render_text_report(&report);

        assert!(text.starts_with(RULE));
        assert!(text.contains("Domain: example.com"));
        assert!(text.contains("Generated: 2024-03-05 10:20:30 UTC"));
        assert!(text.contains("Security Score: 40/100"));
        assert!(text.contains("Current Impact Level: HIGH"));
        assert!(text.contains("1. SPF RECORD (HIGH PRIORITY)"));
        assert!(text.contains("2. DMARC RECORD (HIGH PRIORITY)"));
        assert!(text.contains("   Name/Host: _dmarc"));
        assert!(text.contains("--- GENERIC DNS PROVIDER ---"));
        assert!(text.contains("2. Configure DMARC Policy (HIGH PRIORITY)"));
        assert!(text.contains("Step 4: Monitor Results"));
        assert!(text.contains(report.report_id.as_deref().unwrap()));
        assert!(text.ends_with(RULE));
    }

    #[test]
    fn test_render_partial_report() {
        let report: FullReport = serde_json::from_value(serde_json::json!({
            "reportId": "r1"
        }))
        .unwrap();
        let text = render_text_report(&report);

        assert!(text.contains("Domain: N/A"));
        assert!(text.contains("Report ID: r1"));
        assert!(text.contains("Generated: N/A"));
        assert!(text.contains("Security Score: 0/100"));
    }

    #[test]
    fn test_render_bare_analysis() {
        let report: FullReport =
            serde_json::from_value(serde_json::to_value(analysis("pass", "pass", "pass")).unwrap())
                .unwrap();
        let text = render_text_report(&report);

        assert!(text.contains("Report ID: N/A"));
        assert!(text.contains("Current Impact Level: UNKNOWN"));
        assert!(text.contains("No DNS fixes needed"));
        assert!(text.contains("Provider-specific instructions not available."));
        assert!(text.contains("1. Wait 24 hours for DNS propagation"));
    }
}
