use crate::models::{Finding, Severity, ToolCategory};
use once_cell::sync::Lazy;
use regex::Regex;

/// `[template-id] [protocol] [severity]`
static SCANNER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\s*\[([^\]]+)\]\s*\[([^\]]+)\]").expect("invalid scanner regex")
});

const XSS_INDICATORS: &[&str] = &[
    "vulnerable",
    "xss found",
    "possible xss",
    "confirmed xss",
    "payload was successful",
    "payloads were successful",
];

/// 按工具类别从输出中提取发现
pub struct FindingExtractor;

impl FindingExtractor {
    pub fn extract(category: ToolCategory, output: &str) -> Vec<Finding> {
        match category {
            ToolCategory::Scanner => Self::scanner(output),
            ToolCategory::InjectionTester => Self::injection(output),
            ToolCategory::XssDetector => Self::xss(output),
            _ => Vec::new(),
        }
    }

    fn scanner(output: &str) -> Vec<Finding> {
        SCANNER_LINE
            .captures_iter(output)
            .map(|caps| {
                Finding::new(Severity::parse_lenient(&caps[3]), caps[1].trim())
                    .with_detail(format!("protocol: {}", caps[2].trim()))
            })
            .collect()
    }

    fn injection(output: &str) -> Vec<Finding> {
        let lower = output.to_lowercase();
        let mut findings = Vec::new();

        if lower.contains("is vulnerable") {
            findings.push(Finding::new(Severity::High, "SQL Injection"));
        }
        if lower.contains("parameter") && lower.contains("injectable") {
            findings.push(Finding::new(Severity::High, "Injectable Parameter"));
        }
        findings
    }

    fn xss(output: &str) -> Vec<Finding> {
        let lower = output.to_lowercase();
        if XSS_INDICATORS.iter().any(|needle| lower.contains(needle)) {
            vec![Finding::new(Severity::Medium, "XSS")]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_lines() {
        let output = "\
[CVE-2021-44228] [http] [critical] http://t/
[tech-detect:nginx] [http] [info] http://t/
[exposed-panel] [http] [Weird] http://t/admin
noise line";
        let findings = FindingExtractor::extract(ToolCategory::Scanner, output);

        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].id, "CVE-2021-44228");
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].detail.as_deref(), Some("protocol: http"));
        assert_eq!(findings[1].severity, Severity::Info);
        assert_eq!(findings[2].severity, Severity::Info);
    }

    #[test]
    fn test_injection_rules_at_most_once() {
        let output = "Parameter 'id' is vulnerable.\nGET parameter 'id' is injectable\nid is vulnerable";
        let findings = FindingExtractor::extract(ToolCategory::InjectionTester, output);

        let ids: Vec<&str> = findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["SQL Injection", "Injectable Parameter"]);
        assert!(findings.iter().all(|f| f.severity == Severity::High));
    }

    #[test]
    fn test_vulnerable_alone_is_one_high_finding() {
        let output = "[INFO] testing URL\n[CRITICAL] the target id is vulnerable to time-based blind\nback-end DBMS: MySQL";
        let findings = FindingExtractor::extract(ToolCategory::InjectionTester, output);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "SQL Injection");
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_injection_clean_output() {
        let output = "all tested parameters do not appear to be injectable";
        let findings = FindingExtractor::extract(ToolCategory::InjectionTester, output);
        // "parameter" + "injectable" 同时出现即命中，与否定语义无关
        assert_eq!(findings.len(), 1);

        assert!(FindingExtractor::extract(ToolCategory::InjectionTester, "nothing").is_empty());
    }

    #[test]
    fn test_xss_single_finding() {
        let output = "Possible XSS detected\nPayloads were successful: 3";
        let findings = FindingExtractor::extract(ToolCategory::XssDetector, output);
        assert_eq!(findings, vec![Finding::new(Severity::Medium, "XSS")]);

        assert!(FindingExtractor::extract(ToolCategory::XssDetector, "No reflection found").is_empty());
    }

    #[test]
    fn test_other_categories_empty() {
        let output = "[a] [b] [high] is vulnerable";
        assert!(FindingExtractor::extract(ToolCategory::Recon, output).is_empty());
        assert!(FindingExtractor::extract(ToolCategory::NetworkScan, output).is_empty());
        assert!(FindingExtractor::extract(ToolCategory::Fuzzer, output).is_empty());
    }
}
