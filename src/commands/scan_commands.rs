use ::arsenal::models::{AppConfig, ScanStrategy};
use ::arsenal::services::scan::{ScanOptions, ScanReport, ScanRunner};
use ::arsenal::services::strategy::{advisor_from_config, StrategyRequest};
use ::arsenal::services::tool::ToolManager;
use std::io::{BufRead, Write};

const RULE_WIDTH: usize = 60;
const ERROR_LINES: usize = 10;

/// `scan` 的命令行选项
#[derive(Debug, Clone, Default)]
pub struct ScanCommandOptions {
    pub context: Option<String>,
    pub assume_yes: bool,
    pub install_missing: bool,
}

/// 渲染策略分析结果
pub fn render_strategy(strategy: &ScanStrategy) -> String {
    let or_na = |value: &str| {
        if value.is_empty() {
            "N/A".to_string()
        } else {
            value.to_string()
        }
    };

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{rule}\n[*] 策略分析结果\n{rule}\n");
    out.push_str(&format!("\n[Observation] {}\n", or_na(&strategy.observation)));
    out.push_str(&format!("\n[Thoughts] {}\n", or_na(&strategy.thoughts)));
    out.push_str(&format!("\n[Strategy] {}\n", or_na(&strategy.scan_strategy)));
    if !strategy.estimated_time.is_empty() {
        out.push_str(&format!("\n[Estimated] {}\n", strategy.estimated_time));
    }

    out.push_str("\n[Recommended Tools]\n");
    for tool in strategy.ordered_tools() {
        out.push_str(&format!("\n   {}. {}\n", tool.order, tool.tool_key));
        out.push_str(&format!("      Reason: {}\n", or_na(&tool.reason)));
    }
    out.push_str(&format!("\n{rule}\n"));
    out
}

/// 渲染扫描报告（逐个工具结果 + 汇总）
pub fn render_report(report: &ScanReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    for skipped in &report.skipped {
        out.push_str(&format!("\n[!] 跳过 {}: {}\n", skipped.tool_key, skipped.reason));
    }

    for result in &report.results {
        out.push_str(&format!("\n{rule}\n[*] {} 执行结果:\n", result.tool_key));
        out.push_str(&format!(
            "   Status: {}\n",
            if result.success { "[OK]" } else { "[X]" }
        ));
        out.push_str(&format!(
            "   Execution Time: {:.2}s\n",
            result.elapsed.as_secs_f64()
        ));

        if !result.findings.is_empty() {
            out.push_str("   [!] Findings:\n");
            for finding in &result.findings {
                out.push_str(&format!("      - [{}] {}\n", finding.severity, finding.id));
            }
        }

        if !result.success {
            out.push_str(&format!("   [X] Errors: {}\n", result.error));
            for line in result
                .stderr
                .lines()
                .filter(|l| !l.trim().is_empty())
                .take(ERROR_LINES)
            {
                out.push_str(&format!("      {line}\n"));
            }
        } else if !result.stdout.trim().is_empty() {
            out.push_str(&format!("   [*] Output:\n{thin}\n"));
            for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
                out.push_str(&format!("   {line}\n"));
            }
            out.push_str(&format!("{thin}\n"));
        }
    }

    out.push_str(&format!("\n{rule}\n[*] SCAN SUMMARY\n{rule}\n"));
    out.push_str(&format!("   Target: {}\n", report.target));
    out.push_str(&format!("   Total Findings: {}\n", report.summary.total()));
    if report.summary.total() == 0 {
        out.push_str("   No vulnerabilities found.\n");
    } else {
        out.push_str(&format!("   Critical/High: {}\n", report.summary.critical_high));
        out.push_str(&format!("   Medium: {}\n", report.summary.medium));
        out.push_str(&format!("   Low/Info: {}\n", report.summary.low_info));
        out.push_str("\n   [!] Vulnerabilities Found:\n");
        for finding in report.findings() {
            out.push_str(&format!("      - [{}] {}\n", finding.severity, finding.id));
        }
    }
    out.push_str(&format!("{rule}\n"));
    out
}

/// 解析确认输入（仅 y / yes 视为同意）
pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_confirmed(&answer),
    }
}

/// `scan <target>`：生成策略，确认后按策略执行
pub async fn scan_target(
    manager: &ToolManager,
    config: &AppConfig,
    target: &str,
    options: ScanCommandOptions,
) -> anyhow::Result<()> {
    if let Err(e) = url::Url::parse(target) {
        tracing::warn!(target = %target, error = %e, "目标不是合法 URL，仍按原样传给工具");
    }

    let advisor = advisor_from_config(config)?;
    let request = StrategyRequest::new(target, manager.status().await).with_context(options.context);
    let strategy = advisor.analyze(&request).await;
    print!("{}", render_strategy(&strategy));

    if !options.assume_yes && !confirm("\n按此策略开始扫描？(y/n): ") {
        println!("已取消扫描");
        return Ok(());
    }

    let runner = ScanRunner::new(manager);
    let report = runner
        .run(
            target,
            &strategy,
            ScanOptions {
                install_missing: options.install_missing,
            },
        )
        .await;
    print!("{}", render_report(&report));
    Ok(())
}
