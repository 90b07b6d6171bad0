//! Console rendering of query outcomes.

use anyhow::Result;
use serde_json::json;
use std::io::Write;

use crate::cli::OutputFormat;
use crate::query::{QueryOutcome, Summary};

pub fn write_outcome(
    out: &mut impl Write,
    format: OutputFormat,
    keyword: &str,
    outcome: &QueryOutcome,
    scope_name: &str,
) -> Result<()> {
    match (format, outcome) {
        (OutputFormat::Text, QueryOutcome::Found(summary)) => write_summary(out, summary, scope_name),
        (OutputFormat::Text, QueryOutcome::NoRecords) => write_no_records(out, keyword, scope_name),
        (OutputFormat::Json, QueryOutcome::Found(summary)) => {
            writeln!(out, "{}", serde_json::to_string(summary)?)?;
            Ok(())
        }
        (OutputFormat::Json, QueryOutcome::NoRecords) => {
            let value = json!({ "keyword": keyword, "names": [], "matched": 0 });
            writeln!(out, "{value}")?;
            Ok(())
        }
    }
}

pub fn write_summary(out: &mut impl Write, summary: &Summary, scope_name: &str) -> Result<()> {
    writeln!(out, "All matching species:")?;
    for name in &summary.names {
        writeln!(out, "\t{name}")?;
    }
    writeln!(out)?;
    writeln!(out, "Popularity in the city:")?;
    writeln!(out, "{}", popularity_row(scope_name, summary.matched, summary.total))?;
    for rc in &summary.regions {
        writeln!(out, "{}", popularity_row(&rc.region, rc.matched, rc.total))?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_no_records(out: &mut impl Write, keyword: &str, scope_name: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "There are no records of {keyword} on {scope_name} streets")?;
    writeln!(out)?;
    Ok(())
}

/// One table row: label, `matched(total)` with separators, and the percentage.
pub fn popularity_row(label: &str, matched: usize, total: usize) -> String {
    let percentage = if total == 0 {
        0.0
    } else {
        100.0 * matched as f64 / total as f64
    };
    let fraction = format!("{}({})", group_thousands(matched), group_thousands(total));
    format!("\t{label:<14}:{fraction:>21}{percentage:>9.2}%")
}

pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RegionCount;

    fn summary() -> Summary {
        Summary {
            keyword: "plane".to_string(),
            names: vec!["London planetree".to_string()],
            matched: 87014,
            total: 683788,
            regions: vec![RegionCount {
                region: "Staten Island".to_string(),
                matched: 0,
                total: 0,
            }],
        }
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(683788), "683,788");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn popularity_row_matches_fixed_layout() {
        assert_eq!(
            popularity_row("NYC", 87014, 683788),
            "\tNYC           :      87,014(683,788)    12.73%"
        );
        assert_eq!(
            popularity_row("Staten Island", 0, 0),
            "\tStaten Island :                 0(0)     0.00%"
        );
    }

    #[test]
    fn text_summary_lists_names_then_table() -> Result<()> {
        let mut out = Vec::new();
        write_outcome(
            &mut out,
            OutputFormat::Text,
            "plane",
            &QueryOutcome::Found(summary()),
            "NYC",
        )?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("All matching species:\n\tLondon planetree\n\nPopularity in the city:\n"));
        assert!(text.contains("\tNYC           :"));
        assert!(text.contains("\tStaten Island :"));
        Ok(())
    }

    #[test]
    fn no_records_message_names_keyword_and_scope() -> Result<()> {
        let mut out = Vec::new();
        write_outcome(&mut out, OutputFormat::Text, "baobab", &QueryOutcome::NoRecords, "NYC")?;
        assert_eq!(
            String::from_utf8(out)?,
            "\nThere are no records of baobab on NYC streets\n\n"
        );
        Ok(())
    }

    #[test]
    fn json_output_is_one_line_per_query() -> Result<()> {
        let mut out = Vec::new();
        write_outcome(
            &mut out,
            OutputFormat::Json,
            "plane",
            &QueryOutcome::Found(summary()),
            "NYC",
        )?;
        write_outcome(&mut out, OutputFormat::Json, "baobab", &QueryOutcome::NoRecords, "NYC")?;

        let text = String::from_utf8(out)?;
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["matched"], 87014);
        assert_eq!(lines[0]["regions"][0]["region"], "Staten Island");
        assert_eq!(lines[1]["matched"], 0);
        Ok(())
    }
}
