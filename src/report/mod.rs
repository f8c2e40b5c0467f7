//! JSON reports of decoded descriptor lists and sections

use serde::Serialize;
use serde_json::Value;

use crate::constants::table_name;
use crate::context::Context;
use crate::list::DescriptorList;
use crate::psi::TableDescriptors;
use crate::tree::json;

/// JSON structure for one descriptor loop (internal serialization)
#[derive(Serialize)]
struct LoopJson<'a> {
    label: &'a str,
    valid: bool,
    count: usize,
    typed: usize,
    descriptors: Value,
}

/// JSON structure for one section (internal serialization)
#[derive(Serialize)]
struct SectionJson<'a> {
    source: &'a str,
    table_id: String,
    table: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utc_time: Option<String>,
    valid: bool,
    loops: Vec<LoopJson<'a>>,
}

/// JSON structure for complete report (internal serialization)
#[derive(Serialize)]
struct ReportJson<'a> {
    ts_time: String,
    context: Value,
    sections: Vec<SectionJson<'a>>,
}

/// Report generator for decoded sections
pub struct Reporter;

impl Reporter {
    fn loop_json<'a>(label: &'a str, list: &DescriptorList, ctx: &Context) -> LoopJson<'a> {
        LoopJson {
            label,
            valid: list.is_valid(),
            count: list.len(),
            typed: list.typed_count(),
            descriptors: json::to_value(&list.to_tree(ctx)),
        }
    }

    fn section_json<'a>(source: &'a str, table: &'a TableDescriptors, ctx: &Context) -> SectionJson<'a> {
        SectionJson {
            source,
            table_id: format!("0x{:02X}", table.table_id),
            table: table_name(table.table_id),
            version: table.version,
            utc_time: table.utc_time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            valid: table.is_valid(),
            loops: table
                .loops
                .iter()
                .map(|l| Self::loop_json(&l.label, &l.descriptors, ctx))
                .collect(),
        }
    }

    /// Generate pretty-printed JSON string for CLI output.
    ///
    /// `sections` pairs each decoded section with the name of its source.
    pub fn generate_json_report(sections: &[(String, TableDescriptors)], ctx: &Context) -> String {
        let rep = ReportJson {
            ts_time: chrono::Utc::now().to_rfc3339(),
            context: context_json(ctx),
            sections: sections
                .iter()
                .map(|(source, table)| Self::section_json(source, table, ctx))
                .collect(),
        };
        serde_json::to_string_pretty(&rep).unwrap_or_else(|_| "{\"error\": \"JSON serialization failed\"}".to_string())
    }
}

fn context_json(ctx: &Context) -> Value {
    serde_json::json!({
        "standards": ctx.standards().to_string(),
        "charset": ctx.default_charset().to_string(),
        "private_data_specifier": ctx.private_specifier().map(|p| format!("0x{p:08X}")),
    })
}
