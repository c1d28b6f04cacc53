//! Tool catalog listing.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::output::{output_json_list, print_header, print_table, OutputMode};
use crate::tools::{list_tools, ParamKind, ToolDescriptor};

#[derive(Serialize)]
struct ToolEntry {
    name: &'static str,
    description: &'static str,
    input_schema: Map<String, Value>,
}

pub fn handle_tools(mode: OutputMode) {
    let tools = list_tools();
    match mode {
        OutputMode::Json => {
            let entries: Vec<ToolEntry> = tools
                .iter()
                .map(|t| ToolEntry {
                    name: t.name,
                    description: t.description,
                    input_schema: t.input_schema(),
                })
                .collect();
            output_json_list(&entries);
        }
        OutputMode::Human => {
            print_header(&format!("{} tools", tools.len()));
            let rows = tools
                .iter()
                .map(|t| vec![t.name.to_string(), t.description.to_string(), params_summary(t)])
                .collect();
            print_table(&["Tool", "Description", "Arguments"], rows);
        }
    }
}

/// One line per parameter: `name: kind`, optional ones marked with `?`.
fn params_summary(tool: &ToolDescriptor) -> String {
    if tool.params.is_empty() {
        return "-".to_string();
    }
    tool.params
        .iter()
        .map(|p| {
            let marker = if p.required { "" } else { "?" };
            let kind = match &p.kind {
                ParamKind::String => "string".to_string(),
                ParamKind::Integer { min, max, .. } => format!("integer {}-{}", min, max),
                ParamKind::Boolean { .. } => "boolean".to_string(),
                ParamKind::Enum { values, .. } => values.join("|"),
            };
            format!("{}{}: {}", p.name, marker, kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::find;

    #[test]
    fn test_params_summary() {
        let tool = find("set_volume").unwrap();
        assert_eq!(params_summary(tool), "volume_percent: integer 0-100");

        let tool = find("pause_playback").unwrap();
        assert_eq!(params_summary(tool), "-");

        let tool = find("play_song").unwrap();
        assert_eq!(params_summary(tool), "song_title: string\nartist?: string");
    }
}
