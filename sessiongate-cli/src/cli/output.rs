// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table and JSON rendering for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use sessiongate::{ApplyReport, ConfigEntry, NodeDescriptor, NodeStatus, RuntimeParams};

fn header(table: &mut Table, columns: &[&str]) {
    table.load_preset(UTF8_FULL);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Green))
            .collect::<Vec<_>>(),
    );
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"status\": \"error\", \"error\": \"{}\"}}", e))
}

pub fn format_rows(rows: &[ConfigEntry], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(rows);
    }
    if rows.is_empty() {
        return format!("{}", "No config rows; defaults apply".yellow());
    }
    let mut table = Table::new();
    header(&mut table, &["category", "key", "int_value", "text_value"]);
    for row in rows {
        table.add_row(vec![
            row.category.clone(),
            row.key.clone(),
            row.int_value.to_string(),
            row.text_value.clone(),
        ]);
    }
    table.to_string()
}

pub fn format_peers(nodes: &[NodeDescriptor], self_number: Option<u32>, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(nodes);
    }
    if nodes.is_empty() {
        return format!("{}", "No nodes configured".yellow());
    }
    let mut table = Table::new();
    header(&mut table, &["node", "host", "address", "mode", ""]);
    for node in nodes {
        let marker = if Some(node.node_number) == self_number {
            "self"
        } else {
            ""
        };
        table.add_row(vec![
            node.node_number.to_string(),
            node.host.clone(),
            node.address.clone(),
            node.mode.to_string(),
            marker.to_string(),
        ]);
    }
    table.to_string()
}

#[derive(Serialize)]
struct InspectJson<'a> {
    status: &'a NodeStatus,
    params: &'a RuntimeParams,
    rejected: Vec<String>,
    ignored: &'a [(String, String)],
}

pub fn format_inspect(
    status: &NodeStatus,
    params: &RuntimeParams,
    report: &ApplyReport,
    format: OutputFormat,
) -> String {
    let rejected: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
    if format == OutputFormat::Json {
        return to_json(&InspectJson {
            status,
            params,
            rejected,
            ignored: &report.ignored,
        });
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{} node {} ({})\n\n",
        "SessionGate".bold().green(),
        status.node_number,
        status.url
    ));

    let mut table = Table::new();
    header(&mut table, &["parameter", "value"]);
    let rows: Vec<(&str, String)> = vec![
        ("label", status.label.clone()),
        ("mode", status.mode.to_string()),
        ("leader", status.is_leader.to_string()),
        ("peers", status.peers.len().to_string()),
        ("pool enabled", params.pool_enabled.to_string()),
        ("max pool", params.max_pool.to_string()),
        ("effective max pool", status.effective_max_pool.to_string()),
        ("access token ttl", format!("{:?}", params.token_ttl)),
        ("refresh token ttl", format!("{:?}", params.refresh_ttl)),
        ("sweep interval", format!("{:?}", params.ttl_tick)),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    output.push_str(&table.to_string());
    output.push('\n');

    if !rejected.is_empty() {
        output.push_str(&format!("\n{}\n", "Rejected rows:".bold().yellow()));
        for (i, err) in rejected.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, err.yellow()));
        }
    }
    if !report.ignored.is_empty() {
        output.push_str(&format!("\n{}\n", "Ignored rows:".dimmed()));
        for (category, key) in &report.ignored {
            output.push_str(&format!("  {}/{}\n", category, key));
        }
    }
    output
}
