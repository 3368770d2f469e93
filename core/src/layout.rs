//! Report-layout parsing.
//!
//! Pages hold visual containers, and each container embeds its own config
//! as a JSON-encoded string that needs a second parse. Only visuals with
//! a query (`singleVisual.prototypeQuery.Select`) yield field rows;
//! text boxes, images, and shapes lack that path and are passed over.

use serde_json::Value;

use crate::model::{FieldKind, FieldUsageEntry};

/// Flattens `sections[].visualContainers[]` into one row per field
/// reference, in document order.
pub fn parse_layout(doc: &Value, report_name: &str) -> Vec<FieldUsageEntry> {
    let mut fields = Vec::new();

    let Some(sections) = doc.get("sections").and_then(|s| s.as_array()) else {
        log::warn!("report layout has no sections list");
        return fields;
    };

    for section in sections {
        let page = section
            .get("displayName")
            .and_then(|x| x.as_str())
            .unwrap_or("");
        let Some(containers) = section.get("visualContainers").and_then(|c| c.as_array()) else {
            continue;
        };
        for container in containers {
            collect_container_fields(container, page, report_name, &mut fields);
        }
    }

    fields
}

fn collect_container_fields(
    container: &Value,
    page: &str,
    report_name: &str,
    fields: &mut Vec<FieldUsageEntry>,
) {
    let Some(config_text) = container.get("config").and_then(|c| c.as_str()) else {
        return;
    };
    let config: Value = match serde_json::from_str(config_text) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("skipping visual with malformed config: {e}");
            return;
        }
    };

    let visual_id = config.get("name").and_then(|x| x.as_str()).unwrap_or("");
    let Some(select) = config
        .get("singleVisual")
        .and_then(|v| v.get("prototypeQuery"))
        .and_then(|q| q.get("Select"))
        .and_then(|s| s.as_array())
    else {
        return;
    };

    for item in select {
        let Some(kind) = classify_select_item(item) else {
            continue;
        };
        let Some(name) = item.get("Name").and_then(|x| x.as_str()) else {
            continue;
        };

        let reference = match kind {
            FieldKind::Aggregation => aggregation_inner(name).and_then(split_qualified_name),
            FieldKind::Measure | FieldKind::Column => split_qualified_name(name),
        };
        let Some((table, field)) = reference else {
            log::debug!("skipping select item with unrecognized name shape: {name}");
            continue;
        };

        fields.push(FieldUsageEntry {
            report_name: report_name.to_string(),
            page: page.to_string(),
            visual_id: visual_id.to_string(),
            table,
            name: field,
            kind,
        });
    }
}

/// Marker keys are checked in a fixed order; the first one present wins.
fn classify_select_item(item: &Value) -> Option<FieldKind> {
    let obj = item.as_object()?;
    if obj.contains_key("Measure") {
        return Some(FieldKind::Measure);
    }
    if obj.contains_key("Column") {
        return Some(FieldKind::Column);
    }
    if obj.contains_key("Aggregation") {
        return Some(FieldKind::Aggregation);
    }
    None
}

/// Splits a qualified `Table.Field` reference at the first dot; the field
/// part keeps any later dots ("d.Calendar.Date" -> ("d", "Calendar.Date")).
fn split_qualified_name(name: &str) -> Option<(String, String)> {
    let (table, field) = name.split_once('.')?;
    if table.is_empty() || field.is_empty() {
        return None;
    }
    Some((table.to_string(), field.to_string()))
}

/// Extracts the argument of a call-shaped aggregation reference:
/// "Sum(Sales.Amount)" -> "Sales.Amount".
fn aggregation_inner(name: &str) -> Option<&str> {
    let open = name.find('(')?;
    let close = name.find(')')?;
    if close <= open {
        return None;
    }
    Some(&name[open + 1..close])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout_with_configs(configs: &[Value]) -> Value {
        let containers: Vec<Value> = configs
            .iter()
            .map(|config| json!({ "config": config.to_string() }))
            .collect();
        json!({
            "sections": [
                { "name": "ReportSection", "displayName": "Overview", "visualContainers": containers }
            ]
        })
    }

    #[test]
    fn extracts_measure_column_and_aggregation_references() {
        let config = json!({
            "name": "chart1",
            "singleVisual": {
                "visualType": "columnChart",
                "prototypeQuery": {
                    "Version": 2,
                    "From": [ { "Name": "s", "Entity": "Sales" } ],
                    "Select": [
                        { "Measure": { "Property": "Total Sales" }, "Name": "Sales.Total Sales" },
                        { "Column": { "Property": "Date" }, "Name": "Calendar.Date" },
                        { "Aggregation": { "Function": 0 }, "Name": "Sum(Sales.Amount)" }
                    ]
                }
            }
        });
        let doc = layout_with_configs(&[config]);

        let fields = parse_layout(&doc, "Demo");
        assert_eq!(fields.len(), 3);

        assert_eq!(fields[0].page, "Overview");
        assert_eq!(fields[0].visual_id, "chart1");
        assert_eq!(fields[0].table, "Sales");
        assert_eq!(fields[0].name, "Total Sales");
        assert_eq!(fields[0].kind, FieldKind::Measure);

        assert_eq!(fields[1].table, "Calendar");
        assert_eq!(fields[1].name, "Date");
        assert_eq!(fields[1].kind, FieldKind::Column);

        assert_eq!(fields[2].table, "Sales");
        assert_eq!(fields[2].name, "Amount");
        assert_eq!(fields[2].kind, FieldKind::Aggregation);
    }

    #[test]
    fn visuals_without_a_query_are_skipped() {
        let textbox = json!({ "name": "txt1", "singleVisual": { "visualType": "textbox" } });
        let image = json!({ "name": "img1" });
        let doc = layout_with_configs(&[textbox, image]);

        assert!(parse_layout(&doc, "Demo").is_empty());
    }

    #[test]
    fn malformed_config_string_is_skipped() {
        let good = json!({
            "name": "ok",
            "singleVisual": {
                "prototypeQuery": {
                    "Select": [ { "Column": {}, "Name": "Sales.Amount" } ]
                }
            }
        });
        let doc = json!({
            "sections": [
                {
                    "displayName": "Overview",
                    "visualContainers": [
                        { "config": "not json at all" },
                        { "config": good.to_string() },
                        { "x": 0 }
                    ]
                }
            ]
        });

        let fields = parse_layout(&doc, "Demo");
        assert_eq!(fields.len(), 1, "only the well-formed visual should count");
        assert_eq!(fields[0].visual_id, "ok");
    }

    #[test]
    fn unmarked_or_unqualified_select_items_are_skipped() {
        let config = json!({
            "name": "v1",
            "singleVisual": {
                "prototypeQuery": {
                    "Select": [
                        { "Name": "Sales.Amount" },
                        { "Column": {}, "Name": "NoDotHere" },
                        { "Column": {} },
                        { "Aggregation": {}, "Name": "BadFormat" },
                        { "Aggregation": {}, "Name": "Sum()" },
                        { "Measure": {}, "Name": "Sales.Total" }
                    ]
                }
            }
        });
        let doc = layout_with_configs(&[config]);

        let fields = parse_layout(&doc, "Demo");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Total");
    }

    #[test]
    fn pages_without_display_name_use_empty_string() {
        let config = json!({
            "singleVisual": {
                "prototypeQuery": {
                    "Select": [ { "Column": {}, "Name": "Sales.Amount" } ]
                }
            }
        });
        let doc = json!({
            "sections": [ { "visualContainers": [ { "config": config.to_string() } ] } ]
        });

        let fields = parse_layout(&doc, "Demo");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].page, "");
        assert_eq!(fields[0].visual_id, "");
    }

    #[test]
    fn missing_sections_yields_empty_results() {
        assert!(parse_layout(&json!({}), "Demo").is_empty());
        assert!(parse_layout(&json!({ "sections": [] }), "Demo").is_empty());
        assert!(
            parse_layout(
                &json!({ "sections": [ { "displayName": "Empty Page" } ] }),
                "Demo"
            )
            .is_empty(),
            "a page without visual containers contributes nothing"
        );
    }

    #[test]
    fn split_keeps_dots_after_the_first() {
        assert_eq!(
            split_qualified_name("d.Calendar.Date"),
            Some(("d".to_string(), "Calendar.Date".to_string()))
        );
        assert_eq!(split_qualified_name("NoDot"), None);
        assert_eq!(split_qualified_name(".Leading"), None);
        assert_eq!(split_qualified_name("Trailing."), None);
    }

    #[test]
    fn aggregation_inner_takes_first_paren_pair() {
        assert_eq!(aggregation_inner("Sum(Sales.Amount)"), Some("Sales.Amount"));
        assert_eq!(
            aggregation_inner("CountNonNull(Calendar.Date)"),
            Some("Calendar.Date")
        );
        assert_eq!(aggregation_inner("Min(a.b)(c.d)"), Some("a.b"));
        assert_eq!(aggregation_inner("NoParens"), None);
        assert_eq!(aggregation_inner(")("), None);
        assert_eq!(aggregation_inner("Sum()"), Some(""));
    }

    #[test]
    fn fuzz_style_never_panics() {
        let mut state: u64 = 0x9E3779B97F4A7C15;
        for seed in 0..500u64 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(seed | 1);
            let len = (state % 24) as usize;
            let mut name = String::with_capacity(len);
            for _ in 0..len {
                state = state
                    .wrapping_mul(2862933555777941757)
                    .wrapping_add(3037000493);
                let c = match state >> 60 {
                    0 => '.',
                    1 => '(',
                    2 => ')',
                    _ => char::from(b'a' + ((state >> 32) % 26) as u8),
                };
                name.push(c);
            }
            let _ = split_qualified_name(&name);
            let _ = aggregation_inner(&name);
        }
    }
}
