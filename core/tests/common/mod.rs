//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Encodes `text` as UTF-16LE with a BOM, the way Power BI Desktop writes
/// template members.
pub fn utf16le_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

pub fn utf16be_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&[0xFE, 0xFF]);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// Builds an in-memory ZIP archive from `(member name, contents)` pairs.
pub fn build_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut writer = ZipWriter::new(cursor);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in members {
            writer.start_file(*name, options).expect("start zip entry");
            writer
                .write_all(contents)
                .expect("write zip entry contents");
        }
        writer.finish().expect("finish zip");
    }
    buf
}

/// A template with the two metadata documents plus the structural members
/// a real export carries.
pub fn sample_template() -> Vec<u8> {
    let schema = utf16le_bytes(SAMPLE_SCHEMA);
    let layout = utf16le_bytes(&sample_layout_json());
    let diagram = utf16le_bytes(r#"{"version":"1.1.0"}"#);
    build_archive(&[
        ("Version", "1.28".as_bytes()),
        ("DataModelSchema", schema.as_slice()),
        ("DiagramLayout", diagram.as_slice()),
        ("Report/Layout", layout.as_slice()),
        (
            "Report/StaticResources/SharedResources/BaseThemes/CY24SU06.json",
            br#"{"name":"CY24SU06"}"#,
        ),
        ("Settings", &[0x00, 0x01]),
        ("SecurityBindings", &[0x42, 0x00, 0x42]),
        (
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="utf-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
        ),
    ])
}

/// A template whose `Report/Layout` member replaces the sample layout.
pub fn template_with_layout(layout_bytes: &[u8]) -> Vec<u8> {
    let schema = utf16le_bytes(SAMPLE_SCHEMA);
    build_archive(&[
        ("Version", "1.28".as_bytes()),
        ("DataModelSchema", schema.as_slice()),
        ("Report/Layout", layout_bytes),
    ])
}

/// A template whose `DataModelSchema` member replaces the sample schema.
pub fn template_with_schema(schema_bytes: &[u8]) -> Vec<u8> {
    let layout = utf16le_bytes(&sample_layout_json());
    build_archive(&[
        ("Version", "1.28".as_bytes()),
        ("DataModelSchema", schema_bytes),
        ("Report/Layout", layout.as_slice()),
    ])
}

pub const SAMPLE_SCHEMA: &str = r#"{
  "name": "3f2a2f1e-0000-4000-8000-000000000001",
  "compatibilityLevel": 1550,
  "model": {
    "culture": "en-US",
    "defaultPowerBIDataSourceVersion": "powerBI_V3",
    "tables": [
      {
        "name": "Sales",
        "lineageTag": "b1a7c0de-0001-4000-8000-000000000001",
        "partitions": [
          {
            "name": "Sales-partition",
            "mode": "import",
            "source": {
              "type": "m",
              "expression": [
                "let",
                "    Source = Csv.Document(File.Contents(\"C:\\data\\sales.csv\"), [Delimiter = \",\"]),",
                "    Promoted = Table.PromoteHeaders(Source)",
                "in",
                "    Promoted"
              ]
            }
          }
        ],
        "columns": [
          {
            "name": "Amount",
            "dataType": "double",
            "sourceColumn": "Amount",
            "summarizeBy": "sum"
          },
          {
            "name": "Date",
            "dataType": "dateTime",
            "sourceColumn": "Date",
            "summarizeBy": "none"
          },
          {
            "name": "Margin",
            "dataType": "double",
            "type": "calculated",
            "expression": "[Amount] - [Cost]",
            "summarizeBy": "sum"
          }
        ],
        "measures": [
          {
            "name": "Total Sales",
            "expression": "SUM(Sales[Amount])",
            "lineageTag": "b1a7c0de-0002-4000-8000-000000000002"
          },
          {
            "name": "Avg Sale",
            "expression": [
              "AVERAGEX(",
              "    Sales,",
              "    Sales[Amount]",
              ")"
            ]
          }
        ]
      },
      {
        "name": "Calendar",
        "lineageTag": "b1a7c0de-0003-4000-8000-000000000003",
        "partitions": [
          {
            "name": "Calendar-partition",
            "mode": "import",
            "source": {
              "type": "calculated",
              "expression": "CALENDARAUTO()"
            }
          }
        ],
        "columns": [
          {
            "name": "Date",
            "dataType": "dateTime",
            "isNameInferred": true,
            "type": "calculatedTableColumn",
            "sourceColumn": "[Date]",
            "summarizeBy": "none"
          }
        ]
      }
    ],
    "relationships": [
      {
        "name": "8c4e1d2f-0001-4000-8000-000000000001",
        "fromTable": "Sales",
        "fromColumn": "Date",
        "toTable": "Calendar",
        "toColumn": "Date"
      },
      {
        "name": "8c4e1d2f-0002-4000-8000-000000000002",
        "isActive": false,
        "fromTable": "Sales",
        "fromColumn": "ShipDate",
        "toTable": "Calendar",
        "toColumn": "Date"
      }
    ],
    "annotations": [
      {
        "name": "PBI_QueryOrder",
        "value": "[\"Sales\"]"
      }
    ]
  }
}"#;

/// Layout with two pages: a chart referencing a measure, a column, and an
/// aggregation; a textbox and a malformed config that must both be
/// skipped; and a second page with a table visual.
pub fn sample_layout_json() -> String {
    let chart_config = serde_json::json!({
        "name": "chart1",
        "layouts": [ { "id": 0, "position": { "x": 40, "y": 40, "width": 560, "height": 300 } } ],
        "singleVisual": {
            "visualType": "columnChart",
            "prototypeQuery": {
                "Version": 2,
                "From": [ { "Name": "s", "Entity": "Sales", "Type": 0 } ],
                "Select": [
                    {
                        "Measure": { "Expression": { "SourceRef": { "Source": "s" } }, "Property": "Total Sales" },
                        "Name": "Sales.Total Sales"
                    },
                    {
                        "Column": { "Expression": { "SourceRef": { "Source": "c" } }, "Property": "Date" },
                        "Name": "Calendar.Date"
                    },
                    {
                        "Aggregation": {
                            "Expression": { "Column": { "Expression": { "SourceRef": { "Source": "s" } }, "Property": "Amount" } },
                            "Function": 0
                        },
                        "Name": "Sum(Sales.Amount)"
                    }
                ]
            }
        }
    });
    let textbox_config = serde_json::json!({
        "name": "txt1",
        "singleVisual": { "visualType": "textbox", "objects": {} }
    });
    let table_config = serde_json::json!({
        "name": "tbl1",
        "singleVisual": {
            "visualType": "tableEx",
            "prototypeQuery": {
                "Version": 2,
                "From": [ { "Name": "c", "Entity": "Calendar", "Type": 0 } ],
                "Select": [
                    {
                        "Aggregation": {
                            "Expression": { "Column": { "Expression": { "SourceRef": { "Source": "c" } }, "Property": "Date" } },
                            "Function": 5
                        },
                        "Name": "CountNonNull(Calendar.Date)"
                    }
                ]
            }
        }
    });

    serde_json::json!({
        "id": 0,
        "resourcePackages": [],
        "sections": [
            {
                "id": 0,
                "name": "ReportSection",
                "displayName": "Overview",
                "visualContainers": [
                    { "x": 40.0, "y": 40.0, "z": 0.0, "config": chart_config.to_string() },
                    { "x": 640.0, "y": 40.0, "z": 1.0, "config": textbox_config.to_string() },
                    { "x": 40.0, "y": 380.0, "z": 2.0, "config": "{ not valid json" }
                ]
            },
            {
                "id": 1,
                "name": "ReportSection2",
                "displayName": "Details",
                "visualContainers": [
                    { "x": 40.0, "y": 40.0, "z": 0.0, "config": table_config.to_string() }
                ]
            }
        ],
        "theme": "CY24SU06"
    })
    .to_string()
}
