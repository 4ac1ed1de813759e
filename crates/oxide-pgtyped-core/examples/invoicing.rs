//! Invoicing System - Typed Query Example
//!
//! This example types a handful of invoicing queries:
//! - Parameters and result columns inferred from the text alone
//! - Placeholders resolved against a static schema
//! - Spread and pick parameters bound to positional placeholders
//!
//! Run with: cargo run --example invoicing

use oxide_pgtyped_core::schema::{refine, StaticSchema};
use oxide_pgtyped_core::{infer, parse, to_query_config, QueryInterface};
use serde_json::json;

// =============================================================================
// SCHEMA
// =============================================================================

const SCHEMA: &str = r#"{
    "tables": [
        {"name": "companies", "columns": [
            {"name": "id", "type": "int8"},
            {"name": "name", "type": "text"},
            {"name": "default_currency", "type": "currency_code"}
        ]},
        {"name": "invoices", "columns": [
            {"name": "id", "type": "int8"},
            {"name": "company_id", "type": "int8"},
            {"name": "number", "type": "text"},
            {"name": "status", "type": "invoice_status"},
            {"name": "total", "type": "numeric", "nullable": true},
            {"name": "due_on", "type": "date", "nullable": true}
        ]}
    ],
    "types": [
        {"name": "invoice_status", "values": ["draft", "sent", "paid", "overdue"]},
        {"name": "currency_code", "base": "bpchar"}
    ]
}"#;

// =============================================================================
// HELPER TO PRINT AN INTERFACE
// =============================================================================

fn print_interface(description: &str, sql: &str, interface: &QueryInterface) {
    println!("-- {description}");
    println!("{sql}");
    for param in &interface.params {
        println!("--   param  {:<16} {:?}", param.name, param.ty);
    }
    for column in &interface.results {
        println!("--   result {:<16} {:?}", column.name, column.ty);
    }
    println!();
}

// =============================================================================
// EXAMPLE QUERIES
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = StaticSchema::from_json(SCHEMA)?;

    let queries = [
        (
            "Invoices of a company, newest first",
            "SELECT id, number, status, total FROM invoices \
             WHERE company_id = $company_id! ORDER BY id DESC LIMIT $limit",
        ),
        (
            "Overdue total per company",
            "SELECT c.name, sum(i.total) AS outstanding FROM companies c \
             JOIN invoices i ON i.company_id = c.id \
             WHERE i.status = 'overdue' AND i.due_on < $today GROUP BY c.name",
        ),
        (
            "Invoices by number",
            "SELECT * FROM invoices WHERE number IN $$numbers",
        ),
        (
            "Create draft invoices",
            "INSERT INTO invoices (company_id, number, status) \
             VALUES $$drafts(company_id, number, status) RETURNING id",
        ),
        (
            "Mark an invoice paid",
            "UPDATE invoices SET status = 'paid' WHERE id = $id! RETURNING id, status",
        ),
    ];

    for (description, sql) in queries {
        let parsed = parse(sql).map_err(|err| format!("{description}:\n{}", err.caret(sql)))?;
        let interface = refine(infer(&parsed.statement)?, &schema);
        print_interface(description, sql, &interface);
    }

    // -------------------------------------------------------------------------
    // BINDING
    // -------------------------------------------------------------------------
    let config = to_query_config(
        "INSERT INTO invoices (company_id, number, status) \
         VALUES $$drafts(company_id, number, status) RETURNING id",
        &json!({
            "drafts": [
                {"company_id": 1, "number": "2024-001", "status": "draft"},
                {"company_id": 1, "number": "2024-002", "status": "draft"}
            ]
        }),
    )?;
    println!("-- Bound insert");
    println!("{}", config.text);
    println!("-- values: {}", serde_json::to_string(&config.values)?);

    Ok(())
}
