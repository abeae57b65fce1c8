//! Example 01: Filtering and Sorting Records
//!
//! This example demonstrates how to run task records in mixed encodings
//! through the engine: tags and subtasks stored as arrays, JSON strings or
//! comma-separated text, filtered by several layers and sorted by priority.
//!
//! Run with: cargo run --example 01_query

use eyre::Result;
use serde_json::json;
use taskview::{Engine, FilterState, Identity, ProcessedRecord, Record, RecordKind, SortDirection, SortState};

fn print_records(records: &[ProcessedRecord]) {
    for p in records {
        println!(
            "   - {} : {} [{}] {}% ({}/{})",
            p.record.id().unwrap_or_default(),
            p.record.text(RecordKind::Task.title_fields()).unwrap_or_default(),
            p.record.priority().unwrap_or_default(),
            p.metrics.progress_percent,
            p.metrics.completed,
            p.metrics.total
        );
    }
    println!("   Found: {} tasks\n", records.len());
}

fn main() -> Result<()> {
    println!("TaskView Query Example");
    println!("======================\n");

    let tasks: Vec<Record> = vec![
        json!({
            "id": "task-001",
            "title": "Write release notes",
            "priority": "Medium",
            "status": "In Progress",
            "tags": "docs, release",
            "subtasks": [{"title": "Draft", "completed": true}, {"title": "Review"}],
            "assignedTo": "bob; u1",
            "dueDate": "2024-05-01"
        }),
        json!({
            "id": "task-002",
            "title": "Fix login redirect",
            "priority": "High",
            "status": "To Do",
            "tags": r#"["bug", "auth"]"#,
            "subtasks": r#"["task-003"]"#,
            "assignee": "Alice Smith"
        }),
        json!({
            "id": "task-003",
            "title": "Add redirect test",
            "priority": "Low",
            "status": "Completed",
            "tags": ["auth", "tests"],
            "subtasks": "[]",
            "assignee": "carol"
        }),
    ]
    .into_iter()
    .filter_map(Record::from_value)
    .collect();

    let user = Identity {
        id: Some("u1".to_string()),
        name: Some("Alice Smith".to_string()),
        email: Some("alice@example.com".to_string()),
    };
    let engine = Engine::new(RecordKind::Task)
        .with_auxiliary(&tasks)
        .with_current_user(user);
    let by_priority = SortState::new("priority", SortDirection::Asc);

    // No filters: every task, highest priority first
    println!("1. All tasks by priority:");
    print_records(&engine.process(&tasks, &FilterState::default(), &by_priority));

    // Tags stored three different ways all match
    println!("2. Tagged 'auth':");
    let filter: FilterState = serde_json::from_value(json!({"advancedFilters": {"tags": ["auth"]}}))?;
    print_records(&engine.process(&tasks, &filter, &by_priority));

    // Delimited and composite assignee fields match the current user
    println!("3. My tasks:");
    let filter: FilterState = serde_json::from_value(json!({"predefinedFilter": "my-tasks"}))?;
    print_records(&engine.process(&tasks, &filter, &by_priority));

    // Layers combine with AND
    println!("4. Search 'redirect' AND not completed:");
    let filter: FilterState = serde_json::from_value(json!({
        "searchTerm": "redirect",
        "columnFilters": {"status": "To Do, In Progress"}
    }))?;
    print_records(&engine.process(&tasks, &filter, &by_priority));

    // Column sort overrides the global sort
    println!("5. Sorted by progress, descending:");
    let sort: SortState = serde_json::from_value(json!({
        "field": "title",
        "columns": [{"column": "progress", "direction": "desc"}]
    }))?;
    print_records(&engine.process(&tasks, &FilterState::default(), &sort));

    Ok(())
}
