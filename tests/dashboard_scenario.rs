use pbir_tools::{Column, MetadataHandler, MetadataInfo, PbirError};
use tempfile::tempdir;

#[test]
fn should_reload_saved_dashboard() {
    let base_dir = tempdir().unwrap();
    let target = base_dir.path().join("my_dashboard");

    let mut handler = MetadataHandler::new();
    handler.create_new("My Dashboard", "A sample Power BI dashboard").unwrap();
    handler
        .add_table(
            "Sales",
            vec![
                Column::new("OrderID", "int"),
                Column::new("Date", "datetime"),
                Column::new("Amount", "decimal"),
            ],
        )
        .unwrap();
    handler.save(Some(target.as_path())).unwrap();

    let mut reloaded = MetadataHandler::with_path(&target);
    reloaded.load().unwrap();

    assert_eq!(
        reloaded.get_info().unwrap(),
        MetadataInfo {
            name: "My Dashboard".to_string(),
            version: "1.0".to_string(),
            description: "A sample Power BI dashboard".to_string(),
            table_count: 1,
            table_names: vec!["Sales".to_string()],
        }
    );

    let columns: Vec<(&str, &str)> = reloaded.get_tables().unwrap()[0]
        .columns()
        .iter()
        .map(|c| (c.name().as_str(), c.col_type().as_str()))
        .collect();
    assert_eq!(columns, vec![("OrderID", "int"), ("Date", "datetime"), ("Amount", "decimal")]);
}

#[test]
fn should_preserve_table_and_column_order_across_round_trip() {
    let base_dir = tempdir().unwrap();
    let mut handler = MetadataHandler::with_path(base_dir.path());
    handler.create_new("Ordering", "").unwrap();

    for i in (0..12).rev() {
        let columns = (0..i).map(|c| Column::new(&format!("col{}", i - c), "int")).collect();
        handler.add_table(&format!("table{}", i), columns).unwrap();
    }
    handler.save(None).unwrap();

    let reloaded = MetadataHandler::open(base_dir.path()).unwrap();
    assert_eq!(reloaded.get_tables().unwrap(), handler.get_tables().unwrap());
}

#[test]
fn should_fail_for_nonexistent_project() {
    let base_dir = tempdir().unwrap();

    let result = MetadataHandler::open(base_dir.path().join("nope"));
    assert!(matches!(result, Err(PbirError::NotFound(_))));
}
