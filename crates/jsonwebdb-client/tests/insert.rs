mod common;

use common::{as_dyn, MockSession};
use jsonwebdb_client::{ColumnDefinition, JwdbError, Record, Table};
use serde_json::json;

fn emp_table(session: &std::sync::Arc<MockSession>) -> Table {
    Table::new(as_dyn(session), "hr.emp")
        .unwrap()
        .with_columns(vec![
            ColumnDefinition::new("ID").with_type("integer").with_sqltype("NUMBER"),
            ColumnDefinition::new("NAME").with_type("string").with_sqltype("VARCHAR2"),
            ColumnDefinition::new("HIRED").with_type("date"),
        ])
}

#[tokio::test]
async fn values_follow_record_order() {
    let session = MockSession::connected(vec![json!({ "success": true, "affected": 1 })]);
    let table = emp_table(&session);
    let record = Record::new()
        .with("name", "KING")
        .with("hired", "1981-11-17")
        .with("id", 7839);

    let mut insert = table.insert();
    assert!(insert.execute(&record).await.unwrap());
    assert_eq!(insert.affected(), 1);
    assert!(insert.cursor().is_none());

    let req = session.last();
    let body = &req["Table"];
    assert_eq!(body["invoke"], "insert");
    assert_eq!(body["source"], "hr.emp");
    assert_eq!(body["session"], "0f6e-guid");
    assert!(body.get("savepoint").is_none());

    let values = body["insert()"]["values"].as_array().unwrap();
    assert_eq!(values.len(), record.len());
    let columns: Vec<&str> = values.iter().map(|v| v["column"].as_str().unwrap()).collect();
    assert_eq!(columns, record.columns());
    assert_eq!(values[2], json!({ "column": "id", "value": 7839 }));
    assert!(body["insert()"].get("returning").is_none());
}

#[tokio::test]
async fn returning_columns_shape_the_cursor() {
    let session = MockSession::connected(vec![json!({
        "success": true,
        "affected": 1,
        "rows": [[7839, "KING"]]
    })]);
    let table = emp_table(&session);

    let mut insert = table.insert();
    insert.set_return_columns(&["ID", "name"]).use_savepoint(true);
    assert!(insert
        .execute(&Record::new().with("name", "KING"))
        .await
        .unwrap());

    let req = session.last();
    let body = &req["Table"];
    assert_eq!(body["savepoint"], json!(true));
    assert_eq!(body["insert()"]["returning"], json!(["id", "name"]));

    let cursor = insert.take_cursor().unwrap();
    assert_eq!(cursor.column_names(), vec!["id", "name"]);
    assert_eq!(cursor.columns()[0].sqltype(), Some("NUMBER"));
    let rows = cursor.rows();
    assert_eq!(rows[0].get("id"), Some(&json!(7839)));
    assert_eq!(rows[0].get("NAME"), Some(&json!("KING")));
}

#[tokio::test]
async fn undescribed_returning_column_gets_bare_definition() {
    let session = MockSession::connected(vec![json!({ "success": true, "affected": 1, "rows": [["x1"]] })]);
    let table = emp_table(&session);

    let mut insert = table.insert();
    insert.set_return_columns(&["ROWID"]);
    assert!(insert.execute(&Record::new().with("id", 1)).await.unwrap());

    let cursor = insert.cursor().unwrap();
    assert_eq!(cursor.column_names(), vec!["rowid"]);
    assert!(cursor.columns()[0].data_type().is_none());
}

#[tokio::test]
async fn declined_insert_keeps_message() {
    let session = MockSession::connected(vec![
        json!({ "success": false, "message": "X" }),
        json!({ "success": true, "affected": 1 }),
    ]);
    let table = emp_table(&session);
    let mut insert = table.insert();
    insert.set_return_columns(&["id"]);

    assert!(!insert.execute(&Record::new().with("id", 1)).await.unwrap());
    assert!(insert.failed());
    assert_eq!(insert.error_message(), Some("X"));
    assert_eq!(insert.affected(), 0);
    assert!(insert.cursor().is_none());

    assert!(insert.execute(&Record::new().with("id", 2)).await.unwrap());
    assert!(insert.success());
    assert!(insert.error_message().is_none());
}

#[tokio::test]
async fn empty_record_is_rejected_locally() {
    let session = MockSession::connected(vec![]);
    let mut insert = emp_table(&session).insert();
    let err = insert.execute(&Record::new()).await.unwrap_err();
    assert!(matches!(err, JwdbError::InvalidRequest(_)));
    assert_eq!(session.calls(), 0);
}

#[test]
fn table_preconditions() {
    let session = MockSession::connected(vec![]);
    assert!(matches!(Table::new(as_dyn(&session), " ").unwrap_err(), JwdbError::MissingSource));
    assert!(matches!(
        Table::new(as_dyn(&session), "emp; drop table emp").unwrap_err(),
        JwdbError::InvalidRequest(_)
    ));

    let offline = MockSession::disconnected();
    assert!(matches!(Table::new(as_dyn(&offline), "emp").unwrap_err(), JwdbError::MissingSession));
}

#[tokio::test]
async fn describe_replaces_columns() {
    let session = MockSession::connected(vec![
        json!({
            "success": true,
            "columns": [
                { "name": "DEPTNO", "type": "integer", "sqltype": "NUMBER", "precision": [2, 0] },
                { "name": "DNAME", "type": "string", "sqltype": "VARCHAR2" }
            ]
        }),
        json!({ "success": false, "message": "table or view does not exist" }),
    ]);
    let mut dept = Table::new(as_dyn(&session), "dept").unwrap();

    assert!(dept.describe().await.unwrap());
    assert_eq!(session.last(), json!({ "Table": { "invoke": "describe", "source": "dept", "session": "0f6e-guid" } }));
    assert_eq!(dept.columns().len(), 2);
    assert_eq!(dept.column("DNAME").unwrap().sqltype(), Some("VARCHAR2"));

    assert!(!dept.describe().await.unwrap());
    assert_eq!(dept.columns().len(), 2);
}

#[tokio::test]
async fn rejected_call_clears_previous_outcome() {
    let session = MockSession::connected(vec![json!({ "success": true, "affected": 1, "rows": [[7839]] })]);
    let mut insert = emp_table(&session).insert();
    insert.set_return_columns(&["id"]);
    assert!(insert.execute(&Record::new().with("id", 7839)).await.unwrap());
    assert!(insert.cursor().is_some());

    assert!(insert.execute(&Record::new()).await.is_err());
    assert!(insert.failed());
    assert_eq!(insert.affected(), 0);
    assert!(insert.cursor().is_none());

    session.expire();
    let err = insert.execute(&Record::new().with("id", 7840)).await.unwrap_err();
    assert!(matches!(err, JwdbError::MissingSession));
    assert!(insert.error_message().is_none());
    assert_eq!(session.calls(), 1);
}
