use melograph_db::{create_pool, run_migrations, DbRuntimeSettings, Gateway};
use rusqlite::params;

#[test]
fn db_initialization_works() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("melograph.db");
    let db_path = db_path.to_str().expect("utf-8 temp path");

    let pool = create_pool(db_path, DbRuntimeSettings::default()).expect("failed to create pool");
    {
        let conn = pool.get().expect("failed to get connection");
        let applied = run_migrations(&conn).expect("failed to run migrations");
        assert_eq!(applied, 1);

        // Verify table names (excluding sqlite_sequence and internal tables)
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .expect("failed to prepare table listing query");
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("failed to execute table listing query")
            .map(|r| r.expect("failed to read table name"))
            .collect();

        assert_eq!(tables, vec!["_melograph_migrations", "collections"]);
    }

    // Rows written through one checkout are visible through the next.
    let id = {
        let gateway = Gateway::acquire(&pool).expect("failed to acquire gateway");
        gateway
            .insert_returning_id(
                "INSERT INTO collections (collection_name, owner_id, collection_description)
                 VALUES (?1, ?2, ?3) RETURNING collection_id",
                params!["Survey 2026", "owner-1", "initial field survey"],
            )
            .expect("insert should succeed")
            .expect("insert should yield an id")
    };

    let gateway = Gateway::acquire(&pool).expect("failed to reacquire gateway");
    let rows: Vec<(i64, String)> = gateway
        .select(
            "SELECT collection_id, collection_name FROM collections",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("select should succeed");

    assert_eq!(rows, vec![(id, "Survey 2026".to_string())]);
}
