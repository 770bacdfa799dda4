use pgmodel_catalog::{ColumnId, TableId};
use pgmodel_result::Error;
use pgmodel_sql::Compiler;

fn compile(sql: &str) -> Compiler {
    let mut compiler = Compiler::new();
    compiler.execute(sql).expect("statements should compile");
    compiler.catalog().validate().expect("catalog invariants");
    compiler
}

fn compile_err(sql: &str) -> Error {
    let mut compiler = Compiler::new();
    let err = compiler.execute(sql).expect_err("statements should fail");
    root_cause(err)
}

fn root_cause(err: Error) -> Error {
    match err {
        Error::Statement { source, .. } => root_cause(*source),
        other => other,
    }
}

fn table(compiler: &Compiler, name: &str) -> TableId {
    compiler
        .catalog()
        .find_table("public", name)
        .expect("table should exist")
}

fn column(compiler: &Compiler, table: TableId, name: &str) -> ColumnId {
    compiler
        .catalog()
        .find_column(table, name)
        .expect("column should exist")
}

const BASE_AND_REFERRER: &str = "
CREATE TABLE base (id bigserial primary key);
CREATE TABLE referrer (id bigint references base(id));
";

#[test]
fn drop_column_removes_it_and_its_constraints() {
    let compiler = compile(
        "CREATE TABLE t (a int unique, b int);
         ALTER TABLE t DROP COLUMN a;",
    );
    let catalog = compiler.catalog();
    let t = table(&compiler, "t");
    assert!(catalog.find_column(t, "a").is_err());
    assert!(catalog.constraint_by_name("public.t_a_key").is_none());
    let names: Vec<&str> = catalog
        .table(t)
        .column_ids()
        .map(|id| catalog.column(id).name.as_str())
        .collect();
    assert_eq!(names, ["b"]);
}

#[test]
fn drop_column_backing_a_foreign_key_requires_cascade() {
    let sql = format!("{BASE_AND_REFERRER} ALTER TABLE base DROP COLUMN id;");
    let err = compile_err(&sql);
    assert!(matches!(
        err,
        Error::RestrictedByConstraint { object, constraint }
            if object == "id" && constraint == "referrer_id_fkey"
    ));

    let sql = format!("{BASE_AND_REFERRER} ALTER TABLE base DROP COLUMN id CASCADE;");
    let compiler = compile(&sql);
    let catalog = compiler.catalog();
    let base = table(&compiler, "base");
    assert!(catalog.find_column(base, "id").is_err());
    assert!(catalog.constraint_by_name("public.referrer_id_fkey").is_none());
    assert!(catalog.constraint_by_name("public.base_pkey").is_none());
    // The referring column itself survives.
    let referrer = table(&compiler, "referrer");
    assert!(catalog.find_column(referrer, "id").is_ok());
}

#[test]
fn drop_missing_column_fails() {
    let err = compile_err(
        "CREATE TABLE t (a int);
         ALTER TABLE t DROP COLUMN nope;",
    );
    assert!(matches!(err, Error::ColumnNotFound(name) if name == "nope"));
}

#[test]
fn drop_referrer_table_is_unrestricted() {
    let sql = format!("{BASE_AND_REFERRER} DROP TABLE referrer;");
    let compiler = compile(&sql);
    let catalog = compiler.catalog();
    assert!(catalog.find_table("public", "referrer").is_err());
    assert!(catalog.constraint_by_name("public.referrer_id_fkey").is_none());
    // base and its primary key are untouched.
    let base = table(&compiler, "base");
    assert!(catalog.column(column(&compiler, base, "id")).attrs.pkey);
}

#[test]
fn drop_referenced_table_requires_cascade() {
    let sql = format!("{BASE_AND_REFERRER} DROP TABLE base;");
    let err = compile_err(&sql);
    assert!(matches!(
        err,
        Error::RestrictedByConstraint { object, constraint }
            if object == "base" && constraint == "referrer_id_fkey"
    ));

    let sql = format!("{BASE_AND_REFERRER} DROP TABLE base CASCADE;");
    let compiler = compile(&sql);
    let catalog = compiler.catalog();
    assert!(catalog.find_table("public", "base").is_err());
    assert!(catalog.constraint_by_name("public.referrer_id_fkey").is_none());
    assert!(catalog.constraint_by_name("public.base_pkey").is_none());
    let referrer = table(&compiler, "referrer");
    let referrer_id = column(&compiler, referrer, "id");
    assert!(catalog.depends().by_column(referrer_id).is_empty());
}

#[test]
fn drop_table_accepts_multiple_objects() {
    let compiler = compile(
        "CREATE SCHEMA app;
         CREATE TABLE app.base (id bigserial primary key);
         CREATE TABLE second ();
         DROP TABLE app.base, second;",
    );
    let catalog = compiler.catalog();
    assert_eq!(catalog.schema("app").expect("app schema").table_count(), 0);
    assert_eq!(
        catalog.schema("public").expect("public schema").table_count(),
        0
    );
    assert!(catalog.constraint_by_name("app.base_pkey").is_none());
}

#[test]
fn drop_missing_table_fails() {
    let err = compile_err("DROP TABLE ghost;");
    assert!(matches!(err, Error::TableNotFound(name) if name == "ghost"));
}

#[test]
fn drop_of_other_object_kinds_is_ignored() {
    let compiler = compile(
        "CREATE TABLE t (a int);
         CREATE INDEX t_a_idx ON t (a);
         DROP INDEX t_a_idx;",
    );
    assert!(compiler.catalog().find_table("public", "t").is_ok());
}

#[test]
fn rename_rekeys_the_table_and_preserves_constraints() {
    let compiler = compile(
        "CREATE TABLE old_name (id serial primary key);
         ALTER TABLE old_name RENAME TO new_name;",
    );
    let catalog = compiler.catalog();
    let renamed = table(&compiler, "new_name");
    assert!(catalog.find_table("public", "old_name").is_err());
    assert_eq!(catalog.table(renamed).name, "new_name");

    // The constraint keeps its original generated name, and its FQN still
    // resolves because it is composed from the schema at lookup time.
    let pkey = catalog
        .constraint_by_name("public.old_name_pkey")
        .expect("primary constraint");
    assert_eq!(catalog.constraint(pkey).table, renamed);
    assert!(catalog.column(column(&compiler, renamed, "id")).attrs.pkey);
}

#[test]
fn rename_missing_table_fails() {
    let err = compile_err("ALTER TABLE ghost RENAME TO other;");
    assert!(matches!(err, Error::TableNotFound(name) if name == "ghost"));
}

#[test]
fn rename_onto_an_existing_table_fails() {
    let err = compile_err(
        "CREATE TABLE a (x int);
         CREATE TABLE b (y int);
         ALTER TABLE a RENAME TO b;",
    );
    assert!(matches!(err, Error::DuplicateTable(name) if name == "b"));
}

#[test]
fn search_path_steers_unqualified_names() {
    let mut compiler = Compiler::new();
    compiler.execute("CREATE SCHEMA app;").expect("schema");
    compiler.set_search_path("app");
    compiler.execute("CREATE TABLE t (a int);").expect("table");
    assert!(compiler.catalog().find_table("app", "t").is_ok());
    assert!(compiler.catalog().find_table("public", "t").is_err());

    compiler.execute("DROP TABLE t;").expect("drop");
    assert!(compiler.catalog().find_table("app", "t").is_err());
}
