//! End-to-end scenarios driven through the public facade.

use pgmodel::{Compiler, Error};

fn compile(sql: &str) -> Compiler {
    let mut compiler = Compiler::new();
    compiler.execute(sql).expect("statements should compile");
    compiler.catalog().validate().expect("catalog invariants");
    compiler
}

#[test]
fn users_table_dump_is_stable() {
    let compiler = compile(
        "CREATE TABLE users (
            id SERIAL PRIMARY KEY,
            username VARCHAR(50) NOT NULL UNIQUE,
            email VARCHAR(100) NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );",
    );
    let expected = "\
schema public
  table users
    column id serial pkey sequence=users_id_seq
    column username character varying not_null
    column email character varying not_null
    column created_at timestamp default=CURRENT_TIMESTAMP
    constraint users_pkey primary (id)
    constraint users_username_key unique (username)
";
    assert_eq!(compiler.catalog().dump(compiler.types()), expected);
}

#[test]
fn foreign_key_lifecycle_across_tables() {
    let setup = "
        CREATE TABLE base (id BIGSERIAL PRIMARY KEY);
        CREATE TABLE referrer (id BIGINT REFERENCES base(id));
    ";

    // Dropping the referrer is unrestricted; nothing points into it.
    let mut compiler = compile(setup);
    compiler.execute("DROP TABLE referrer;").expect("drop referrer");
    compiler.catalog().validate().expect("catalog invariants");

    // Dropping the referenced table needs CASCADE.
    let mut compiler = compile(setup);
    let err = compiler
        .execute("DROP TABLE base;")
        .expect_err("restricted drop");
    assert!(err.to_string().contains("referrer_id_fkey"));
    assert!(matches!(
        err,
        Error::Statement { source, .. }
            if matches!(*source, Error::RestrictedByConstraint { .. })
    ));

    compiler
        .execute("DROP TABLE base CASCADE;")
        .expect("cascade drop");
    compiler.catalog().validate().expect("catalog invariants");
    let catalog = compiler.catalog();
    assert!(catalog.find_table("public", "base").is_err());
    assert!(catalog.constraint_by_name("public.referrer_id_fkey").is_none());
    let referrer = catalog.find_table("public", "referrer").expect("referrer");
    assert!(catalog.find_column(referrer, "id").is_ok());
}

#[test]
fn serial_default_drop_collapses_the_type() {
    let compiler = compile(
        "CREATE TABLE s (id BIGSERIAL PRIMARY KEY);
         ALTER TABLE s ALTER COLUMN id DROP DEFAULT;",
    );
    let catalog = compiler.catalog();
    let s = catalog.find_table("public", "s").expect("table");
    let id = catalog.column(catalog.find_column(s, "id").expect("column"));
    assert_eq!(compiler.types().name(id.ty), "bigint");
    assert!(!id.attrs.has_sequence);
    assert_eq!(id.attrs.sequence_name, "");
    assert!(id.attrs.pkey);
}

#[test]
fn catalog_reads_back_in_insertion_order() {
    let compiler = compile(
        "CREATE SCHEMA zoo;
         CREATE SCHEMA app;
         CREATE TABLE zoo.zebra (z int);
         CREATE TABLE app.alpha (a int);
         CREATE TABLE app.beta (b int);",
    );
    let catalog = compiler.catalog();
    let schemas: Vec<&str> = catalog.schemas().map(|s| s.name.as_str()).collect();
    assert_eq!(schemas, ["public", "zoo", "app"]);
    let app_tables: Vec<&str> = catalog
        .schema("app")
        .expect("app")
        .table_ids()
        .map(|id| catalog.table(id).name.as_str())
        .collect();
    assert_eq!(app_tables, ["alpha", "beta"]);
}
