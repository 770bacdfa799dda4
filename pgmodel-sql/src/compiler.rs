use pg_query::NodeEnum;
use pg_query::protobuf::{
    self, AlterTableCmd, AlterTableStmt, AlterTableType, ColumnDef, ConstrType,
    Constraint as ConstraintDef, CreateEnumStmt, CreateSchemaStmt, CreateStmt, DropBehavior,
    DropStmt, ObjectType, RangeVar, RenameStmt, TypeName,
};
use pgmodel_catalog::{
    Catalog, ColumnAttributes, ColumnId, ConstraintId, ConstraintKind, ConstraintSpec,
    DEFAULT_SCHEMA, DropBehaviour, TableId,
};
use pgmodel_expr::{expr_to_string, node_texts};
use pgmodel_result::{Error, Result};
use pgmodel_types::{PostgresType, TypeRegistry};

/// Compiles a stream of PostgreSQL DDL statements into catalog mutations.
///
/// One compiler owns one [`Catalog`] and one [`TypeRegistry`] and applies
/// statements strictly in order. It is synchronous and not safe for
/// concurrent use; callers driving a shared compiler must serialize.
pub struct Compiler {
    search_path: String,
    catalog: Catalog,
    types: TypeRegistry,
}

impl Compiler {
    /// A compiler over an empty catalog (holding only the `public` schema)
    /// with the built-in type registry and a `public` search path.
    pub fn new() -> Self {
        Compiler {
            search_path: DEFAULT_SCHEMA.to_string(),
            catalog: Catalog::new(),
            types: TypeRegistry::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Schema used to resolve unqualified identifiers.
    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    pub fn set_search_path(&mut self, search_path: impl Into<String>) {
        self.search_path = search_path.into();
    }

    /// Parse `sql` and apply every statement it contains, in order.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        let parsed = pg_query::parse(sql)?;
        self.apply(&parsed.protobuf)
    }

    /// Apply an already-parsed statement stream, in order. Returns on the
    /// first failing statement; mutations from earlier statements remain
    /// committed.
    pub fn apply(&mut self, parse: &protobuf::ParseResult) -> Result<()> {
        for raw in &parse.stmts {
            let Some(node) = raw.stmt.as_ref().and_then(|stmt| stmt.node.as_ref()) else {
                continue;
            };
            self.apply_statement(node)?;
        }
        Ok(())
    }

    fn apply_statement(&mut self, node: &NodeEnum) -> Result<()> {
        match node {
            NodeEnum::CreateSchemaStmt(stmt) => self
                .create_schema(stmt)
                .map_err(Error::while_doing("creating schema")),
            NodeEnum::CreateStmt(stmt) => self
                .create_table(stmt)
                .map_err(Error::while_doing("creating table")),
            NodeEnum::AlterTableStmt(stmt) => self
                .alter_table(stmt)
                .map_err(Error::while_doing("altering table")),
            NodeEnum::DropStmt(stmt) => self
                .drop_objects(stmt)
                .map_err(Error::while_doing("dropping table")),
            NodeEnum::RenameStmt(stmt) => self
                .rename_table(stmt)
                .map_err(Error::while_doing("renaming table")),
            NodeEnum::CreateEnumStmt(stmt) => self
                .create_enum(stmt)
                .map_err(Error::while_doing("creating enum type")),
            _ => {
                tracing::debug!("ignoring unhandled statement kind");
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Statement handlers
    // ------------------------------------------------------------------

    fn create_schema(&mut self, stmt: &CreateSchemaStmt) -> Result<()> {
        let exists = self.catalog.schema(&stmt.schemaname).is_some();
        if exists && !stmt.if_not_exists {
            return Err(Error::SchemaExists(stmt.schemaname.clone()));
        }
        if !exists {
            self.catalog.add_schema(stmt.schemaname.clone());
        }
        Ok(())
    }

    fn create_table(&mut self, stmt: &CreateStmt) -> Result<()> {
        let relation = stmt
            .relation
            .as_ref()
            .ok_or_else(|| Error::node_shape("CreateStmt without a relation"))?;
        let schema = self.schema_or_search_path(&relation.schemaname);
        let table = self.catalog.create_table(&schema, &relation.relname)?;
        for element in &stmt.table_elts {
            match element.node.as_ref() {
                Some(NodeEnum::ColumnDef(def)) => self.define_column(table, def)?,
                Some(NodeEnum::Constraint(def)) => self.define_constraint(table, "", def)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn define_column(&mut self, table: TableId, def: &ColumnDef) -> Result<()> {
        let type_name = def
            .type_name
            .as_ref()
            .ok_or_else(|| Error::node_shape("ColumnDef without a type name"))?;
        let ty = self.types.resolve(&type_spelling(type_name)?)?;
        let mut attrs = ColumnAttributes::default();
        if self.types.get(ty).is_serial {
            attrs.has_sequence = true;
            attrs.sequence_name =
                format!("{}_{}_seq", self.catalog.table(table).name, def.colname);
        }
        self.catalog.add_column(table, &def.colname, ty, attrs)?;
        for node in &def.constraints {
            let Some(NodeEnum::Constraint(con)) = node.node.as_ref() else {
                return Err(Error::node_shape(
                    "column constraint list holds a non-constraint",
                ));
            };
            self.define_constraint(table, &def.colname, con)?;
        }
        Ok(())
    }

    /// Apply one constraint definition to `table`. A non-empty `col_name`
    /// marks the inline-column form: the constraint applies to exactly that
    /// column, and key lists fall back to it when empty.
    fn define_constraint(
        &mut self,
        table: TableId,
        col_name: &str,
        def: &ConstraintDef,
    ) -> Result<()> {
        match def.contype() {
            ConstrType::ConstrPrimary => {
                let cols = self.keys_or_inline_column(table, &def.keys, col_name)?;
                let name = if def.conname.is_empty() {
                    format!("{}_pkey", self.catalog.table(table).name)
                } else {
                    def.conname.clone()
                };
                self.catalog
                    .add_constraint(ConstraintSpec::primary(table, name, cols));
                Ok(())
            }
            ConstrType::ConstrNotnull => {
                let col = self.catalog.find_column(table, col_name)?;
                self.catalog.column_mut(col).attrs.not_null = true;
                Ok(())
            }
            ConstrType::ConstrDefault => {
                let col = self.catalog.find_column(table, col_name)?;
                let expr = def
                    .raw_expr
                    .as_ref()
                    .ok_or_else(|| Error::node_shape("default constraint without an expression"))?;
                let rendered = expr_to_string(expr)?;
                let attrs = &mut self.catalog.column_mut(col).attrs;
                attrs.has_explicit_default = true;
                attrs.column_default = rendered;
                Ok(())
            }
            ConstrType::ConstrUnique => {
                let cols = if col_name.is_empty() {
                    self.columns_from_keys(table, &def.keys)?
                } else {
                    vec![self.catalog.find_column(table, col_name)?]
                };
                let name = if def.conname.is_empty() {
                    self.generated_name(table, &cols, "key")
                } else {
                    def.conname.clone()
                };
                self.catalog
                    .add_constraint(ConstraintSpec::unique(table, name, cols));
                Ok(())
            }
            ConstrType::ConstrForeign => self.define_foreign_key(table, col_name, def),
            ConstrType::ConstrIdentity => {
                let cols = if def.fk_attrs.is_empty() {
                    vec![self.catalog.find_column(table, col_name)?]
                } else {
                    self.columns_from_keys(table, &def.fk_attrs)?
                };
                let name = self.generated_name(table, &cols, "identity");
                self.catalog
                    .add_constraint(ConstraintSpec::identity(table, name, cols));
                Ok(())
            }
            ConstrType::ConstrNull | ConstrType::ConstrCheck | ConstrType::ConstrAttrDeferrable => {
                tracing::debug!(kind = ?def.contype(), "constraint kind accepted but not modeled");
                Ok(())
            }
            other => Err(Error::UnsupportedConstraint(format!("{other:?}"))),
        }
    }

    fn define_foreign_key(
        &mut self,
        table: TableId,
        col_name: &str,
        def: &ConstraintDef,
    ) -> Result<()> {
        let pktable = def
            .pktable
            .as_ref()
            .ok_or_else(|| Error::node_shape("foreign key without a referenced table"))?;
        let ref_schema = self.schema_or_search_path(&pktable.schemaname);
        let refers_table = self.catalog.find_table(&ref_schema, &pktable.relname)?;
        let refers = if def.pk_attrs.is_empty() {
            // FOREIGN KEY (col) REFERENCES schema.table with no column list
            // points at the referenced table's primary key.
            self.primary_key_columns(refers_table)
        } else {
            self.columns_from_keys(refers_table, &def.pk_attrs)?
        };
        let constrains = if def.fk_attrs.is_empty() {
            // For syntax like CREATE TABLE t (user_id INTEGER REFERENCES
            // users(id)) the constrained column is not in the node and is
            // provided by the caller instead.
            vec![self.catalog.find_column(table, col_name)?]
        } else {
            self.columns_from_keys(table, &def.fk_attrs)?
        };
        let name = if def.conname.is_empty() {
            self.generated_name(table, &constrains, "fkey")
        } else {
            def.conname.clone()
        };
        self.catalog.add_constraint(ConstraintSpec::foreign_key(
            table,
            name,
            constrains,
            refers,
            refers_table,
        ));
        Ok(())
    }

    fn alter_table(&mut self, stmt: &AlterTableStmt) -> Result<()> {
        let relation = stmt
            .relation
            .as_ref()
            .ok_or_else(|| Error::node_shape("AlterTableStmt without a relation"))?;
        let table = self.table_from_range_var(relation)?;
        for node in &stmt.cmds {
            let Some(NodeEnum::AlterTableCmd(cmd)) = node.node.as_ref() else {
                return Err(Error::node_shape("expected AlterTableCmd"));
            };
            self.alter_table_cmd(table, cmd)?;
        }
        Ok(())
    }

    fn alter_table_cmd(&mut self, table: TableId, cmd: &AlterTableCmd) -> Result<()> {
        match cmd.subtype() {
            AlterTableType::AtAddColumn => {
                let Some(NodeEnum::ColumnDef(def)) = cmd.def.as_ref().and_then(|d| d.node.as_ref())
                else {
                    return Err(Error::node_shape("ADD COLUMN without a column definition"));
                };
                self.define_column(table, def)
            }
            AlterTableType::AtDropColumn => self.drop_column(table, &cmd.name, cmd.behavior()),
            AlterTableType::AtAddConstraint => {
                let Some(NodeEnum::Constraint(def)) = cmd.def.as_ref().and_then(|d| d.node.as_ref())
                else {
                    return Err(Error::node_shape(
                        "ADD CONSTRAINT without a constraint definition",
                    ));
                };
                self.define_constraint(table, "", def)
            }
            AlterTableType::AtAlterColumnType => {
                let Some(NodeEnum::ColumnDef(def)) = cmd.def.as_ref().and_then(|d| d.node.as_ref())
                else {
                    return Err(Error::node_shape(
                        "ALTER COLUMN TYPE without a column definition",
                    ));
                };
                self.alter_column_type(table, &cmd.name, def)
            }
            AlterTableType::AtColumnDefault => {
                if cmd.def.is_none() {
                    self.drop_default(table, &cmd.name)
                } else {
                    // SET DEFAULT is not modeled yet.
                    tracing::debug!(column = %cmd.name, "ignoring SET DEFAULT");
                    Ok(())
                }
            }
            AlterTableType::AtDropConstraint => {
                let schema = &self.catalog.table(table).schema;
                let fqn = format!("{schema}.{}", cmd.name);
                let id = self
                    .catalog
                    .constraint_by_name(&fqn)
                    .ok_or(Error::ConstraintNotFound(fqn))?;
                self.catalog.remove_constraint(id);
                Ok(())
            }
            AlterTableType::AtDropNotNull => {
                let col = self.catalog.find_column(table, &cmd.name)?;
                let column = self.catalog.column(col);
                let path = format!("{}.{}", self.catalog.table(table).name, column.name);
                if column.attrs.pkey {
                    return Err(Error::IsPrimaryKey(path));
                }
                if !column.attrs.not_null {
                    return Err(Error::NotNotNull(path));
                }
                self.catalog.column_mut(col).attrs.not_null = false;
                Ok(())
            }
            AlterTableType::AtSetNotNull => {
                let col = self.catalog.find_column(table, &cmd.name)?;
                self.catalog.column_mut(col).attrs.not_null = true;
                Ok(())
            }
            other => {
                tracing::debug!(subtype = ?other, "ignoring ALTER TABLE subcommand");
                Ok(())
            }
        }
    }

    fn alter_column_type(&mut self, table: TableId, col_name: &str, def: &ColumnDef) -> Result<()> {
        let type_name = def
            .type_name
            .as_ref()
            .ok_or_else(|| Error::node_shape("ALTER COLUMN TYPE without a type name"))?;
        let new_ty = self.types.resolve(&type_spelling(type_name)?)?;
        let col = self.catalog.find_column(table, col_name)?;
        let old_ty = self.catalog.column(col).ty;
        if !self.types.can_cast(old_ty, new_ty) {
            return Err(Error::IllegalCast {
                from: self.types.name(old_ty).to_string(),
                to: self.types.name(new_ty).to_string(),
            });
        }
        self.catalog.column_mut(col).ty = new_ty;
        Ok(())
    }

    fn drop_column(&mut self, table: TableId, col_name: &str, behavior: DropBehavior) -> Result<()> {
        let col = self.catalog.find_column(table, col_name)?;
        let dependents = self.catalog.depends().by_column(col).to_vec();
        for &cid in &dependents {
            let constraint = self.catalog.constraint(cid);
            // A constraint whose constrained set is exactly this column
            // disappears with it; everything else needs CASCADE approval
            // when it restricts.
            if constraint.constrains == [col] {
                continue;
            }
            if constraint.drop_behaviour == DropBehaviour::Restrict
                && behavior != DropBehavior::DropCascade
            {
                return Err(Error::RestrictedByConstraint {
                    object: col_name.to_string(),
                    constraint: constraint.name.clone(),
                });
            }
        }
        for cid in dependents {
            self.catalog.remove_constraint(cid);
        }
        self.catalog.remove_column(col);
        Ok(())
    }

    fn drop_default(&mut self, table: TableId, col_name: &str) -> Result<()> {
        let col = self.catalog.find_column(table, col_name)?;
        let column = self.catalog.column(col);
        if !column.attrs.has_sequence && !column.attrs.has_explicit_default {
            return Err(Error::NoDefaultToDrop(format!(
                "{}.{col_name}",
                self.catalog.table(table).name
            )));
        }
        if column.attrs.has_sequence {
            // Dropping a serial default collapses the column to its plain
            // integer peer.
            let ty = self.types.get(column.ty);
            let non_serial = if ty.is_serial { ty.non_serial } else { None };
            let column = self.catalog.column_mut(col);
            column.attrs.has_sequence = false;
            column.attrs.sequence_name.clear();
            if let Some(base) = non_serial {
                column.ty = base;
            }
        } else {
            let column = self.catalog.column_mut(col);
            column.attrs.has_explicit_default = false;
            column.attrs.column_default.clear();
        }
        Ok(())
    }

    fn drop_objects(&mut self, stmt: &DropStmt) -> Result<()> {
        if stmt.remove_type() != ObjectType::ObjectTable {
            tracing::debug!(object = ?stmt.remove_type(), "ignoring DROP of unhandled object kind");
            return Ok(());
        }
        let behaviour = drop_behaviour(stmt.behavior());
        for object in &stmt.objects {
            let Some(NodeEnum::List(list)) = object.node.as_ref() else {
                return Err(Error::node_shape("DROP TABLE target is not a name list"));
            };
            let parts = node_texts(&list.items)?;
            let (schema, name) = match parts.as_slice() {
                [name] => ("", *name),
                [schema, name] => (*schema, *name),
                _ => {
                    return Err(Error::node_shape("DROP TABLE target has too many name parts"));
                }
            };
            let schema = self.schema_or_search_path(schema);
            self.drop_table(&schema, name, behaviour)?;
        }
        Ok(())
    }

    fn drop_table(&mut self, schema: &str, name: &str, behaviour: DropBehaviour) -> Result<()> {
        let table = self.catalog.find_table(schema, name)?;
        let col_ids: Vec<ColumnId> = self.catalog.table(table).column_ids().collect();
        let mut to_remove: Vec<ConstraintId> = Vec::new();
        for col in col_ids {
            for &cid in self.catalog.depends().by_column(col) {
                let constraint = self.catalog.constraint(cid);
                if constraint.kind == ConstraintKind::ForeignKey
                    && constraint.refers.contains(&col)
                    && behaviour != DropBehaviour::Cascade
                {
                    return Err(Error::RestrictedByConstraint {
                        object: name.to_string(),
                        constraint: constraint.name.clone(),
                    });
                }
                if !to_remove.contains(&cid) {
                    to_remove.push(cid);
                }
            }
        }
        for cid in to_remove {
            self.catalog.remove_constraint(cid);
        }
        self.catalog.remove_table(table);
        Ok(())
    }

    fn rename_table(&mut self, stmt: &RenameStmt) -> Result<()> {
        if stmt.rename_type() != ObjectType::ObjectTable {
            tracing::debug!(object = ?stmt.rename_type(), "ignoring RENAME of unhandled object kind");
            return Ok(());
        }
        let relation = stmt
            .relation
            .as_ref()
            .ok_or_else(|| Error::node_shape("RenameStmt without a relation"))?;
        let table = self.table_from_range_var(relation)?;
        self.catalog.rename_table(table, &stmt.newname)
    }

    fn create_enum(&mut self, stmt: &CreateEnumStmt) -> Result<()> {
        let parts = node_texts(&stmt.type_name)?;
        let (schema, spelling) = match parts.as_slice() {
            [name] => ("", name.to_string()),
            [schema, name] => (*schema, format!("{schema}.{name}")),
            _ => return Err(Error::node_shape("enum type name has too many parts")),
        };
        let values = node_texts(&stmt.vals)?
            .into_iter()
            .map(str::to_string)
            .collect();
        self.types
            .register(PostgresType::enum_type(schema, &spelling, values))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Identifier resolution
    // ------------------------------------------------------------------

    fn schema_or_search_path(&self, schema: &str) -> String {
        if schema.is_empty() {
            self.search_path.clone()
        } else {
            schema.to_string()
        }
    }

    fn table_from_range_var(&self, relation: &RangeVar) -> Result<TableId> {
        let schema = self.schema_or_search_path(&relation.schemaname);
        self.catalog.find_table(&schema, &relation.relname)
    }

    fn columns_from_keys(
        &self,
        table: TableId,
        keys: &[protobuf::Node],
    ) -> Result<Vec<ColumnId>> {
        node_texts(keys)?
            .into_iter()
            .map(|name| self.catalog.find_column(table, name))
            .collect()
    }

    fn keys_or_inline_column(
        &self,
        table: TableId,
        keys: &[protobuf::Node],
        col_name: &str,
    ) -> Result<Vec<ColumnId>> {
        let cols = self.columns_from_keys(table, keys)?;
        if !cols.is_empty() {
            return Ok(cols);
        }
        Ok(vec![self.catalog.find_column(table, col_name)?])
    }

    /// Primary-key columns of `table` in declaration order.
    fn primary_key_columns(&self, table: TableId) -> Vec<ColumnId> {
        self.catalog
            .table(table)
            .column_ids()
            .filter(|&id| self.catalog.column(id).attrs.pkey)
            .collect()
    }

    /// `<table>_<col1>_<col2>..._<suffix>`, the PostgreSQL convention for
    /// unnamed constraints.
    fn generated_name(&self, table: TableId, cols: &[ColumnId], suffix: &str) -> String {
        format!(
            "{}_{}_{suffix}",
            self.catalog.table(table).name,
            self.catalog.join_column_names(cols, "_")
        )
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn type_spelling(type_name: &TypeName) -> Result<String> {
    let parts = node_texts(&type_name.names)?;
    let parts: Vec<&str> = parts
        .into_iter()
        .filter(|part| *part != "pg_catalog")
        .collect();
    Ok(parts.join("."))
}

fn drop_behaviour(behavior: DropBehavior) -> DropBehaviour {
    match behavior {
        DropBehavior::DropCascade => DropBehaviour::Cascade,
        _ => DropBehaviour::Restrict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse a column declaration through the real parser and return the
    /// column's `TypeName` node.
    fn column_type_name(sql_type: &str) -> TypeName {
        let sql = format!("CREATE TABLE t (c {sql_type})");
        let parsed = pg_query::parse(&sql).expect("parse");
        let stmt = parsed.protobuf.stmts[0].stmt.clone().expect("statement");
        let Some(NodeEnum::CreateStmt(create)) = stmt.node else {
            panic!("expected CreateStmt");
        };
        let Some(NodeEnum::ColumnDef(def)) = create.table_elts[0].node.clone() else {
            panic!("expected ColumnDef");
        };
        def.type_name.clone().expect("column carries a type name")
    }

    #[test]
    fn type_spelling_strips_the_pg_catalog_qualifier() {
        assert_eq!(
            type_spelling(&column_type_name("integer")).expect("spelling"),
            "int4"
        );
        assert_eq!(
            type_spelling(&column_type_name("varchar(255)")).expect("spelling"),
            "varchar"
        );
        assert_eq!(
            type_spelling(&column_type_name("app.status")).expect("spelling"),
            "app.status"
        );
    }

    #[test]
    fn drop_behaviour_maps_from_the_parser_enum() {
        assert_eq!(
            drop_behaviour(DropBehavior::DropCascade),
            DropBehaviour::Cascade
        );
        assert_eq!(
            drop_behaviour(DropBehavior::DropRestrict),
            DropBehaviour::Restrict
        );
    }
}
