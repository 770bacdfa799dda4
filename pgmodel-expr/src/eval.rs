use pg_query::NodeEnum;
use pg_query::protobuf::{AConst, Node, a_const};
use pgmodel_result::{Error, Result};

/// Extract the string payload of a parser `String` node. Name lists
/// (`TypeName.names`, constraint key lists, `DROP` object lists) are
/// promised by the parser contract to contain only these.
pub fn node_text(node: &Node) -> Result<&str> {
    match node.node.as_ref() {
        Some(NodeEnum::String(s)) => Ok(s.sval.as_str()),
        _ => Err(Error::node_shape("expected a string list item")),
    }
}

/// Extract every string payload from a parser name list.
pub fn node_texts(nodes: &[Node]) -> Result<Vec<&str>> {
    nodes.iter().map(node_text).collect()
}

/// Reduce a default-value expression to its canonical string form.
///
/// - `SqlValueFunction` renders as its symbolic name (`CURRENT_TIMESTAMP`)
/// - `FuncCall` renders as `name(arg, ...)` with arguments reduced
///   recursively by this same function
/// - `TypeCast` renders as `value::dotted.type.name` when the argument is a
///   constant, and as the empty string otherwise
/// - constants render as `NULL`, `"string"`, `true`/`false`, decimal
///   integers, or the raw numeric/bit-string lexeme
/// - every other expression shape reduces to the empty string
pub fn expr_to_string(node: &Node) -> Result<String> {
    match node.node.as_ref() {
        Some(NodeEnum::SqlvalueFunction(func)) => {
            // A value function is e.g. CURRENT_TIMESTAMP - looks like a
            // value but behaves like a function.
            let name = func.op().as_str_name();
            Ok(name.strip_prefix("SVFOP_").unwrap_or(name).to_string())
        }
        Some(NodeEnum::FuncCall(call)) => {
            let name = node_texts(&call.funcname)?.join(".");
            let args = call
                .args
                .iter()
                .map(expr_to_string)
                .collect::<Result<Vec<_>>>()?
                .join(", ");
            Ok(format!("{name}({args})"))
        }
        Some(NodeEnum::TypeCast(cast)) => {
            let type_name = cast
                .type_name
                .as_ref()
                .ok_or_else(|| Error::node_shape("TypeCast without a type name"))?;
            let dotted = node_texts(&type_name.names)?.join(".");
            match cast.arg.as_ref().and_then(|arg| arg.node.as_ref()) {
                Some(NodeEnum::AConst(constant)) => {
                    Ok(format!("{}::{dotted}", constant_to_string(constant)?))
                }
                _ => Ok(String::new()),
            }
        }
        Some(NodeEnum::AConst(constant)) => constant_to_string(constant),
        _ => Ok(String::new()),
    }
}

fn constant_to_string(constant: &AConst) -> Result<String> {
    if constant.isnull {
        return Ok("NULL".to_string());
    }
    match constant.val.as_ref() {
        Some(a_const::Val::Sval(s)) => Ok(format!("\"{}\"", s.sval)),
        Some(a_const::Val::Boolval(b)) => Ok(b.boolval.to_string()),
        Some(a_const::Val::Ival(i)) => Ok(i.ival.to_string()),
        Some(a_const::Val::Fval(f)) => Ok(f.fval.clone()),
        Some(a_const::Val::Bsval(b)) => Ok(b.bsval.clone()),
        None => Err(Error::node_shape("constant without a value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_query::NodeEnum;

    /// Parse `DEFAULT <expr>` through the real parser and reduce the raw
    /// expression node.
    fn eval_default(expr: &str) -> String {
        let sql = format!("CREATE TABLE t (c int DEFAULT {expr})");
        let parsed = pg_query::parse(&sql).expect("parse");
        let stmt = parsed.protobuf.stmts[0]
            .stmt
            .clone()
            .expect("raw statement");
        let Some(NodeEnum::CreateStmt(create)) = stmt.node else {
            panic!("expected CreateStmt");
        };
        let Some(NodeEnum::ColumnDef(def)) = create.table_elts[0].node.clone() else {
            panic!("expected ColumnDef");
        };
        let Some(NodeEnum::Constraint(con)) = def.constraints[0].node.clone() else {
            panic!("expected Constraint");
        };
        let raw = con.raw_expr.clone().expect("default carries an expression");
        expr_to_string(&raw).expect("stringify")
    }

    #[test]
    fn value_functions_render_their_symbolic_name() {
        assert_eq!(eval_default("CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
        assert_eq!(eval_default("current_date"), "CURRENT_DATE");
    }

    #[test]
    fn function_calls_render_name_and_arguments() {
        assert_eq!(eval_default("now()"), "now()");
        assert_eq!(eval_default("substr('abc', 2)"), "substr(\"abc\", 2)");
    }

    #[test]
    fn constants_render_canonically() {
        assert_eq!(eval_default("null"), "NULL");
        assert_eq!(eval_default("'abcd'"), "\"abcd\"");
        assert_eq!(eval_default("true"), "true");
        assert_eq!(eval_default("false"), "false");
        assert_eq!(eval_default("42"), "42");
        assert_eq!(eval_default("10.25"), "10.25");
    }

    #[test]
    fn constant_casts_render_value_and_dotted_type() {
        assert_eq!(eval_default("'5'::integer"), "\"5\"::pg_catalog.int4");
        assert_eq!(eval_default("'on'::text"), "\"on\"::text");
    }

    #[test]
    fn unsupported_shapes_reduce_to_the_empty_string() {
        assert_eq!(eval_default("10+1"), "");
        assert_eq!(eval_default("(1 + 2) * 3"), "");
    }
}
