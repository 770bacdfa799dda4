//! Built-in PostgreSQL type table.
//!
//! The simple and pattern matches below mirror the type list in the
//! PostgreSQL documentation. Parameterized spellings are matched with
//! anchored regexes that tolerate arbitrary whitespace around precision
//! arguments rather than a grammar for type names.

use regex::Regex;

use crate::registry::{PostgresType, TypeId, TypeRegistry};

const NUM_IN_BRACKETS: &str = r"\s*\(\s*\d+\s*\)";
const PRECISION_IN_BRACKETS: &str = r"\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\)";
const WITHOUT_TIME_ZONE: &str = r"\s*without\s*time\s*zone\s*";
const WITH_TIME_ZONE: &str = r"\s*with\s*time\s*zone\s*";

// Two-field ranges first so the alternation never stops at a bare `year`
// with ` to month` left over.
const INTERVAL_FIELDS: &str = "year\\s+to\\s+month|day\\s+to\\s+hour|day\\s+to\\s+minute\
|day\\s+to\\s+second|hour\\s+to\\s+minute|hour\\s+to\\s+second|minute\\s+to\\s+second\
|year|month|day|hour|minute|second";

fn optionally(re: &str) -> String {
    format!("({re})?")
}

fn pattern(re: String) -> Regex {
    Regex::new(&re).expect("built-in type pattern must compile")
}

fn simple(name: &str, aliases: &[&str], matches: &[&str]) -> PostgresType {
    PostgresType {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        schema: String::new(),
        is_serial: false,
        non_serial: None,
        enum_values: Vec::new(),
        simple_matches: matches.iter().map(|m| m.to_string()).collect(),
        pattern_matches: Vec::new(),
    }
}

fn serial(name: &str, aliases: &[&str], matches: &[&str]) -> PostgresType {
    PostgresType {
        is_serial: true,
        ..simple(name, aliases, matches)
    }
}

fn patterned(name: &str, aliases: &[&str], patterns: Vec<Regex>) -> PostgresType {
    PostgresType {
        pattern_matches: patterns,
        ..simple(name, aliases, &[])
    }
}

fn must(registry: &mut TypeRegistry, ty: PostgresType) -> TypeId {
    registry
        .register(ty)
        .expect("built-in type registration must not collide")
}

/// Register the full built-in table, wire the serial back-links, and install
/// the cast table. Called once from [`TypeRegistry::new`].
pub(crate) fn register_builtins(registry: &mut TypeRegistry) {
    let bigint = must(registry, simple("bigint", &["int8"], &["bigint", "int8"]));
    let bigserial = must(
        registry,
        serial("bigserial", &["serial8"], &["bigserial", "serial8"]),
    );
    must(registry, simple("boolean", &["bool"], &["boolean", "bool"]));
    must(registry, simple("box", &[], &["box"]));
    let bytea = must(registry, simple("bytea", &[], &["bytea"]));
    must(registry, simple("cidr", &[], &["cidr"]));
    must(registry, simple("circle", &[], &["circle"]));
    must(registry, simple("date", &[], &["date"]));
    must(
        registry,
        simple(
            "double precision",
            &["float8"],
            &["double precision", "float8"],
        ),
    );
    must(registry, simple("inet", &[], &["inet"]));
    let integer = must(
        registry,
        simple("integer", &["int", "int4"], &["integer", "int", "int4"]),
    );
    must(registry, simple("json", &[], &["json"]));
    must(registry, simple("jsonb", &[], &["jsonb"]));
    must(registry, simple("line", &[], &["line"]));
    must(registry, simple("lseg", &[], &["lseg"]));
    must(registry, simple("macaddr", &[], &["macaddr"]));
    must(registry, simple("macaddr8", &[], &["macaddr8"]));
    must(registry, simple("money", &[], &["money"]));
    must(registry, simple("path", &[], &["path"]));
    must(registry, simple("pg_lsn", &[], &["pg_lsn"]));
    must(registry, simple("pg_snapshot", &[], &["pg_snapshot"]));
    must(registry, simple("point", &[], &["point"]));
    must(registry, simple("polygon", &[], &["polygon"]));
    must(registry, simple("real", &["float4"], &["real", "float4"]));
    let smallint = must(
        registry,
        simple("smallint", &["int2"], &["smallint", "int2"]),
    );
    let smallserial = must(
        registry,
        serial("smallserial", &["serial2"], &["smallserial", "serial2"]),
    );
    let serial4 = must(registry, serial("serial", &["serial4"], &["serial", "serial4"]));
    let text = must(registry, simple("text", &[], &["text"]));
    must(registry, simple("tsquery", &[], &["tsquery"]));
    must(registry, simple("tsvector", &[], &["tsvector"]));
    must(registry, simple("txid_snapshot", &[], &["txid_snapshot"]));
    must(registry, simple("uuid", &[], &["uuid"]));
    must(registry, simple("xml", &[], &["xml"]));

    must(
        registry,
        patterned(
            "bit",
            &[],
            vec![pattern(format!("^bit{}$", optionally(NUM_IN_BRACKETS)))],
        ),
    );
    must(
        registry,
        patterned(
            "bit varying",
            &["varbit"],
            vec![
                pattern(format!("^bit varying{}$", optionally(NUM_IN_BRACKETS))),
                pattern(format!("^varbit{}$", optionally(NUM_IN_BRACKETS))),
            ],
        ),
    );
    {
        // The parser folds the CHAR keyword to its internal name, so the
        // registry must answer for "bpchar" as well.
        let mut character = patterned(
            "character",
            &["char", "bpchar"],
            vec![
                pattern(format!("^character{}$", optionally(NUM_IN_BRACKETS))),
                pattern(format!("^char{}$", optionally(NUM_IN_BRACKETS))),
            ],
        );
        character.simple_matches.push("bpchar".to_string());
        must(registry, character);
    }
    must(
        registry,
        patterned(
            "character varying",
            &["varchar"],
            vec![
                pattern(format!(
                    "^character varying{}$",
                    optionally(NUM_IN_BRACKETS)
                )),
                pattern(format!("^varchar{}$", optionally(NUM_IN_BRACKETS))),
            ],
        ),
    );
    must(
        registry,
        patterned(
            "interval",
            &[],
            vec![pattern(format!(
                "^interval(\\s+(?:{INTERVAL_FIELDS}))?{}\\s*$",
                optionally(NUM_IN_BRACKETS)
            ))],
        ),
    );
    must(
        registry,
        patterned(
            "numeric",
            &["decimal"],
            vec![
                pattern(format!("^numeric{}$", optionally(PRECISION_IN_BRACKETS))),
                pattern(format!("^decimal{}$", optionally(PRECISION_IN_BRACKETS))),
            ],
        ),
    );
    must(
        registry,
        patterned(
            "time",
            &[],
            vec![pattern(format!(
                "^time{}{}$",
                optionally(NUM_IN_BRACKETS),
                optionally(WITHOUT_TIME_ZONE)
            ))],
        ),
    );
    must(
        registry,
        patterned(
            "timetz",
            &["timetz"],
            vec![
                pattern(format!(
                    "^time{}{WITH_TIME_ZONE}$",
                    optionally(NUM_IN_BRACKETS)
                )),
                pattern(format!("^timetz{}$", optionally(NUM_IN_BRACKETS))),
            ],
        ),
    );
    {
        let mut timestamp = patterned(
            "timestamp",
            &[],
            vec![pattern(format!(
                "^timestamp{}{}$",
                optionally(NUM_IN_BRACKETS),
                optionally(WITHOUT_TIME_ZONE)
            ))],
        );
        timestamp.simple_matches.push("timestamp".to_string());
        must(registry, timestamp);
    }
    {
        let mut timestamptz = patterned(
            "timestamptz",
            &["timestamptz"],
            vec![
                pattern(format!(
                    "^timestamp{}{WITH_TIME_ZONE}$",
                    optionally(NUM_IN_BRACKETS)
                )),
                pattern(format!("^timestamptz{}$", optionally(NUM_IN_BRACKETS))),
            ],
        );
        timestamptz.simple_matches.push("timestamptz".to_string());
        must(registry, timestamptz);
    }

    registry.link_serial(bigserial, bigint);
    registry.link_serial(serial4, integer);
    registry.link_serial(smallserial, smallint);

    let integer_family = [bigint, bigserial, integer, serial4, smallint, smallserial];
    for ty in integer_family {
        registry.allow_casts(ty, &integer_family);
    }
    registry.allow_casts(text, &[bytea]);
    registry.allow_casts(bytea, &[text]);
}
