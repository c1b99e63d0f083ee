//! Resilient parser for the DBML subset.
//!
//! Recognized constructs: `Table <name> { <body> }` blocks whose body lines
//! are field declarations (`<name> <type> [annotations...]`), and block-level
//! `Ref: a.x > b.y` lines. Nothing here ever fails: a construct that cannot
//! be parsed is logged and skipped, and the rest of the document still
//! yields whatever valid tables and relationships it contains, since the
//! input is typically mid-edit user text.

use log::{debug, warn};

use crate::geom::Point;
use crate::lexer::{Lexer, Token};
use crate::schema::{
    Field, FieldRef, RefDirection, RelationKind, Relationship, Table, TableMap,
};

/// Extract all tables from the source text. Positions are left at the
/// origin; the caller assigns them afterwards (see [`crate::diagram`]).
///
/// Duplicate table names overwrite the earlier definition in place, keeping
/// the first occurrence's slot in the map order.
pub fn parse_schema(text: &str) -> TableMap {
    Parser::new(text).parse_tables()
}

/// Extract all relationships: block-level `Ref:` lines first, then one
/// relationship per inline field reference, in source order.
pub fn parse_relationships(text: &str) -> Vec<Relationship> {
    let mut rels = Parser::new(text).parse_ref_lines();

    for (table_name, table) in &parse_schema(text) {
        for field in &table.fields {
            let Some(reference) = &field.reference else {
                continue;
            };
            let rel = match reference.direction {
                RefDirection::ToTarget => Relationship {
                    from_table: table_name.clone(),
                    from_field: field.name.clone(),
                    to_table: reference.table.clone(),
                    to_field: reference.field.clone(),
                    kind: RelationKind::OneToMany,
                },
                RefDirection::FromSource => Relationship {
                    from_table: reference.table.clone(),
                    from_field: reference.field.clone(),
                    to_table: table_name.clone(),
                    to_field: field.name.clone(),
                    kind: RelationKind::ManyToOne,
                },
            };
            rels.push(rel);
        }
    }

    rels
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self {
            tokens: Lexer::new(input).tokenize(),
            pos: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w == word)
    }

    fn skip_newlines(&mut self) {
        while *self.peek() == Token::Newline {
            self.advance();
        }
    }

    /// Advance past the rest of the current line, consuming the newline.
    fn skip_to_newline(&mut self) {
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Newline => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Collect the tokens of one field declaration line. Stops before a
    /// closing brace so single-line bodies like `Table t { id integer }`
    /// work the same as multi-line ones.
    fn take_field_line(&mut self) -> Vec<Token> {
        let mut line = Vec::new();
        loop {
            match self.peek() {
                Token::Eof | Token::RBrace => break,
                Token::Newline => {
                    self.advance();
                    break;
                }
                _ => line.push(self.advance()),
            }
        }
        line
    }

    pub fn parse_tables(&mut self) -> TableMap {
        let mut tables = TableMap::new();

        loop {
            self.skip_newlines();
            if *self.peek() == Token::Eof {
                break;
            }
            if self.check_word("Table") {
                self.advance();
                if let Some(table) = self.parse_table() {
                    if tables.contains_key(&table.name) {
                        warn!("duplicate table `{}`: later definition wins", table.name);
                    }
                    tables.insert(table.name.clone(), table);
                }
            } else {
                // Ref lines and anything unrecognized are handled elsewhere
                // or skipped entirely.
                self.skip_to_newline();
            }
        }

        tables
    }

    fn parse_table(&mut self) -> Option<Table> {
        let name = match self.advance() {
            Token::Word(w) => w,
            tok => {
                warn!("expected table name, found {tok:?}; skipping fragment");
                self.skip_to_newline();
                return None;
            }
        };

        self.skip_newlines();
        if self.advance() != Token::LBrace {
            warn!("table `{name}` has no body; skipping fragment");
            self.skip_to_newline();
            return None;
        }

        let mut fields = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Eof => {
                    warn!("unterminated table block `{name}`; dropping it");
                    return None;
                }
                _ => {
                    let line = self.take_field_line();
                    // Ref lines may appear inside bodies; they belong to the
                    // relationship pass, not the field list.
                    if matches!(line.as_slice(), [Token::Word(w), Token::Colon, ..] if w == "Ref") {
                        continue;
                    }
                    match parse_field_line(&line) {
                        Some(field) => fields.push(field),
                        None => debug!("skipping malformed field line in `{name}`"),
                    }
                }
            }
        }

        Some(Table {
            name,
            position: Point::new(0.0, 0.0),
            fields,
        })
    }

    /// First relationship pass: block-level `Ref:` lines anywhere in the
    /// text, including inside table bodies.
    pub fn parse_ref_lines(&mut self) -> Vec<Relationship> {
        let mut rels = Vec::new();

        loop {
            self.skip_newlines();
            if *self.peek() == Token::Eof {
                break;
            }
            if self.check_word("Ref") {
                self.advance();
                if *self.peek() == Token::Colon {
                    self.advance();
                    match self.parse_ref_endpoints() {
                        Some(rel) => rels.push(rel),
                        None => warn!("malformed Ref line; skipping fragment"),
                    }
                }
            }
            self.skip_to_newline();
        }

        rels
    }

    /// `<table>.<field> (>|<) <table>.<field>` after a `Ref:` keyword.
    fn parse_ref_endpoints(&mut self) -> Option<Relationship> {
        let (from_table, from_field) = self.parse_qualified_field()?;
        let kind = match self.advance() {
            Token::Gt => RelationKind::OneToMany,
            // Not produced by common DBML but accepted by symmetry.
            Token::Lt => RelationKind::ManyToOne,
            _ => return None,
        };
        let (to_table, to_field) = self.parse_qualified_field()?;

        Some(Relationship {
            from_table,
            from_field,
            to_table,
            to_field,
            kind,
        })
    }

    fn parse_qualified_field(&mut self) -> Option<(String, String)> {
        let Token::Word(table) = self.advance() else {
            return None;
        };
        if self.advance() != Token::Dot {
            return None;
        }
        let Token::Word(field) = self.advance() else {
            return None;
        };
        Some((table, field))
    }
}

/// Parse one field declaration. The first word is the name, the second
/// token is the type (`"unknown"` if missing), and everything after is
/// annotation material: bracket groups and bare words.
fn parse_field_line(line: &[Token]) -> Option<Field> {
    let Some(Token::Word(name)) = line.first() else {
        return None;
    };

    let (typ, rest) = match line.get(1) {
        Some(Token::Word(w)) => (w.clone(), &line[2..]),
        Some(_) => ("unknown".to_string(), &line[1..]),
        None => ("unknown".to_string(), &line[1..]),
    };

    let mut words: Vec<&str> = Vec::new();
    let mut bracket_groups: Vec<&[Token]> = Vec::new();
    let mut reference = None;

    let mut i = 0;
    while i < rest.len() {
        match &rest[i] {
            Token::LBracket => {
                let close = rest[i + 1..]
                    .iter()
                    .position(|t| *t == Token::RBracket)
                    .map(|p| i + 1 + p);
                let group = &rest[i + 1..close.unwrap_or(rest.len())];
                if let Some(r) = parse_ref_group(group) {
                    // At most one inline reference per field: first wins.
                    if reference.is_none() {
                        reference = Some(r);
                    }
                } else {
                    bracket_groups.push(group);
                }
                words.extend(group.iter().filter_map(|t| match t {
                    Token::Word(w) => Some(w.as_str().trim_matches(',')),
                    _ => None,
                }));
                i = close.map_or(rest.len(), |c| c + 1);
            }
            Token::Word(w) => {
                // Annotation lists separate entries with commas; strip them
                // so `nullable,` still reads as `nullable`.
                words.push(w.as_str().trim_matches(','));
                i += 1;
            }
            _ => i += 1,
        }
    }

    let is_primary = bracket_groups.iter().any(|group| {
        group.windows(2).any(|pair| {
            matches!(
                pair,
                [Token::Word(a), Token::Word(b)] if a == "primary" && b == "key"
            )
        })
    });

    let has_nullable = words.contains(&"nullable");
    let has_not_null = words.windows(2).any(|pair| pair == ["not", "null"]);
    // `not null` takes precedence over `nullable`; absence of both means
    // required.
    let is_required = !has_nullable || has_not_null;

    Some(Field {
        name: name.clone(),
        typ,
        is_primary,
        is_required,
        reference,
    })
}

/// Recognize `ref: (>|<) table.field` inside a bracket group.
fn parse_ref_group(group: &[Token]) -> Option<FieldRef> {
    match group {
        [
            Token::Word(kw),
            Token::Colon,
            dir,
            Token::Word(table),
            Token::Dot,
            Token::Word(field),
        ] if kw == "ref" => {
            let direction = match dir {
                Token::Gt => RefDirection::ToTarget,
                Token::Lt => RefDirection::FromSource,
                _ => return None,
            };
            Some(FieldRef {
                direction,
                table: table.clone(),
                field: field.clone(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_table() {
        let tables = parse_schema("Table T { id integer [primary key] }");
        assert_eq!(tables.len(), 1);
        let t = &tables["T"];
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].name, "id");
        assert_eq!(t.fields[0].typ, "integer");
        assert!(t.fields[0].is_primary);
        assert!(t.fields[0].is_required);
    }

    #[test]
    fn test_multiline_body() {
        let input = r#"
            Table users {
                id integer [primary key]
                name varchar(255)
                bio text [nullable]
            }
        "#;
        let tables = parse_schema(input);
        let users = &tables["users"];
        assert_eq!(users.fields.len(), 3);
        assert_eq!(users.fields[1].typ, "varchar(255)");
        assert!(!users.fields[2].is_required);
    }

    #[test]
    fn test_missing_type_defaults_to_unknown() {
        let tables = parse_schema("Table t {\n    orphan\n}");
        assert_eq!(tables["t"].fields[0].typ, "unknown");
    }

    #[test]
    fn test_not_null_wins_over_nullable() {
        let tables = parse_schema("Table t {\n    a text [nullable, not null]\n}");
        assert!(tables["t"].fields[0].is_required);
    }

    #[test]
    fn test_inline_ref_to_target() {
        let tables = parse_schema("Table posts {\n    user_id integer [ref: > users.id]\n}");
        let field = &tables["posts"].fields[0];
        let r = field.reference.as_ref().unwrap();
        assert_eq!(r.direction, RefDirection::ToTarget);
        assert_eq!(r.table, "users");
        assert_eq!(r.field, "id");
    }

    #[test]
    fn test_inline_ref_relationships() {
        let input = r#"
            Table posts {
                user_id integer [ref: > users.id]
            }
            Table users {
                id integer [ref: < comments.user_id]
            }
        "#;
        let rels = parse_relationships(input);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].from_table, "posts");
        assert_eq!(rels[0].to_table, "users");
        assert_eq!(rels[0].kind, RelationKind::OneToMany);
        // `<` reverses the edge: the named target becomes the source.
        assert_eq!(rels[1].from_table, "comments");
        assert_eq!(rels[1].from_field, "user_id");
        assert_eq!(rels[1].to_table, "users");
        assert_eq!(rels[1].kind, RelationKind::ManyToOne);
    }

    #[test]
    fn test_block_ref_both_directions() {
        let input = "Ref: posts.user_id > users.id\nRef: users.id < posts.user_id\n";
        let rels = parse_relationships(input);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].kind, RelationKind::OneToMany);
        assert_eq!(rels[1].kind, RelationKind::ManyToOne);
        assert_eq!(rels[1].from_table, "users");
        assert_eq!(rels[1].to_table, "posts");
    }

    #[test]
    fn test_users_posts_scenario() {
        let input = r#"
            Table users {
                id integer [primary key]
                name text
            }
            Table posts {
                id integer [primary key]
                user_id integer
            }
            Ref: posts.user_id > users.id
        "#;
        let tables = parse_schema(input);
        assert_eq!(tables.len(), 2);
        let rels = parse_relationships(input);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_table, "posts");
        assert_eq!(rels[0].from_field, "user_id");
        assert_eq!(rels[0].to_table, "users");
        assert_eq!(rels[0].to_field, "id");
        assert_eq!(rels[0].kind, RelationKind::OneToMany);
    }

    #[test]
    fn test_malformed_fragment_does_not_abort() {
        let input = r#"
            Table {
            %%% garbage line
            Table ok {
                id integer
            }
            Ref: broken >
        "#;
        let tables = parse_schema(input);
        assert_eq!(tables.len(), 1);
        assert!(tables.contains_key("ok"));
        assert!(parse_relationships(input).is_empty());
    }

    #[test]
    fn test_duplicate_table_last_wins_keeps_slot() {
        let input = r#"
            Table a { x integer }
            Table b { y integer }
            Table a { z integer }
        "#;
        let tables = parse_schema(input);
        assert_eq!(tables.len(), 2);
        let names: Vec<&str> = tables.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(tables["a"].fields[0].name, "z");
    }

    #[test]
    fn test_ref_line_inside_body_is_not_a_field() {
        let input = "Table posts {\n    user_id integer\n    Ref: posts.user_id > users.id\n}";
        let tables = parse_schema(input);
        assert_eq!(tables["posts"].fields.len(), 1);
        assert_eq!(parse_relationships(input).len(), 1);
    }

    #[test]
    fn test_unicode_table() {
        let tables = parse_schema("Table ユーザー {\n    名前 文字列\n}");
        assert_eq!(tables["ユーザー"].fields[0].name, "名前");
    }

    #[test]
    fn test_parse_order_preserved() {
        let input = "Table c { x integer }\nTable a { x integer }\nTable b { x integer }";
        let names: Vec<String> = parse_schema(input).keys().cloned().collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
