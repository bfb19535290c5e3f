use std::{collections::HashMap, fmt::Write};

/// Positional parameter syntax understood by a driver.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholders {
    /// `$1, $2, ...`: every distinct name gets one number, repeated names reuse it.
    #[default]
    Numbered,
    /// `?`: one marker and one parameter per occurrence, repeated names included.
    Unnumbered,
}

/// A query with its named placeholders replaced by positional markers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Query text in the driver syntax.
    pub sql: String,
    /// Name of the argument bound to each positional parameter, in order.
    pub names: Vec<String>,
}

/// Replaces every `${name}` in `query` with a positional marker.
///
/// The scan is purely lexical: placeholders inside string literals or comments
/// are rewritten as well, while an unterminated `${` or an empty `${}` is left
/// untouched.
///
/// ```rust
/// use jsql_core::{Placeholders, rewrite};
/// let rewritten = rewrite("SELECT ${a}, ${b}, ${a}", Placeholders::Numbered);
/// assert_eq!(rewritten.sql, "SELECT $1, $2, $1");
/// assert_eq!(rewritten.names, ["a", "b"]);
/// let rewritten = rewrite("SELECT ${a}, ${b}, ${a}", Placeholders::Unnumbered);
/// assert_eq!(rewritten.sql, "SELECT ?, ?, ?");
/// assert_eq!(rewritten.names, ["a", "b", "a"]);
/// ```
pub fn rewrite(query: &str, placeholders: Placeholders) -> Rewritten {
    let mut sql = String::with_capacity(query.len());
    let mut names = Vec::new();
    let mut positions = HashMap::<&str, usize>::new();
    let mut rest = query;
    while let Some(start) = rest.find("${") {
        let tail = &rest[start + 2..];
        let Some(len) = tail.find('}') else {
            break;
        };
        if len == 0 {
            sql.push_str(&rest[..start + 3]);
            rest = &tail[1..];
            continue;
        }
        let name = &tail[..len];
        sql.push_str(&rest[..start]);
        match placeholders {
            Placeholders::Numbered => {
                let position = *positions.entry(name).or_insert_with(|| {
                    names.push(name.to_owned());
                    names.len()
                });
                let _ = write!(sql, "${position}");
            }
            Placeholders::Unnumbered => {
                names.push(name.to_owned());
                sql.push('?');
            }
        }
        rest = &tail[len + 1..];
    }
    sql.push_str(rest);
    Rewritten { sql, names }
}
