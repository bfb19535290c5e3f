#[cfg(test)]
mod tests {
    use jsql_core::{Placeholders, rewrite};

    #[test]
    fn numbered_markers() {
        let rewritten = rewrite(
            "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND s LIKE ${pat}",
            Placeholders::Numbered,
        );
        assert_eq!(
            rewritten.sql,
            "SELECT i AS int, s AS string FROM foo WHERE i > $1 AND s LIKE $2"
        );
        assert_eq!(rewritten.names, ["first", "pat"]);
    }

    #[test]
    fn unnumbered_markers() {
        let rewritten = rewrite(
            "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND s LIKE ${pat}",
            Placeholders::Unnumbered,
        );
        assert_eq!(
            rewritten.sql,
            "SELECT i AS int, s AS string FROM foo WHERE i > ? AND s LIKE ?"
        );
        assert_eq!(rewritten.names, ["first", "pat"]);
    }

    #[test]
    fn repeated_names() {
        let query = "SELECT ${first} AS arg, i FROM foo WHERE i > ${first} AND s LIKE ${pat}";
        let numbered = rewrite(query, Placeholders::Numbered);
        assert_eq!(
            numbered.sql,
            "SELECT $1 AS arg, i FROM foo WHERE i > $1 AND s LIKE $2"
        );
        assert_eq!(numbered.names, ["first", "pat"]);

        let unnumbered = rewrite(query, Placeholders::Unnumbered);
        assert_eq!(
            unnumbered.sql,
            "SELECT ? AS arg, i FROM foo WHERE i > ? AND s LIKE ?"
        );
        assert_eq!(unnumbered.names, ["first", "first", "pat"]);
    }

    #[test]
    fn marker_count_matches_names() {
        let query = "${a}${b}${a}${c}${b}${a}";
        let numbered = rewrite(query, Placeholders::Numbered);
        assert_eq!(numbered.sql, "$1$2$1$3$2$1");
        assert_eq!(numbered.names, ["a", "b", "c"]);
        let unnumbered = rewrite(query, Placeholders::Unnumbered);
        assert_eq!(unnumbered.sql.matches('?').count(), unnumbered.names.len());
        assert_eq!(unnumbered.names, ["a", "b", "a", "c", "b", "a"]);
    }

    #[test]
    fn without_placeholders() {
        for placeholders in [Placeholders::Numbered, Placeholders::Unnumbered] {
            let rewritten = rewrite("SELECT 1 AS one", placeholders);
            assert_eq!(rewritten.sql, "SELECT 1 AS one");
            assert!(rewritten.names.is_empty());
        }
        let rewritten = rewrite("", Placeholders::Numbered);
        assert_eq!(rewritten.sql, "");
        assert!(rewritten.names.is_empty());
    }

    #[test]
    fn malformed_placeholders_pass_through() {
        let rewritten = rewrite("SELECT ${a}, '${' || ${b", Placeholders::Numbered);
        assert_eq!(rewritten.sql, "SELECT $1, '${' || ${b");
        assert_eq!(rewritten.names, ["a"]);

        let rewritten = rewrite("SELECT '${}', ${x}", Placeholders::Unnumbered);
        assert_eq!(rewritten.sql, "SELECT '${}', ?");
        assert_eq!(rewritten.names, ["x"]);

        let rewritten = rewrite("SELECT $1, $x, {y}", Placeholders::Numbered);
        assert_eq!(rewritten.sql, "SELECT $1, $x, {y}");
        assert!(rewritten.names.is_empty());
    }

    #[test]
    fn placeholders_are_lexical() {
        let rewritten = rewrite(
            "SELECT '${quoted}' -- ${commented}\n",
            Placeholders::Unnumbered,
        );
        assert_eq!(rewritten.sql, "SELECT '?' -- ?\n");
        assert_eq!(rewritten.names, ["quoted", "commented"]);
    }

    #[test]
    fn unicode_names() {
        let rewritten = rewrite("SELECT ${città}, ${città}", Placeholders::Numbered);
        assert_eq!(rewritten.sql, "SELECT $1, $1");
        assert_eq!(rewritten.names, ["città"]);
    }
}
