#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, Method, header::CONTENT_TYPE};
    use jsql_core::Value;
    use jsql_http::{BodyKind, RequestArgs};

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn body_kind() {
        let mut headers = HeaderMap::new();
        assert_eq!(BodyKind::of(&Method::POST, &headers), BodyKind::Ignored);
        headers.insert(CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert_eq!(BodyKind::of(&Method::POST, &headers), BodyKind::Json);
        assert_eq!(BodyKind::of(&Method::PUT, &headers), BodyKind::Json);
        assert_eq!(BodyKind::of(&Method::GET, &headers), BodyKind::Ignored);
        assert_eq!(BodyKind::of(&Method::PATCH, &headers), BodyKind::Ignored);
        headers.insert(CONTENT_TYPE, "application/x-www-form-urlencoded".parse().unwrap());
        assert_eq!(BodyKind::of(&Method::PUT, &headers), BodyKind::Form);
        assert_eq!(BodyKind::of(&Method::PATCH, &headers), BodyKind::Form);
        assert_eq!(BodyKind::of(&Method::DELETE, &headers), BodyKind::Ignored);
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        assert_eq!(BodyKind::of(&Method::POST, &headers), BodyKind::Ignored);
    }

    #[test]
    fn precedence() {
        let mut request = RequestArgs::default();
        request.path.insert("a".into(), "path".into());
        request.extend_form(b"a=form&b=form&c=&d=first&d=second");
        request
            .set_json(br#"{"a": 1, "b": 2, "c": 3, "e": [true]}"#)
            .unwrap();
        let args = request.resolve(&names(&["a", "b", "c", "d", "e", "f"]));
        assert_eq!(args.get("a"), Some(&Value::Varchar(Some("path".into()))));
        assert_eq!(args.get("b"), Some(&Value::Varchar(Some("form".into()))));
        assert_eq!(args.get("c"), Some(&Value::Int64(Some(3))));
        assert_eq!(args.get("d"), Some(&Value::Varchar(Some("first".into()))));
        assert!(args.contains("e"));
        assert!(!args.contains("f"));
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn json_body() {
        let mut request = RequestArgs::default();
        request.set_json(b"  \n").unwrap();
        assert!(request.json.is_empty());
        assert!(request.set_json(b"[1, 2]").is_err());
        assert!(request.set_json(b"{\"a\":").is_err());
        request.set_json(br#"{"pat": "%eve%"}"#).unwrap();
        let args = request.resolve(&names(&["pat", "pat"]));
        assert_eq!(args.get("pat"), Some(&Value::Varchar(Some("%eve%".into()))));
    }
}
