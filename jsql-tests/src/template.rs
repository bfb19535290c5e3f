use crate::foo::{FOO, setup};
use jsql::{AsValue, Error, Executor, Result, Template, TemplateContext, args};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Plain text listing: a title with the pattern, then one line per row.
struct Listing;

impl Template for Listing {
    async fn render<W>(&self, mut context: TemplateContext<'_>, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let pattern = context
            .args
            .get("pat")
            .cloned()
            .map(String::try_from_value)
            .transpose()?
            .unwrap_or_default();
        out.write_all(format!("Not like {}:\n", pattern).as_bytes())
            .await?;
        while let Some(row) = context.results.next().await {
            let [int, string] = &row[..] else {
                return Err(Error::msg(format!(
                    "Expected two columns, found {:?}",
                    context.columns
                )));
            };
            let int = i64::try_from_value(int.clone())?;
            let string = String::try_from_value(string.clone())?;
            out.write_all(format!("- {} {}\n", int, string).as_bytes())
                .await?;
        }
        Ok(())
    }
}

/// Reads two rows and fails.
struct Broken;

impl Template for Broken {
    async fn render<W>(&self, mut context: TemplateContext<'_>, _out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut seen = 0;
        while seen < 2 && context.results.next().await.is_some() {
            seen += 1;
        }
        Err(Error::msg(format!("Template gave up after {} rows", seen)))
    }
}

pub async fn template<E: Executor>(executor: &E) {
    let _lock = FOO.lock().await;
    setup(executor).await;
    let query = executor
        .prepare_query(
            "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND NOT s LIKE ${pat} ORDER BY i",
        )
        .await
        .expect("Failed to prepare the template query");
    let mut out = Vec::new();
    query
        .render(&args! { "first" => 3, "pat" => "%eve%" }, &Listing, &mut out)
        .await
        .expect("Failed to render the template");
    assert_eq!(
        String::from_utf8(out).expect("The template produced invalid UTF-8"),
        "Not like %eve%:\n- 5 five\n- 9 nine\n"
    );

    // No rows
    let mut out = Vec::new();
    query
        .render(&args! { "first" => 9, "pat" => "" }, &Listing, &mut out)
        .await
        .expect("Failed to render the template without rows");
    assert_eq!(
        String::from_utf8(out).expect("The template produced invalid UTF-8"),
        "Not like :\n"
    );
}

pub async fn template_failure<E: Executor>(executor: &E) {
    let query = executor
        .prepare_query(
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < ${count}) SELECT x FROM n",
        )
        .await
        .expect("Failed to prepare the counting query");
    let error = query
        .render(
            &args! { "count" => 10_000 },
            &Broken,
            &mut tokio::io::sink(),
        )
        .await
        .expect_err("The broken template must fail");
    assert_eq!(
        format!("{:#}", error),
        "While rendering the template: Template gave up after 2 rows"
    );

    // Still usable afterwards
    let json = query
        .to_json(&args! { "count" => 2 })
        .await
        .expect("Failed to count after a failed render");
    assert_eq!(json, "[\n{\"x\":1},\n{\"x\":2}\n]");
}
