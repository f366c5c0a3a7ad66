// tests/text_source.rs

mod common;
use crate::common::{init_tracing, quiet_context, sh, with_timeout};

use std::error::Error;

use cmdpipe::{cmd, text};
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn text_through_cat_is_verbatim() -> TestResult {
    init_tracing();

    let out = with_timeout(text("bananas").pipe(["cat"])?.get()).await?;
    assert_eq!(out, "bananas");
    Ok(())
}

#[tokio::test]
async fn chained_cats_preserve_text() -> TestResult {
    init_tracing();

    let input = "line one\r\nline two\n\n  trailing spaces  ";
    let out = with_timeout(text(input).pipe(["cat"])?.pipe(["cat"])?.pipe(["cat"])?.get()).await?;
    assert_eq!(out, input);
    Ok(())
}

#[tokio::test]
async fn empty_text_yields_empty_output() -> TestResult {
    init_tracing();

    let out = with_timeout(text("").pipe(["cat"])?.get()).await?;
    assert_eq!(out, "");
    Ok(())
}

#[tokio::test]
async fn large_text_does_not_deadlock() -> TestResult {
    init_tracing();

    let input = "0123456789abcdef\n".repeat(64 * 1024);
    let out = with_timeout(text(input.clone()).pipe(["cat"])?.pipe(["cat"])?.get()).await?;
    assert_eq!(out.len(), input.len());
    assert_eq!(out, input);
    Ok(())
}

#[tokio::test]
async fn reader_closing_early_is_not_an_error() -> TestResult {
    init_tracing();

    let input = "x\n".repeat(200_000);
    let out = with_timeout(text(input).pipe(["head", "-n", "2"])?.get()).await?;
    assert_eq!(out, "x\nx\n");
    Ok(())
}

#[tokio::test]
async fn command_output_is_captured_without_trimming() -> TestResult {
    init_tracing();

    let out = with_timeout(cmd(["printf", "%s\\n\\n", "hello"])?.get()).await?;
    assert_eq!(out, "hello\n\n");
    Ok(())
}

#[tokio::test]
async fn processes_transform_in_order() -> TestResult {
    init_tracing();

    let ctx = quiet_context();
    let chain = text("b\na\nc\n").pipe(["sort"])?.pipe(sh("tr a-z A-Z"))?;
    let out = with_timeout(ctx.get(&chain)).await?;
    assert_eq!(out, "A\nB\nC\n");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_text_survives_a_cat_chain(input in "\\PC{0,256}") {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let chain = text(input.clone()).pipe(["cat"]).unwrap().pipe(["cat"]).unwrap();
        let out = rt.block_on(chain.get()).unwrap();

        prop_assert_eq!(out, input);
    }
}
