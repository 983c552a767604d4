use anyhow::Result;
use bundleup::{BundleEngine, Catalog, GeminiClient, Session, SessionOptions, WorkbookSource};
use httpmock::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("orders.csv");
    std::fs::write(
        &path,
        "Item title,Category,Brand,FinalLineTotal,Quantity\n\
         Chef Knife,Kitchen,Blade,60.00,4\n\
         Cutting Board,Kitchen,Woody,25.00,10\n\
         Apron,Kitchen Textiles,Woody,15.00,\n\
         Garden Hose,Garden,Aqua,35.00,2\n",
    )?;
    Ok(path)
}

fn session(
    path: &PathBuf,
    endpoint: String,
    options: SessionOptions,
) -> Session<WorkbookSource, GeminiClient> {
    Session::new(
        Catalog::new(WorkbookSource::from_path(path, "orders")),
        BundleEngine::new(GeminiClient::new(endpoint, "gemini-2.0-flash", "test-key")),
        options,
    )
}

#[tokio::test]
async fn test_interactive_category_flow() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_csv(&temp_dir)?;

    let server = MockServer::start();
    let reply = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text":
            "[{\"bundleName\": \"Home Chef\", \"productsInBundle\": [\"Chef Knife\", \"Cutting Board\", \"Apron\"], \"suggestedPrice\": 85}]"
        }]}}]
    });
    let api_mock = server.mock(|when, then| {
        when.method(POST).body_contains("Cutting Board");
        then.status(200).json_body(reply);
    });

    let mut session = session(&path, server.base_url(), SessionOptions::default());
    let input = Cursor::new("category kitchen\ngenerate\nquit\ngenerate\n");
    let mut output = Vec::new();

    let requests = session.run(input, &mut output).await?;
    let text = String::from_utf8(output)?;

    api_mock.assert_hits(1);
    assert_eq!(requests, 1);
    assert!(text.contains("Found 3 products in category: kitchen"));
    assert!(text.contains("### 📦 Home Chef"));
    assert!(text.contains("€100.00"));
    assert!(text.contains("You save 15%"));
    Ok(())
}

#[tokio::test]
async fn test_interactive_no_matches_and_generate_without_search() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_csv(&temp_dir)?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let mut session = session(&path, server.base_url(), SessionOptions::default());
    let input = Cursor::new("product toaster\ngenerate\nfly away\n");
    let mut output = Vec::new();

    let requests = session.run(input, &mut output).await?;
    let text = String::from_utf8(output)?;

    api_mock.assert_hits(0);
    assert_eq!(requests, 0);
    assert!(text.contains("No related products found for 'toaster'"));
    assert!(text.contains("Search for a product or category first"));
    assert!(text.contains("Unknown command: fly away"));
    Ok(())
}

#[tokio::test]
async fn test_interactive_dry_run_prints_prompt() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_csv(&temp_dir)?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let options = SessionOptions {
        json: false,
        dry_run: true,
    };
    let mut session = session(&path, server.base_url(), options);
    let input = Cursor::new("product apron\ngenerate\n");
    let mut output = Vec::new();

    session.run(input, &mut output).await?;
    let text = String::from_utf8(output)?;

    api_mock.assert_hits(0);
    assert!(text.contains("Using: Apron (2 related products)"));
    assert!(text.contains("MUST include the main product"));
    assert!(text.contains("- Apron (category: Kitchen Textiles, price: €15.00, stock: N/A)"));
    assert!(text.contains("- Garden Hose (category: Garden, price: €35.00, stock: 2)"));
    assert!(!text.contains("Chef Knife"));
    Ok(())
}

#[tokio::test]
async fn test_interactive_halts_without_data() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("missing.xlsx");

    let mut session = session(&missing, "http://127.0.0.1:9".to_string(), SessionOptions::default());
    let mut output = Vec::new();

    let requests = session
        .run(Cursor::new("category kitchen\ngenerate\n"), &mut output)
        .await?;
    let text = String::from_utf8(output)?;

    assert_eq!(requests, 0);
    assert!(text.contains("No data available"));
    assert!(!text.contains("Found"));
    Ok(())
}
