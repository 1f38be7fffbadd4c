//! Integration tests for the summarization pipeline with a scripted provider.
//!
//! No network: every completion comes from [`Scripted`], which records the
//! requests it receives and can be told to fail or to answer slowly.

use async_trait::async_trait;
use lesson_summarizer::{
    markdown_to_pdf_bytes, summarize_long_text_to_markdown, summarize_to_files, summarize_with,
    Completion, CompletionError, CompletionProvider, CompletionRequest, SummarizerError,
    SummaryConfig, SummaryProgressCallback,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Provider that answers with the part number and chunk length.
#[derive(Default)]
struct Scripted {
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    /// 1-indexed call that fails, if any.
    fail_on_call: Option<usize>,
    /// Earlier parts answer more slowly, to shuffle completion order.
    staggered: bool,
}

/// Part number parsed from the "This is part i/total" directive.
fn part_of(request: &CompletionRequest) -> usize {
    let marker = "This is part ";
    let at = request
        .instructions
        .find(marker)
        .expect("part directive present");
    request.instructions[at + marker.len()..]
        .split('/')
        .next()
        .and_then(|n| n.parse().ok())
        .expect("part number")
}

#[async_trait]
impl CompletionProvider for Scripted {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_on_call == Some(call) {
            return Err(CompletionError::new("quota exceeded"));
        }
        let part = part_of(request);
        if self.staggered {
            tokio::time::sleep(Duration::from_millis(60 / part as u64)).await;
        }
        Ok(Completion {
            text: format!("- part {part}: {} chars\n", request.text.chars().count()),
            input_tokens: 100,
            output_tokens: 10,
        })
    }
}

fn twenty_five_k() -> String {
    "abcdefghij".repeat(2_500)
}

#[derive(Default)]
struct Events {
    log: Mutex<Vec<String>>,
}

impl SummaryProgressCallback for Events {
    fn on_summary_start(&self, total_parts: usize) {
        self.log.lock().unwrap().push(format!("start {total_parts}"));
    }
    fn on_part_start(&self, part: usize, _total: usize) {
        self.log.lock().unwrap().push(format!("part {part}"));
    }
    fn on_part_complete(&self, part: usize, _total: usize, _len: usize) {
        self.log.lock().unwrap().push(format!("done {part}"));
    }
    fn on_part_error(&self, part: usize, _total: usize, error: &str) {
        self.log.lock().unwrap().push(format!("error {part}: {error}"));
    }
    fn on_summary_complete(&self, total_parts: usize) {
        self.log.lock().unwrap().push(format!("complete {total_parts}"));
    }
}

// ── Orchestration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_long_text_three_parts_in_order() {
    let provider = Scripted::default();
    let out = summarize_with(&twenty_five_k(), &SummaryConfig::default(), &provider)
        .await
        .unwrap();

    assert_eq!(
        out.markdown,
        "## Part 1/3\n\n- part 1: 10000 chars\n\n---\n\n\
         ## Part 2/3\n\n- part 2: 10000 chars\n\n---\n\n\
         ## Part 3/3\n\n- part 3: 6000 chars"
    );
    assert_eq!(out.parts.len(), 3);
    assert_eq!(
        out.parts.iter().map(|p| (p.start_char, p.end_char)).collect::<Vec<_>>(),
        vec![(0, 10_000), (9_500, 19_500), (19_000, 25_000)]
    );
    assert_eq!(out.stats.total_chars, 25_000);
    assert_eq!(out.stats.total_input_tokens, 300);
    assert_eq!(out.stats.total_output_tokens, 30);
}

#[tokio::test]
async fn test_short_text_single_part() {
    let provider = Scripted::default();
    let out = summarize_with("A short class about Kant.", &SummaryConfig::default(), &provider)
        .await
        .unwrap();
    assert!(out.markdown.starts_with("## Part 1/1\n\n"));
    assert!(!out.markdown.contains("---"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_request_carries_instructions_and_part_directive() {
    let provider = Scripted::default();
    let config = SummaryConfig::builder()
        .language("en")
        .topic("Ethics")
        .role_custom("You are a strict philosophy professor.")
        .output_preset("concept_list")
        .build()
        .unwrap();
    summarize_with(&twenty_five_k(), &config, &provider).await.unwrap();

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    for (i, req) in requests.iter().enumerate() {
        assert!(req.instructions.contains("LANGUAGE: en"));
        assert!(req.instructions.contains("TOPIC/SUBJECT: Ethics"));
        assert!(req.instructions.contains("You are a strict philosophy professor."));
        assert!(req.instructions.contains(&format!("IMPORTANT: This is part {}/3.", i + 1)));
        assert!(req.user_prompt().starts_with("TEXT:\n\"\"\""));
    }
}

#[tokio::test]
async fn test_failure_aborts_without_partial_document() {
    let provider = Scripted {
        fail_on_call: Some(2),
        ..Default::default()
    };
    let events = Arc::new(Events::default());
    let config = SummaryConfig::builder()
        .progress_callback(events.clone() as Arc<dyn SummaryProgressCallback>)
        .build()
        .unwrap();

    let err = summarize_with(&twenty_five_k(), &config, &provider)
        .await
        .unwrap_err();
    match err {
        SummarizerError::CompletionFailure { part, total, detail } => {
            assert_eq!((part, total), (2, 3));
            assert_eq!(detail, "quota exceeded");
        }
        other => panic!("expected CompletionFailure, got {other:?}"),
    }
    // Sequential: the third part is never requested.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *events.log.lock().unwrap(),
        vec!["start 3", "part 1", "done 1", "part 2", "error 2: quota exceeded"]
    );
}

#[tokio::test]
async fn test_blank_input_is_rejected() {
    let provider = Scripted::default();
    let err = summarize_with("   \n\n  ", &SummaryConfig::default(), &provider)
        .await
        .unwrap_err();
    assert!(matches!(err, SummarizerError::EmptyInput));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_parts_keep_chunk_order() {
    let provider = Scripted {
        staggered: true,
        ..Default::default()
    };
    let config = SummaryConfig::builder().concurrency(3).build().unwrap();
    let out = summarize_with(&twenty_five_k(), &config, &provider)
        .await
        .unwrap();
    let parts: Vec<usize> = out.parts.iter().map(|p| p.part).collect();
    assert_eq!(parts, vec![1, 2, 3]);
    let p1 = out.markdown.find("## Part 1/3").unwrap();
    let p3 = out.markdown.find("## Part 3/3").unwrap();
    assert!(p1 < p3);
}

#[tokio::test]
async fn test_long_text_entry_point() {
    let provider = Scripted::default();
    let md = summarize_long_text_to_markdown(
        &twenty_five_k(),
        "es",
        "Historia",
        "Profesor de historia.",
        "Resumen breve.",
        &provider,
        10_000,
        500,
    )
    .await
    .unwrap();
    assert_eq!(md.matches("## Part ").count(), 3);
    assert_eq!(md.matches("\n\n---\n\n").count(), 2);
    let requests = provider.requests.lock().unwrap();
    assert!(requests[0].instructions.contains("Profesor de historia."));
    assert!(requests[0].instructions.contains("Resumen breve."));
}

#[tokio::test]
async fn test_invalid_chunking_is_rejected_before_any_call() {
    let provider = Scripted::default();
    for (size, overlap) in [(0, 0), (100, 100), (100, 150)] {
        let err = summarize_long_text_to_markdown(
            "some text", "en", "t", "", "", &provider, size, overlap,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidArgument(_)), "{size}/{overlap}");
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_output_serialises_to_json() {
    let provider = Scripted::default();
    let out = summarize_with(&twenty_five_k(), &SummaryConfig::default(), &provider)
        .await
        .unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["parts"].as_array().unwrap().len(), 3);
    assert_eq!(json["stats"]["total_parts"], 3);
}

// ── Files + PDF ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_summarize_to_files_writes_markdown_and_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Scripted::default();
    let config = SummaryConfig::builder().title("Clase 1").build().unwrap();

    let (out, files) = summarize_to_files(
        &twenty_five_k(),
        &config,
        &provider,
        dir.path(),
        Some("Clase 1: intro"),
    )
    .await
    .unwrap();

    assert_eq!(files.markdown, dir.path().join("Clase_1_intro.md"));
    assert_eq!(files.pdf, dir.path().join("Clase_1_intro.pdf"));
    assert_eq!(std::fs::read_to_string(&files.markdown).unwrap(), out.markdown);
    let pdf = std::fs::read(&files.pdf).unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[tokio::test]
async fn test_failed_run_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Scripted {
        fail_on_call: Some(1),
        ..Default::default()
    };
    let result = summarize_to_files(
        "text",
        &SummaryConfig::default(),
        &provider,
        dir.path(),
        Some("x"),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_long_markdown_renders_several_pages() {
    let section = "## Section\n\nA paragraph of study notes that is long enough to wrap \
                   across more than one line of the page body.\n\n- point one\n- point two\n\n---\n\n";
    let md = section.repeat(40);
    let pdf = markdown_to_pdf_bytes(&md, "Notes").unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert!(doc.get_pages().len() > 1);
}

#[test]
fn test_pdf_accepts_unmappable_characters() {
    let pdf = markdown_to_pdf_bytes("# 漢字 and emoji 🎓\n\nçà va — “quotes”", "Unicode").unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}
