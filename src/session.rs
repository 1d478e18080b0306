use crate::cli::OutputFormat;
use crate::render::{write_page, Page, RenderOptions};
use crate::route::Route;
use crate::view::{FetchHandle, RepositoryView};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Open each path in turn, rendering once both fetches have settled.
pub async fn open_paths<W: Write>(
    view: &RepositoryView,
    paths: &[String],
    out: &mut W,
    options: &RenderOptions,
    format: OutputFormat,
) -> Result<()> {
    for path in paths {
        let route = Route::parse(path).with_context(|| format!("Cannot open '{}'", path))?;
        match route {
            Route::Dashboard => {
                view.leave().await;
                write_page(out, &Page::dashboard(), format)?;
            }
            Route::Repository(id) => {
                view.navigate(id).await.settled().await;
                render_current(view, out, options, format).await?;
            }
        }
    }
    Ok(())
}

/// Follow navigation paths from `input`, one per line, and re-render whenever
/// the view changes. A page still loading when `input` ends is rendered once
/// it settles.
pub async fn follow<R, W>(
    view: &RepositoryView,
    input: R,
    out: &mut W,
    options: &RenderOptions,
    format: OutputFormat,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut revisions = view.subscribe();
    let mut pending: Option<FetchHandle> = None;

    write_page(out, &Page::dashboard(), format)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read navigation path")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Route::parse(&line) {
                    Ok(Route::Dashboard) => {
                        pending = None;
                        if view.current().await.is_some() {
                            view.leave().await;
                        }
                        write_page(out, &Page::dashboard(), format)?;
                    }
                    Ok(Route::Repository(id)) => {
                        pending = Some(view.navigate(id).await);
                    }
                    Err(e) => eprintln!("{}: {}", "Error".red().bold(), e),
                }
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                render_current(view, out, options, format).await?;
            }
        }
    }

    if let Some(handle) = pending {
        handle.settled().await;
    }
    if revisions.has_changed().unwrap_or(false) {
        render_current(view, out, options, format).await?;
    }

    Ok(())
}

/// Render the repository page, unless the view has been left for the dashboard.
async fn render_current<W: Write>(
    view: &RepositoryView,
    out: &mut W,
    options: &RenderOptions,
    format: OutputFormat,
) -> Result<()> {
    let state = view.snapshot().await;
    if state.repository.is_none() {
        return Ok(());
    }
    write_page(out, &Page::from_state(&state, options), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{issue, FakeSource};
    use serde_json::Value;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
    use tokio::task::JoinHandle;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn pages(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            serde_json::Deserializer::from_slice(&bytes)
                .into_iter::<Value>()
                .map_while(std::result::Result::ok)
                .collect()
        }

        async fn wait_for_pages(&self, count: usize) -> Vec<Value> {
            for _ in 0..500 {
                let pages = self.pages();
                if pages.len() >= count {
                    return pages;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("expected {} pages, got {:?}", count, self.pages());
        }
    }

    fn start_following(view: &RepositoryView) -> (DuplexStream, SharedBuffer, JoinHandle<Result<()>>) {
        let (writer, reader) = tokio::io::duplex(256);
        let buffer = SharedBuffer::default();
        let view = view.clone();
        let mut sink = buffer.clone();
        let task = tokio::spawn(async move {
            follow(
                &view,
                BufReader::new(reader),
                &mut sink,
                &RenderOptions::default(),
                OutputFormat::Json,
            )
            .await
        });
        (writer, buffer, task)
    }

    #[tokio::test]
    async fn follow_re_renders_as_each_fetch_resolves() {
        let (source, gate) = FakeSource::default()
            .with_repository("a/b", 7, vec![issue("1", "Bug A")])
            .gated("a/b");
        let view = RepositoryView::new(Arc::new(source));
        let (mut writer, buffer, task) = start_following(&view);

        let pages = buffer.wait_for_pages(1).await;
        assert!(pages[0]["hint"].is_string());

        writer.write_all(b"a/b\n").await.unwrap();
        let pages = buffer.wait_for_pages(2).await;
        assert!(pages[1].get("summary").is_none());
        assert!(pages[1].get("hint").is_none());
        assert_eq!(pages[1]["issues"], serde_json::json!([]));

        gate.add_permits(1);
        let pages = buffer.wait_for_pages(3).await;
        let has_summary = pages[2].get("summary").is_some();
        let issue_count = pages[2]["issues"].as_array().unwrap().len();
        assert!(has_summary != (issue_count == 1), "exactly one fetch resolved: {}", pages[2]);

        // input ends while the second fetch is still held back
        drop(writer);
        gate.add_permits(1);
        task.await.unwrap().unwrap();

        let pages = buffer.pages();
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[3]["summary"]["full_name"], "a/b");
        assert_eq!(pages[3]["issues"][0]["key"], "1");
    }

    #[tokio::test]
    async fn returning_to_the_dashboard_discards_the_loading_page() {
        let (source, gate) = FakeSource::default()
            .with_repository("a/b", 7, vec![issue("1", "Bug A")])
            .gated("a/b");
        let view = RepositoryView::new(Arc::new(source));
        let (mut writer, buffer, task) = start_following(&view);

        writer.write_all(b"a/b\n").await.unwrap();
        buffer.wait_for_pages(2).await;

        writer.write_all(b"/\n").await.unwrap();
        let pages = buffer.wait_for_pages(3).await;
        assert!(pages[2]["hint"].is_string());

        drop(writer);
        gate.add_permits(2);
        task.await.unwrap().unwrap();

        assert_eq!(buffer.pages().len(), 3);
        assert_eq!(view.current().await, None);
    }

    #[tokio::test]
    async fn open_paths_renders_each_settled_page() {
        let source = FakeSource::default().with_repository("a/b", 42, vec![issue("1", "Bug A")]);
        let view = RepositoryView::new(Arc::new(source));
        let mut buffer = SharedBuffer::default();

        open_paths(
            &view,
            &["/repositories/a/b".to_string(), "/".to_string()],
            &mut buffer,
            &RenderOptions::default(),
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let pages = buffer.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["summary"]["stats"][0]["value"], 42);
        assert_eq!(pages[0]["issues"][0]["title"], "Bug A");
        assert!(pages[1]["hint"].is_string());
    }

    #[tokio::test]
    async fn open_paths_rejects_unknown_routes() {
        let view = RepositoryView::new(Arc::new(FakeSource::default()));
        let mut buffer = SharedBuffer::default();

        let err = open_paths(
            &view,
            &["a/b#c".to_string()],
            &mut buffer,
            &RenderOptions::default(),
            OutputFormat::Json,
        )
        .await
        .unwrap_err();

        assert!(format!("{:#}", err).contains("a/b#c"));
        assert!(buffer.pages().is_empty());
    }
}
