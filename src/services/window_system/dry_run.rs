use super::r#trait::WindowSource;
use crate::error::Result;
use crate::events::{Rect, SurfaceId, WindowId, WindowProps, WindowUpdate};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

/// Emulated editor session for running without a compositor.
pub struct DryRunSource {
    editor_class: String,
    separator: String,
    interval_ms: u64,
}

impl DryRunSource {
    pub fn new(editor_class: String, separator: String, interval_ms: u64) -> Self {
        Self {
            editor_class,
            separator,
            interval_ms,
        }
    }

    fn title(&self, project: &str, file: &str) -> String {
        format!("{project}{sep}{file}{sep}Zed", sep = self.separator)
    }

    /// One pass of the scripted session. Window metadata arrives late on
    /// purpose, the way real compositors deliver it.
    fn script(&self) -> Vec<WindowUpdate> {
        let editor = WindowId(1);
        let late = WindowId(2);
        let terminal = WindowId(3);
        let frame = Rect::new(0, 0, 1280, 800);
        let base = |id: WindowId| WindowProps::new(id).with_frame(frame).with_surface(SurfaceId(id.0));

        vec![
            WindowUpdate::Upsert(
                base(editor)
                    .with_class(self.editor_class.as_str())
                    .with_title(self.title("kodecanter", "src/main.rs")),
            ),
            WindowUpdate::Upsert(base(terminal).with_class("foot").with_title("~/src")),
            // class and title of the second editor window show up one at a time
            WindowUpdate::Upsert(WindowProps::new(late).with_frame(frame)),
            WindowUpdate::Upsert(WindowProps::new(late).with_frame(frame).with_class(self.editor_class.as_str())),
            WindowUpdate::Upsert(base(late).with_class(self.editor_class.as_str()).with_title("Zed")),
            WindowUpdate::Upsert(
                base(late)
                    .with_class(self.editor_class.as_str())
                    .with_title(self.title("website", "index.html")),
            ),
            WindowUpdate::Upsert(
                base(editor)
                    .with_class(self.editor_class.as_str())
                    .with_title(self.title("kodecanter-docs", "README.md")),
            ),
            WindowUpdate::Upsert(
                base(editor)
                    .with_class(self.editor_class.as_str())
                    .with_title(self.title("kodecanter-docs", "README.md"))
                    .with_fullscreen(true)
                    .with_frame(Rect::new(0, 0, 1920, 1080)),
            ),
            WindowUpdate::Upsert(
                base(editor)
                    .with_class(self.editor_class.as_str())
                    .with_title(self.title("kodecanter-docs", "README.md")),
            ),
            WindowUpdate::Closed(late),
            WindowUpdate::Closed(terminal),
            WindowUpdate::Closed(editor),
        ]
    }
}

#[async_trait::async_trait]
impl WindowSource for DryRunSource {
    async fn run(self: Box<Self>, tx: mpsc::Sender<WindowUpdate>) -> Result<()> {
        info!("Dry-run mode: emulating an editor session");

        let mut ticker = interval(Duration::from_millis(self.interval_ms));
        loop {
            for update in self.script() {
                ticker.tick().await;
                info!("Dry-run: {:?}", update);
                if tx.send(update).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_closes_every_window_it_opens() {
        let source = DryRunSource::new("dev.zed.Zed".to_string(), " \u{2014} ".to_string(), 10);
        let script = source.script();

        let mut opened: Vec<WindowId> = script
            .iter()
            .filter_map(|u| match u {
                WindowUpdate::Upsert(props) => Some(props.id),
                WindowUpdate::Closed(_) => None,
            })
            .collect();
        opened.sort();
        opened.dedup();

        let mut closed: Vec<WindowId> = script
            .iter()
            .filter_map(|u| match u {
                WindowUpdate::Closed(id) => Some(*id),
                WindowUpdate::Upsert(_) => None,
            })
            .collect();
        closed.sort();

        assert_eq!(opened, closed);
    }

    #[tokio::test]
    async fn test_run_stops_when_receiver_is_dropped() {
        let source = Box::new(DryRunSource::new("dev.zed.Zed".to_string(), " \u{2014} ".to_string(), 1));
        let (tx, mut rx) = mpsc::channel(4);

        let handle = tokio::spawn(source.run(tx));
        let first = rx.recv().await.expect("first update");
        assert!(matches!(first, WindowUpdate::Upsert(_)));
        drop(rx);

        assert!(handle.await.expect("task joins").is_ok());
    }
}
