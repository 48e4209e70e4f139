use super::r#trait::WindowSource;
use crate::error::{KodecanterError, Result};
use crate::events::{Rect, SurfaceId, WindowId, WindowProps, WindowUpdate};
use crate::{debug_if_enabled, kc_error};
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct SwayRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[derive(Debug, Default, Deserialize)]
struct SwayWindowProperties {
    class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SwayNode {
    id: u64,
    name: Option<String>,
    app_id: Option<String>,
    pid: Option<u32>,
    window_properties: Option<SwayWindowProperties>,
    #[serde(default)]
    fullscreen_mode: u8,
    rect: SwayRect,
    #[serde(default)]
    nodes: Vec<SwayNode>,
    #[serde(default)]
    floating_nodes: Vec<SwayNode>,
}

impl SwayNode {
    /// Containers that hold a client have a pid; splits and workspaces don't.
    fn is_window(&self) -> bool {
        self.pid.is_some()
    }

    fn to_props(&self) -> WindowProps {
        let class = self
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.window_properties.as_ref().and_then(|p| p.class.clone()));
        let frame = Rect::new(self.rect.x, self.rect.y, self.rect.width, self.rect.height);
        // sway maps the surface before it gives the container a size
        let surface = (frame.width > 0 && frame.height > 0).then_some(SurfaceId(self.id));

        WindowProps {
            id: WindowId(self.id),
            class,
            title: self.name.clone(),
            fullscreen: self.fullscreen_mode != 0,
            frame,
            surface,
        }
    }

    fn collect_windows(&self, out: &mut Vec<WindowProps>) {
        if self.is_window() {
            out.push(self.to_props());
        }
        for child in self.nodes.iter().chain(self.floating_nodes.iter()) {
            child.collect_windows(out);
        }
    }
}

#[derive(Debug, Deserialize)]
struct SwayWindowEvent {
    change: String,
    container: SwayNode,
}

fn parse_tree(json: &str) -> Result<Vec<WindowProps>> {
    let root: SwayNode = serde_json::from_str(json)?;
    let mut windows = Vec::new();
    root.collect_windows(&mut windows);
    Ok(windows)
}

fn parse_event(line: &str) -> Result<Option<WindowUpdate>> {
    let event: SwayWindowEvent = serde_json::from_str(line)?;
    if !event.container.is_window() && event.change != "close" {
        return Ok(None);
    }

    Ok(Some(match event.change.as_str() {
        "close" => WindowUpdate::Closed(WindowId(event.container.id)),
        _ => WindowUpdate::Upsert(event.container.to_props()),
    }))
}

/// Sway IPC through `swaymsg`.
#[derive(Debug, Default)]
pub struct SwaySource;

impl SwaySource {
    pub fn new() -> Self {
        Self
    }

    async fn get_tree(&self) -> Result<Vec<WindowProps>> {
        let output = Command::new("swaymsg")
            .args(["-r", "-t", "get_tree"])
            .output()
            .await
            .map_err(|e| kc_error!(service_unavailable, "swaymsg not found: {}", e))?;

        if !output.status.success() {
            return Err(kc_error!(backend, "swaymsg get_tree exited with {}", output.status));
        }

        parse_tree(&String::from_utf8_lossy(&output.stdout))
    }

    async fn subscribe(&self, tx: &mpsc::Sender<WindowUpdate>) -> Result<()> {
        let mut child = Command::new("swaymsg")
            .args(["-r", "-m", "-t", "subscribe", r#"["window"]"#])
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| kc_error!(internal, "swaymsg stdout was not captured"))?;
        let mut lines = BufReader::new(stdout).lines();

        while let Some(line) = lines.next_line().await? {
            match parse_event(&line) {
                Ok(Some(update)) => {
                    if tx.send(update).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => debug_if_enabled!("Skipping sway event: {}", e),
            }
        }

        let status = child.wait().await?;
        Err(KodecanterError::Backend(format!("swaymsg subscription ended with {}", status)))
    }
}

#[async_trait::async_trait]
impl WindowSource for SwaySource {
    async fn run(self: Box<Self>, tx: mpsc::Sender<WindowUpdate>) -> Result<()> {
        let windows = self.get_tree().await?;
        info!("Sway reports {} existing windows", windows.len());
        for props in windows {
            if tx.send(WindowUpdate::Upsert(props)).await.is_err() {
                return Ok(());
            }
        }

        let result = self.subscribe(&tx).await;
        if let Err(e) = &result {
            warn!("Sway window stream stopped: {}", e);
        }
        result
    }
}
