//! Primitive factory that records every call, for lifecycle tests.

use super::primitives::{
    BadgeConfig, BadgePrimitive, BorderConfig, FrameEffectConfig, OverlayConfig, Primitive, PrimitiveFactory,
};
use crate::events::{Rect, SurfaceId};
use crate::services::color::ProjectColor;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Border,
    Overlay,
    Badge,
    FrameEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Created { surface: SurfaceId, color: String },
    Color(String),
    Resize(Rect),
    Show,
    Hide,
    Destroy,
    Text(String),
    Move(i32, i32),
}

#[derive(Debug)]
struct Log {
    next_id: u64,
    kinds: BTreeMap<u64, PrimitiveKind>,
    ops: BTreeMap<u64, Vec<Op>>,
    live: BTreeSet<u64>,
    badge_width: i32,
}

#[derive(Clone)]
pub struct RecordingFactory {
    log: Rc<RefCell<Log>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Log {
                next_id: 1,
                kinds: BTreeMap::new(),
                ops: BTreeMap::new(),
                live: BTreeSet::new(),
                badge_width: 64,
            })),
        }
    }

    /// Width every badge reports from now on.
    pub fn set_badge_width(&self, width: i32) {
        self.log.borrow_mut().badge_width = width;
    }

    pub fn created_count(&self) -> usize {
        self.log.borrow().kinds.len()
    }

    pub fn created_of(&self, kind: PrimitiveKind) -> usize {
        self.ids_of(kind).len()
    }

    /// Ids of every primitive of `kind` ever created, oldest first.
    pub fn ids_of(&self, kind: PrimitiveKind) -> Vec<u64> {
        self.log
            .borrow()
            .kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn destroyed_count(&self) -> usize {
        self.created_count() - self.live_count()
    }

    pub fn live_count(&self) -> usize {
        self.log.borrow().live.len()
    }

    pub fn live_ids(&self) -> Vec<u64> {
        self.log.borrow().live.iter().copied().collect()
    }

    pub fn ops(&self, id: u64) -> Vec<Op> {
        self.log.borrow().ops.get(&id).cloned().unwrap_or_default()
    }

    pub fn created_color(&self, id: u64) -> Option<String> {
        self.ops(id).into_iter().find_map(|op| match op {
            Op::Created { color, .. } => Some(color),
            _ => None,
        })
    }

    fn create(&self, kind: PrimitiveKind, surface: SurfaceId, color: &ProjectColor) -> Recorded {
        let mut log = self.log.borrow_mut();
        let id = log.next_id;
        log.next_id += 1;
        log.kinds.insert(id, kind);
        log.live.insert(id);
        log.ops.insert(
            id,
            vec![Op::Created {
                surface,
                color: color.hex.clone(),
            }],
        );
        Recorded {
            id,
            log: Rc::clone(&self.log),
        }
    }
}

struct Recorded {
    id: u64,
    log: Rc<RefCell<Log>>,
}

impl Recorded {
    fn record(&self, op: Op) {
        self.log.borrow_mut().ops.entry(self.id).or_default().push(op);
    }
}

impl Primitive for Recorded {
    fn set_color(&mut self, color: &ProjectColor) {
        self.record(Op::Color(color.hex.clone()));
    }

    fn resize_to(&mut self, rect: Rect) {
        self.record(Op::Resize(rect));
    }

    fn show(&mut self) {
        self.record(Op::Show);
    }

    fn hide(&mut self) {
        self.record(Op::Hide);
    }

    fn destroy(&mut self) {
        self.record(Op::Destroy);
        self.log.borrow_mut().live.remove(&self.id);
    }
}

impl BadgePrimitive for Recorded {
    fn set_text(&mut self, text: &str) {
        self.record(Op::Text(text.to_string()));
    }

    fn measured_width(&self) -> i32 {
        self.log.borrow().badge_width
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.record(Op::Move(x, y));
    }
}

impl PrimitiveFactory for RecordingFactory {
    fn create_border(&mut self, surface: SurfaceId, config: BorderConfig) -> Box<dyn Primitive> {
        Box::new(self.create(PrimitiveKind::Border, surface, &config.color))
    }

    fn create_overlay(&mut self, surface: SurfaceId, config: OverlayConfig) -> Box<dyn Primitive> {
        Box::new(self.create(PrimitiveKind::Overlay, surface, &config.color))
    }

    fn create_badge(&mut self, surface: SurfaceId, config: BadgeConfig) -> Box<dyn BadgePrimitive> {
        Box::new(self.create(PrimitiveKind::Badge, surface, &config.color))
    }

    fn create_frame_effect(&mut self, surface: SurfaceId, config: FrameEffectConfig) -> Box<dyn Primitive> {
        Box::new(self.create(PrimitiveKind::FrameEffect, surface, &config.color))
    }
}
