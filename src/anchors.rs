//! Anchor recording for alias replay.
//!
//! Every anchored node is captured as the normalized events it produced. A mapping or
//! sequence is recorded in a frame that stays open until its end event; frames nest like
//! the structures they record, and an event is stored only in the innermost open frame.
//! When a frame closes it becomes an immutable [`AnchorRecord`], attached to its parent
//! frame by reference, so shared sub-structures are never copied.
//!
//! The number of scalar leaves a record expands to is summed once, when the record closes.
//! Checking an alias against the expansion ceiling is then a constant-time lookup.

use std::collections::HashMap;
use std::rc::Rc;

use nohash_hasher::BuildNoHashHasher;

use crate::error::Error;
use crate::event::Event;
use crate::location::Location;
use crate::raw::AnchorId;

/// Item of a recording.
#[derive(Clone, Debug)]
pub(crate) enum Captured {
    Event(Event, Location),
    /// An anchored child node or an alias inside the recorded node.
    Nested(Rc<AnchorRecord>),
}

/// Closed recording of an anchored node.
#[derive(Debug)]
pub(crate) struct AnchorRecord {
    pub(crate) id: AnchorId,
    pub(crate) items: Vec<Captured>,
    /// Keys and values produced when the record is replayed, aliases included.
    pub(crate) leaves: usize,
}

impl AnchorRecord {
    /// Text of a record holding exactly one scalar.
    pub(crate) fn single_scalar(&self) -> Option<&str> {
        match self.items.as_slice() {
            [Captured::Event(Event::Value(scalar), _)] => Some(scalar.text()),
            [Captured::Event(Event::Key(text), _)] => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct OpenFrame {
    id: AnchorId,
    /// Structure depth of the anchored node.
    depth: usize,
    items: Vec<Captured>,
    leaves: usize,
}

/// Anchors of the current document.
#[derive(Debug, Default)]
pub(crate) struct AnchorRegistry {
    closed: HashMap<AnchorId, Rc<AnchorRecord>, BuildNoHashHasher<usize>>,
    open: Vec<OpenFrame>,
}

fn counts_as_leaf(event: &Event) -> bool {
    matches!(event, Event::Key(_) | Event::Value(_))
}

impl AnchorRegistry {
    /// Forget all anchors. Anchors are scoped to one document.
    pub(crate) fn reset(&mut self) {
        self.closed.clear();
        self.open.clear();
    }

    /// Start recording the mapping or sequence at `depth` under anchor `id`.
    pub(crate) fn open(&mut self, id: AnchorId, depth: usize) {
        log::debug!("recording anchor {id} at depth {depth}");
        self.open.push(OpenFrame {
            id,
            depth,
            items: Vec::new(),
            leaves: 0,
        });
    }

    /// Append an event to the innermost open recording, if any.
    pub(crate) fn record(&mut self, event: &Event, location: Location) {
        if let Some(frame) = self.open.last_mut() {
            if counts_as_leaf(event) {
                frame.leaves = frame.leaves.saturating_add(1);
            }
            frame.items.push(Captured::Event(event.clone(), location));
        }
    }

    /// Append an alias expansion to the innermost open recording, if any.
    pub(crate) fn record_nested(&mut self, record: &Rc<AnchorRecord>) {
        if let Some(frame) = self.open.last_mut() {
            frame.leaves = frame.leaves.saturating_add(record.leaves);
            frame.items.push(Captured::Nested(record.clone()));
        }
    }

    /// Register an anchored scalar, stored in its value form.
    pub(crate) fn define_scalar(&mut self, id: AnchorId, event: Event, location: Location) {
        log::debug!("anchor {id} defined as scalar");
        let record = Rc::new(AnchorRecord {
            id,
            leaves: 1,
            items: vec![Captured::Event(event, location)],
        });
        self.closed.insert(id, record);
    }

    /// The structure at `depth` has ended: close the recordings opened for it.
    pub(crate) fn end_structure(&mut self, depth: usize) {
        while self.open.last().is_some_and(|frame| frame.depth == depth) {
            let Some(frame) = self.open.pop() else {
                break;
            };
            let record = Rc::new(AnchorRecord {
                id: frame.id,
                items: frame.items,
                leaves: frame.leaves,
            });
            log::debug!(
                "anchor {} closed with {} leaves",
                record.id,
                record.leaves
            );
            if let Some(parent) = self.open.last_mut() {
                parent.leaves = parent.leaves.saturating_add(record.leaves);
                parent.items.push(Captured::Nested(record.clone()));
            }
            self.closed.insert(record.id, record);
        }
    }

    /// Completed recording of anchor `id`.
    ///
    /// An anchor whose node is still being read cannot be aliased: that would be a cycle.
    pub(crate) fn resolve(&self, id: AnchorId) -> Result<Rc<AnchorRecord>, Error> {
        if let Some(record) = self.closed.get(&id) {
            return Ok(record.clone());
        }
        if self.open.iter().any(|frame| frame.id == id) {
            return Err(Error::recursive_alias(id));
        }
        Err(Error::unknown_anchor(id))
    }
}
