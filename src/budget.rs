//! Resource budget for raw YAML event streams.
//!
//! A [`BudgetEnforcer`] watches the [`RawEvent`]s coming out of the tokenizer and stops
//! inputs that are large in ways the translator cannot bound by itself: too many
//! documents, nodes, anchors, aliases or too much scalar text. The size of alias
//! *expansions* is a separate limit, see `ParserOptions::max_alias_expansion_size`.

use std::fmt;

use nohash_hasher::IntSet;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::live_events::LiveEvents;
use crate::raw::{AnchorId, RawEvent, RawEvents};

/// Limits checked on every raw event.
///
/// The defaults let large configuration files through and stop resource-amplifying inputs.
///
/// ```rust
/// let options = saphyr_json::parser_options! {
///     budget: Some(saphyr_json::budget! { max_anchors: 2 }),
/// };
/// let err = saphyr_json::from_str_with_options("[&a 1, &b 2, &c 3]", options).unwrap_err();
/// assert!(err.to_string().contains("budget"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// All events, structural ones included. Default: 1,000,000.
    pub max_events: usize,
    /// Alias (`*ref`) events. Default: 50,000.
    pub max_aliases: usize,
    /// Distinct anchor definitions. Default: 50,000.
    pub max_anchors: usize,
    /// Documents in the stream. Default: 1,024.
    pub max_documents: usize,
    /// Scalars plus sequence and mapping starts. Default: 250,000.
    pub max_nodes: usize,
    /// Sum of scalar text lengths in bytes. Default: 64 MiB.
    pub max_total_scalar_bytes: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_aliases: 50_000,
            max_anchors: 50_000,
            max_documents: 1_024,
            max_nodes: 250_000,
            max_total_scalar_bytes: 64 * 1024 * 1024,
        }
    }
}

/// The limit that was exceeded, with the count that exceeded it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBreach {
    Events { events: usize },
    Aliases { aliases: usize },
    Anchors { anchors: usize },
    Documents { documents: usize },
    Nodes { nodes: usize },
    ScalarBytes { total_scalar_bytes: usize },
    /// Nesting went deeper than `ParserOptions::max_depth`. Raised by the translator.
    Depth { depth: usize },
}

impl fmt::Display for BudgetBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetBreach::Events { events } => write!(f, "too many events ({events})"),
            BudgetBreach::Aliases { aliases } => write!(f, "too many aliases ({aliases})"),
            BudgetBreach::Anchors { anchors } => write!(f, "too many anchors ({anchors})"),
            BudgetBreach::Documents { documents } => {
                write!(f, "too many documents ({documents})")
            }
            BudgetBreach::Nodes { nodes } => write!(f, "too many nodes ({nodes})"),
            BudgetBreach::ScalarBytes { total_scalar_bytes } => {
                write!(f, "scalar content too large ({total_scalar_bytes} bytes)")
            }
            BudgetBreach::Depth { depth } => write!(f, "nesting too deep ({depth})"),
        }
    }
}

/// Counters collected while scanning, filled in even when nothing was breached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub breached: Option<BudgetBreach>,
    pub events: usize,
    pub aliases: usize,
    pub anchors: usize,
    pub documents: usize,
    pub nodes: usize,
    /// Deepest structural nesting seen.
    pub max_depth: usize,
    /// Saturates instead of overflowing.
    pub total_scalar_bytes: usize,
}

/// Applies a [`Budget`] to raw events one at a time.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
    defined_anchors: IntSet<AnchorId>,
}

/// `Err(breach(count))` once `count` is above `max`.
#[inline]
fn limit(count: usize, max: usize, breach: fn(usize) -> BudgetBreach) -> Result<(), BudgetBreach> {
    if count > max { Err(breach(count)) } else { Ok(()) }
}

impl BudgetEnforcer {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
            defined_anchors: IntSet::default(),
        }
    }

    /// Count `event`, failing as soon as one limit is exceeded.
    pub fn observe(&mut self, event: &RawEvent) -> Result<(), BudgetBreach> {
        let report = &mut self.report;
        report.events += 1;
        limit(report.events, self.budget.max_events, |events| BudgetBreach::Events { events })?;

        match event {
            RawEvent::DocumentStart { .. } => {
                report.documents += 1;
                limit(report.documents, self.budget.max_documents, |documents| {
                    BudgetBreach::Documents { documents }
                })
            }
            RawEvent::Alias { .. } => {
                report.aliases += 1;
                limit(report.aliases, self.budget.max_aliases, |aliases| {
                    BudgetBreach::Aliases { aliases }
                })
            }
            RawEvent::Scalar { value, anchor, .. } => {
                self.node()?;
                let report = &mut self.report;
                report.total_scalar_bytes = report.total_scalar_bytes.saturating_add(value.len());
                limit(
                    report.total_scalar_bytes,
                    self.budget.max_total_scalar_bytes,
                    |total_scalar_bytes| BudgetBreach::ScalarBytes { total_scalar_bytes },
                )?;
                self.anchor(*anchor)
            }
            RawEvent::SequenceStart { anchor } | RawEvent::MappingStart { anchor } => {
                self.node()?;
                self.depth += 1;
                self.report.max_depth = self.report.max_depth.max(self.depth);
                self.anchor(*anchor)
            }
            RawEvent::SequenceEnd | RawEvent::MappingEnd => {
                self.depth = self.depth.saturating_sub(1);
                Ok(())
            }
            RawEvent::StreamStart | RawEvent::StreamEnd | RawEvent::DocumentEnd { .. } => Ok(()),
        }
    }

    fn node(&mut self) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        limit(self.report.nodes, self.budget.max_nodes, |nodes| BudgetBreach::Nodes { nodes })
    }

    fn anchor(&mut self, anchor: Option<AnchorId>) -> Result<(), BudgetBreach> {
        match anchor {
            Some(id) if self.defined_anchors.insert(id) => {
                self.report.anchors = self.defined_anchors.len();
                limit(self.report.anchors, self.budget.max_anchors, |anchors| {
                    BudgetBreach::Anchors { anchors }
                })
            }
            _ => Ok(()),
        }
    }

    pub fn into_report(self) -> BudgetReport {
        self.report
    }
}

/// Scan `input` against `budget` without translating it.
///
/// A breach is not an error: it is returned in [`BudgetReport::breached`] together with the
/// counters up to that point. Malformed YAML is an error.
pub fn check_yaml_budget(input: &str, budget: &Budget) -> Result<BudgetReport, Error> {
    let mut events = LiveEvents::new_from_str(input, None);
    let mut enforcer = BudgetEnforcer::new(budget.clone());
    while let Some((event, _)) = events.next_raw()? {
        if let Err(breach) = enforcer.observe(&event) {
            log::debug!("budget breached: {breach}");
            let mut report = enforcer.into_report();
            report.breached = Some(breach);
            return Ok(report);
        }
    }
    Ok(enforcer.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn breach(yaml: &str, budget: Budget) -> Option<BudgetBreach> {
        check_yaml_budget(yaml, &budget).unwrap().breached
    }

    #[test]
    fn counts_within_budget() {
        let report = check_yaml_budget("a: [1, 2, 3]\nb: {c: d}\n", &Budget::default()).unwrap();
        assert_eq!(report.breached, None);
        assert_eq!(report.documents, 1);
        assert_eq!(report.nodes, 10);
        assert_eq!(report.max_depth, 2);
        assert_eq!(report.total_scalar_bytes, 7);
    }

    #[test]
    fn aliases_are_counted_not_expanded() {
        let yaml = "root: &A [1, 2]\na: *A\nb: *A\nc: *A\nd: *A\n";
        assert_eq!(
            breach(yaml, crate::budget! { max_aliases: 3 }),
            Some(BudgetBreach::Aliases { aliases: 4 })
        );
        let report = check_yaml_budget(yaml, &Budget::default()).unwrap();
        assert_eq!((report.aliases, report.anchors), (4, 1));
    }

    #[test]
    fn each_limit_trips() {
        assert_eq!(
            breach("a: &A 1\nb: &B 2\nc: &C 3\n", crate::budget! { max_anchors: 2 }),
            Some(BudgetBreach::Anchors { anchors: 3 })
        );
        assert_eq!(
            breach("--- 1\n--- 2\n--- 3\n", crate::budget! { max_documents: 2 }),
            Some(BudgetBreach::Documents { documents: 3 })
        );
        assert_eq!(
            breach("[abcd, efgh, ijkl]", crate::budget! { max_total_scalar_bytes: 8 }),
            Some(BudgetBreach::ScalarBytes { total_scalar_bytes: 12 })
        );
        assert_eq!(
            breach("[1, 2]", crate::budget! { max_events: 4 }),
            Some(BudgetBreach::Events { events: 5 })
        );
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = check_yaml_budget("a: [1, 2\n", &Budget::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
