use super::CollectionDict;
use crate::browser::Page;
use crate::core::{Clock, ScrollConfig, ScraperResult};
use crate::parser::ExtractionRoutine;
use crate::stats::StatsTracker;
use log::{debug, trace, warn};
use serde_json::Value;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollState {
    Scrolling {
        ticks: usize,
        last_offset: Option<f64>,
    },
    /// The offset stopped moving, or the routine's limit was reached.
    Settled { ticks: usize },
    /// Tick or time budget exhausted before the page settled.
    TimedOut { ticks: usize },
}

impl ScrollState {
    pub fn start() -> Self {
        ScrollState::Scrolling {
            ticks: 0,
            last_offset: None,
        }
    }

    /// Applies one completed tick. The first tick never settles.
    pub fn advance(self, offset: f64, limit_reached: bool) -> Self {
        match self {
            ScrollState::Scrolling { ticks, last_offset } => {
                let ticks = ticks + 1;
                if limit_reached || last_offset == Some(offset) {
                    ScrollState::Settled { ticks }
                } else {
                    ScrollState::Scrolling {
                        ticks,
                        last_offset: Some(offset),
                    }
                }
            }
            done => done,
        }
    }

    pub fn expire(self) -> Self {
        match self {
            ScrollState::Scrolling { ticks, .. } => ScrollState::TimedOut { ticks },
            done => done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScrollState::Scrolling { .. })
    }

    pub fn ticks(&self) -> usize {
        match *self {
            ScrollState::Scrolling { ticks, .. }
            | ScrollState::Settled { ticks }
            | ScrollState::TimedOut { ticks } => ticks,
        }
    }
}

/// Scrolls a page to the bottom, feeding every tick's items into a dictionary.
pub struct ScrollLoop<'a, R: ExtractionRoutine> {
    config: &'a ScrollConfig,
    routine: &'a R,
    clock: &'a dyn Clock,
    stats: &'a StatsTracker,
}

impl<'a, R: ExtractionRoutine> ScrollLoop<'a, R> {
    pub fn new(
        config: &'a ScrollConfig,
        routine: &'a R,
        clock: &'a dyn Clock,
        stats: &'a StatsTracker,
    ) -> Self {
        Self {
            config,
            routine,
            clock,
            stats,
        }
    }

    pub async fn run(
        &self,
        page: &dyn Page,
        dict: &mut CollectionDict<R::Item>,
    ) -> ScraperResult<ScrollState> {
        let started = self.clock.now();
        let mut state = ScrollState::start();

        while !state.is_terminal() {
            if self.budget_exhausted(state.ticks(), started) {
                state = state.expire();
                break;
            }

            page.scroll_by(self.config.step).await?;
            let raw = page.evaluate(self.routine.tick_expression()).await?;
            self.absorb(raw, dict);
            let offset = page.scroll_offset().await?;
            self.stats.record_tick();

            let limit_reached = self
                .routine
                .limit()
                .is_some_and(|limit| dict.len() >= limit);
            state = state.advance(offset, limit_reached);
            trace!(
                "{} tick {}: offset={} items={}",
                self.routine.name(),
                state.ticks(),
                offset,
                dict.len()
            );

            if !state.is_terminal() {
                self.clock.sleep(self.config.tick_interval).await;
            }
        }

        match state {
            ScrollState::TimedOut { ticks } => {
                self.stats.record_timeout();
                warn!(
                    "{} scroll did not settle after {} ticks, keeping {} items",
                    self.routine.name(),
                    ticks,
                    dict.len()
                );
            }
            _ => debug!(
                "{} scroll settled after {} ticks with {} items",
                self.routine.name(),
                state.ticks(),
                dict.len()
            ),
        }
        Ok(state)
    }

    fn budget_exhausted(&self, ticks: usize, started: Instant) -> bool {
        ticks >= self.config.max_ticks
            || self.clock.now().duration_since(started) >= self.config.max_duration
    }

    fn absorb(&self, raw: Value, dict: &mut CollectionDict<R::Item>) {
        let records = match raw {
            Value::Array(records) => records,
            Value::Null => return,
            other => {
                warn!(
                    "{} tick returned {} instead of a list",
                    self.routine.name(),
                    other
                );
                return;
            }
        };

        let (mut inserted, mut merged, mut skipped) = (0, 0, 0);
        for record in records {
            let item = match self.routine.parse_item(record) {
                Ok(item) => item,
                Err(e) => {
                    debug!("Skipping malformed {} item: {}", self.routine.name(), e);
                    skipped += 1;
                    continue;
                }
            };
            let Some(key) = self.routine.key(&item) else {
                trace!("Skipping {} item without key", self.routine.name());
                skipped += 1;
                continue;
            };
            if dict.upsert(key, item, |held, new| self.routine.merge(held, new)) {
                inserted += 1;
            } else {
                merged += 1;
            }
        }

        self.stats.record_items(inserted, merged);
        self.stats.record_skipped(skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_never_settles() {
        let state = ScrollState::start().advance(0.0, false);
        assert_eq!(
            state,
            ScrollState::Scrolling {
                ticks: 1,
                last_offset: Some(0.0)
            }
        );
    }

    #[test]
    fn test_unchanged_offset_settles() {
        let state = ScrollState::start()
            .advance(50.0, false)
            .advance(100.0, false)
            .advance(100.0, false);
        assert_eq!(state, ScrollState::Settled { ticks: 3 });
        assert!(state.is_terminal());
    }

    #[test]
    fn test_limit_settles_immediately() {
        let state = ScrollState::start().advance(50.0, true);
        assert_eq!(state, ScrollState::Settled { ticks: 1 });
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let settled = ScrollState::Settled { ticks: 4 };
        assert_eq!(settled.advance(10.0, false), settled);
        assert_eq!(settled.expire(), settled);

        let expired = ScrollState::start().advance(5.0, false).expire();
        assert_eq!(expired, ScrollState::TimedOut { ticks: 1 });
        assert_eq!(expired.advance(5.0, false), expired);
    }
}
